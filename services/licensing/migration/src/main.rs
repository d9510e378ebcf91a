use sea_orm_migration::prelude::*;

use zari_licensing_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
