use sea_orm_migration::prelude::*;

mod m20261001_000001_create_admins;
mod m20261001_000002_create_license_keys;
mod m20261001_000003_create_virus_signatures;
mod m20261001_000004_create_definition_updates;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_admins::Migration),
            Box::new(m20261001_000002_create_license_keys::Migration),
            Box::new(m20261001_000003_create_virus_signatures::Migration),
            Box::new(m20261001_000004_create_definition_updates::Migration),
        ]
    }
}
