use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DefinitionUpdates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DefinitionUpdates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DefinitionUpdates::Version)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DefinitionUpdates::UpdateType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DefinitionUpdates::SignatureCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DefinitionUpdates::Document)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DefinitionUpdates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(DefinitionUpdates::Table)
                    .col(DefinitionUpdates::UpdateType)
                    .col(DefinitionUpdates::CreatedAt)
                    .name("idx_definition_updates_type_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DefinitionUpdates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DefinitionUpdates {
    Table,
    Id,
    Version,
    UpdateType,
    SignatureCount,
    Document,
    CreatedAt,
}
