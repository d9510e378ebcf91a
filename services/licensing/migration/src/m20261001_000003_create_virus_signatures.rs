use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VirusSignatures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VirusSignatures::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VirusSignatures::Name)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VirusSignatures::SignatureType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VirusSignatures::HashValue)
                            .string_len(64)
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(VirusSignatures::SignatureId)
                            .string_len(16)
                            .unique_key(),
                    )
                    .col(ColumnDef::new(VirusSignatures::PatternData).json_binary())
                    .col(
                        ColumnDef::new(VirusSignatures::Severity)
                            .string_len(16)
                            .not_null()
                            .default("medium"),
                    )
                    .col(ColumnDef::new(VirusSignatures::Description).text().not_null())
                    .col(
                        ColumnDef::new(VirusSignatures::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(VirusSignatures::Table)
                    .col(VirusSignatures::SignatureType)
                    .name("idx_virus_signatures_signature_type")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VirusSignatures::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VirusSignatures {
    Table,
    Id,
    Name,
    SignatureType,
    HashValue,
    SignatureId,
    PatternData,
    Severity,
    Description,
    CreatedAt,
}
