use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LicenseKeys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LicenseKeys::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LicenseKeys::Key)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(LicenseKeys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LicenseKeys::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LicenseKeys::DeviceId).string_len(64))
                    .to_owned(),
            )
            .await?;

        // Active/expired listing and statistics filter on expiry.
        manager
            .create_index(
                Index::create()
                    .table(LicenseKeys::Table)
                    .col(LicenseKeys::ExpiresAt)
                    .name("idx_license_keys_expires_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LicenseKeys::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LicenseKeys {
    Table,
    Id,
    Key,
    CreatedAt,
    ExpiresAt,
    DeviceId,
}
