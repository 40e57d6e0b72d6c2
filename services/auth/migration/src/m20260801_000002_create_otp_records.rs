use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OtpRecords::Email).string().not_null())
                    .col(ColumnDef::new(OtpRecords::Purpose).string().not_null())
                    .col(ColumnDef::new(OtpRecords::OtpHash).string().not_null())
                    .col(
                        ColumnDef::new(OtpRecords::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OtpRecords::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(OtpRecords::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OtpRecords::Table)
                    .col(OtpRecords::Email)
                    .col(OtpRecords::Purpose)
                    .name("idx_otp_records_email_purpose")
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one unused code per (email, purpose).
        // The purge-then-insert sequence in the usecases is not transactional
        // against concurrent requests; this makes the losing insert fail
        // instead of violating the invariant. sea-query's index builder has
        // no partial-index support, so raw SQL it is.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX uniq_otp_records_unused \
                 ON otp_records (email, purpose) WHERE is_used = false",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpRecords {
    Table,
    Id,
    Email,
    Purpose,
    OtpHash,
    Attempts,
    IsUsed,
    ExpiresAt,
    CreatedAt,
}
