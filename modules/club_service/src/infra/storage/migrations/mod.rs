//! Database migrations for the club service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_000001_create_activity::Migration),
            Box::new(m20250310_000002_create_activity_registration::Migration),
        ]
    }
}

mod m20250310_000001_create_activity {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Activity::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Activity::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Activity::Title).string().not_null())
                        .col(ColumnDef::new(Activity::Description).text())
                        .col(ColumnDef::new(Activity::Location).string())
                        .col(
                            ColumnDef::new(Activity::StartTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Activity::EndTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Activity::MaxParticipants).integer())
                        .col(
                            ColumnDef::new(Activity::RegistrationDeadline)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(Activity::FeeAmount)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Activity::ActivityType).string().not_null())
                        .col(ColumnDef::new(Activity::TargetAudience).string().not_null())
                        .col(ColumnDef::new(Activity::Status).string().not_null())
                        .col(ColumnDef::new(Activity::PublishAt).timestamp_with_time_zone())
                        .col(ColumnDef::new(Activity::CreatedBy).string().not_null())
                        .col(
                            ColumnDef::new(Activity::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Activity::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            // Status-first indexes drive the list queries and the two sweeps
            manager
                .create_index(
                    Index::create()
                        .name("idx_activity_status_start_time")
                        .table(Activity::Table)
                        .col(Activity::Status)
                        .col(Activity::StartTime)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_activity_status_publish_at")
                        .table(Activity::Table)
                        .col(Activity::Status)
                        .col(Activity::PublishAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_activity_status_end_time")
                        .table(Activity::Table)
                        .col(Activity::Status)
                        .col(Activity::EndTime)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_activity_created_by")
                        .table(Activity::Table)
                        .col(Activity::CreatedBy)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Activity::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Activity {
        Table,
        Id,
        Title,
        Description,
        Location,
        StartTime,
        EndTime,
        MaxParticipants,
        RegistrationDeadline,
        FeeAmount,
        ActivityType,
        TargetAudience,
        Status,
        PublishAt,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250310_000002_create_activity_registration {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ActivityRegistration::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ActivityRegistration::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ActivityRegistration::ActivityId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ActivityRegistration::UserId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ActivityRegistration::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ActivityRegistration::PaymentStatus)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ActivityRegistration::PaymentAmount)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ActivityRegistration::RegistrationTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ActivityRegistration::Note).string())
                        .col(
                            ColumnDef::new(ActivityRegistration::CheckedIn)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ActivityRegistration::CheckInTime)
                                .timestamp_with_time_zone(),
                        )
                        .col(ColumnDef::new(ActivityRegistration::IsLate).boolean())
                        .col(
                            ColumnDef::new(ActivityRegistration::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(ActivityRegistration::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_registration_activity")
                                .from(
                                    ActivityRegistration::Table,
                                    ActivityRegistration::ActivityId,
                                )
                                .to(Activity::Table, Activity::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Capacity count and duplicate guard both probe by activity
            manager
                .create_index(
                    Index::create()
                        .name("idx_registration_activity_status")
                        .table(ActivityRegistration::Table)
                        .col(ActivityRegistration::ActivityId)
                        .col(ActivityRegistration::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_registration_activity_user")
                        .table(ActivityRegistration::Table)
                        .col(ActivityRegistration::ActivityId)
                        .col(ActivityRegistration::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_registration_user_id")
                        .table(ActivityRegistration::Table)
                        .col(ActivityRegistration::UserId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ActivityRegistration::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ActivityRegistration {
        Table,
        Id,
        ActivityId,
        UserId,
        Status,
        PaymentStatus,
        PaymentAmount,
        RegistrationTime,
        Note,
        CheckedIn,
        CheckInTime,
        IsLate,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Activity {
        Table,
        Id,
    }
}
