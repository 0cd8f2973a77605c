use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(string_len(Booking::Code, 32).not_null().unique_key())
                    .col(uuid(Booking::CustomerId).not_null())
                    .col(uuid(Booking::ProviderId).not_null())
                    .col(uuid(Booking::ServiceId).not_null())
                    .col(timestamp_with_time_zone(Booking::ScheduledAt).not_null())
                    .col(string_len(Booking::AddressText, 512).not_null())
                    .col(double_null(Booking::Latitude))
                    .col(double_null(Booking::Longitude))
                    .col(string_len(Booking::Status, 24).not_null())
                    .col(string_len(Booking::PaymentStatus, 24).not_null())
                    .col(decimal_len(Booking::ServiceAmount, 12, 2).not_null())
                    .col(decimal_len(Booking::AddonAmount, 12, 2).not_null())
                    .col(decimal_len(Booking::DiscountAmount, 12, 2).not_null())
                    .col(decimal_len(Booking::TaxAmount, 12, 2).not_null())
                    .col(decimal_len(Booking::TotalAmount, 12, 2).not_null())
                    .col(decimal_len(Booking::CommissionAmount, 12, 2).not_null())
                    .col(decimal_len(Booking::ProviderEarnings, 12, 2).not_null())
                    .col(string_len_null(Booking::CancellationReason, 512))
                    .col(string_len_null(Booking::CancelledBy, 16))
                    .col(timestamp_with_time_zone_null(Booking::CancelledAt))
                    .col(timestamp_with_time_zone_null(Booking::CompletedAt))
                    .col(timestamp_with_time_zone(Booking::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Booking::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_customer")
                            .from(Booking::Table, Booking::CustomerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_provider")
                            .from(Booking::Table, Booking::ProviderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_service")
                            .from(Booking::Table, Booking::ServiceId)
                            .to(ServiceOffering::Table, ServiceOffering::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Booking::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Booking {
    Table,
    Id,
    Code,
    CustomerId,
    ProviderId,
    ServiceId,
    ScheduledAt,
    AddressText,
    Latitude,
    Longitude,
    Status,
    PaymentStatus,
    ServiceAmount,
    AddonAmount,
    DiscountAmount,
    TaxAmount,
    TotalAmount,
    CommissionAmount,
    ProviderEarnings,
    CancellationReason,
    CancelledBy,
    CancelledAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum ServiceOffering { Table, Id }
