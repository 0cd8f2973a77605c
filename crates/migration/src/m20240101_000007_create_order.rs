use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Order::Table)
                    .if_not_exists()
                    .col(uuid(Order::Id).primary_key())
                    .col(string_len(Order::Code, 32).not_null().unique_key())
                    .col(uuid(Order::CustomerId).not_null())
                    .col(uuid(Order::AddressId).not_null())
                    .col(string_len(Order::ShippingAddress, 512).not_null())
                    .col(string_len_null(Order::ContactPhone, 32))
                    .col(string_len(Order::Status, 24).not_null())
                    .col(string_len(Order::PaymentStatus, 24).not_null())
                    .col(string_len(Order::PaymentMethod, 24).not_null())
                    .col(decimal_len(Order::Subtotal, 12, 2).not_null())
                    .col(decimal_len(Order::ShippingCost, 12, 2).not_null())
                    .col(decimal_len(Order::DiscountAmount, 12, 2).not_null())
                    .col(decimal_len(Order::TaxAmount, 12, 2).not_null())
                    .col(decimal_len(Order::TotalAmount, 12, 2).not_null())
                    .col(string_len_null(Order::TrackingNumber, 64))
                    .col(string_len_null(Order::Carrier, 64))
                    .col(text_null(Order::Notes))
                    .col(timestamp_with_time_zone_null(Order::DeliveredAt))
                    .col(timestamp_with_time_zone(Order::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Order::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_customer")
                            .from(Order::Table, Order::CustomerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_address")
                            .from(Order::Table, Order::AddressId)
                            .to(Address::Table, Address::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Order::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Order {
    Table,
    Id,
    Code,
    CustomerId,
    AddressId,
    ShippingAddress,
    ContactPhone,
    Status,
    PaymentStatus,
    PaymentMethod,
    Subtotal,
    ShippingCost,
    DiscountAmount,
    TaxAmount,
    TotalAmount,
    TrackingNumber,
    Carrier,
    Notes,
    DeliveredAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Address { Table, Id }
