use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Users: unique (email, role) — one account per role for an email
        manager
            .create_index(
                Index::create()
                    .name("uniq_user_email_role")
                    .table(User::Table)
                    .col(User::Email)
                    .col(User::Role)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Bookings: lookups by customer, provider, status
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_customer")
                    .table(Booking::Table)
                    .col(Booking::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_provider_status")
                    .table(Booking::Table)
                    .col(Booking::ProviderId)
                    .col(Booking::Status)
                    .to_owned(),
            )
            .await?;

        // Orders: lookups by customer and status
        manager
            .create_index(
                Index::create()
                    .name("idx_order_customer")
                    .table(Order::Table)
                    .col(Order::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_order_status")
                    .table(Order::Table)
                    .col(Order::Status)
                    .to_owned(),
            )
            .await?;

        // Order items: fetch by parent order
        manager
            .create_index(
                Index::create()
                    .name("idx_order_item_order")
                    .table(OrderItem::Table)
                    .col(OrderItem::OrderId)
                    .to_owned(),
            )
            .await?;

        // Quotes: provider inbox
        manager
            .create_index(
                Index::create()
                    .name("idx_quote_provider_status")
                    .table(Quote::Table)
                    .col(Quote::ProviderId)
                    .col(Quote::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_user_email_role").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_customer").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_provider_status").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_order_customer").table(Order::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_order_status").table(Order::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_order_item_order").table(OrderItem::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_quote_provider_status").table(Quote::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User { Table, Email, Role }

#[derive(DeriveIden)]
enum Booking { Table, CustomerId, ProviderId, Status }

#[derive(DeriveIden)]
enum Order { Table, CustomerId, Status }

#[derive(DeriveIden)]
enum OrderItem { Table, OrderId }

#[derive(DeriveIden)]
enum Quote { Table, ProviderId, Status }
