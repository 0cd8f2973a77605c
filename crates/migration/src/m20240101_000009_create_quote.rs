use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Quote::Table)
                    .if_not_exists()
                    .col(uuid(Quote::Id).primary_key())
                    .col(string_len(Quote::Code, 32).not_null().unique_key())
                    .col(uuid(Quote::CustomerId).not_null())
                    .col(uuid(Quote::ProviderId).not_null())
                    .col(uuid(Quote::ServiceId).not_null())
                    .col(text(Quote::Description).not_null())
                    .col(timestamp_with_time_zone_null(Quote::PreferredDate))
                    .col(string_len(Quote::Status, 24).not_null())
                    .col(timestamp_with_time_zone(Quote::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Quote::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quote_customer")
                            .from(Quote::Table, Quote::CustomerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quote_provider")
                            .from(Quote::Table, Quote::ProviderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quote_service")
                            .from(Quote::Table, Quote::ServiceId)
                            .to(ServiceOffering::Table, ServiceOffering::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Quote::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Quote {
    Table,
    Id,
    Code,
    CustomerId,
    ProviderId,
    ServiceId,
    Description,
    PreferredDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum ServiceOffering { Table, Id }
