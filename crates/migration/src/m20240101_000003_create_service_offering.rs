use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceOffering::Table)
                    .if_not_exists()
                    .col(uuid(ServiceOffering::Id).primary_key())
                    .col(uuid(ServiceOffering::ProviderId).not_null())
                    .col(string_len(ServiceOffering::Name, 128).not_null())
                    .col(text_null(ServiceOffering::Description))
                    .col(decimal_len(ServiceOffering::Price, 12, 2).not_null())
                    .col(integer(ServiceOffering::DurationMinutes).not_null())
                    .col(boolean(ServiceOffering::Active).not_null())
                    .col(timestamp_with_time_zone(ServiceOffering::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceOffering::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_offering_provider")
                            .from(ServiceOffering::Table, ServiceOffering::ProviderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceOffering::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceOffering {
    Table,
    Id,
    ProviderId,
    Name,
    Description,
    Price,
    DurationMinutes,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
