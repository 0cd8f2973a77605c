use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Address::Table)
                    .if_not_exists()
                    .col(uuid(Address::Id).primary_key())
                    .col(uuid(Address::UserId).not_null())
                    .col(string_len(Address::Label, 64).not_null())
                    .col(string_len(Address::Line1, 256).not_null())
                    .col(string_len(Address::City, 128).not_null())
                    .col(string_len_null(Address::PostalCode, 32))
                    .col(string_len_null(Address::Phone, 32))
                    .col(double_null(Address::Latitude))
                    .col(double_null(Address::Longitude))
                    .col(timestamp_with_time_zone(Address::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_address_user")
                            .from(Address::Table, Address::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Address::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Address {
    Table,
    Id,
    UserId,
    Label,
    Line1,
    City,
    PostalCode,
    Phone,
    Latitude,
    Longitude,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
