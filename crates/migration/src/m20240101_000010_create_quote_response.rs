use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(QuoteResponse::Table)
                    .if_not_exists()
                    .col(uuid(QuoteResponse::Id).primary_key())
                    .col(uuid(QuoteResponse::QuoteId).not_null())
                    .col(uuid(QuoteResponse::ProviderId).not_null())
                    .col(text(QuoteResponse::Message).not_null())
                    .col(decimal_len(QuoteResponse::QuotedPrice, 12, 2).not_null())
                    .col(integer_null(QuoteResponse::EstimatedDurationMinutes))
                    .col(timestamp_with_time_zone(QuoteResponse::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quote_response_quote")
                            .from(QuoteResponse::Table, QuoteResponse::QuoteId)
                            .to(Quote::Table, Quote::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quote_response_provider")
                            .from(QuoteResponse::Table, QuoteResponse::ProviderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(QuoteResponse::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum QuoteResponse {
    Table,
    Id,
    QuoteId,
    ProviderId,
    Message,
    QuotedPrice,
    EstimatedDurationMinutes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Quote { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
