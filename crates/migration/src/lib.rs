//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_user_credentials;
mod m20240101_000003_create_service_offering;
mod m20240101_000004_create_product;
mod m20240101_000005_create_address;
mod m20240101_000006_create_booking;
mod m20240101_000007_create_order;
mod m20240101_000008_create_order_item;
mod m20240101_000009_create_quote;
mod m20240101_000010_create_quote_response;
mod m20240101_000011_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_user_credentials::Migration),
            Box::new(m20240101_000003_create_service_offering::Migration),
            Box::new(m20240101_000004_create_product::Migration),
            Box::new(m20240101_000005_create_address::Migration),
            Box::new(m20240101_000006_create_booking::Migration),
            Box::new(m20240101_000007_create_order::Migration),
            Box::new(m20240101_000008_create_order_item::Migration),
            Box::new(m20240101_000009_create_quote::Migration),
            Box::new(m20240101_000010_create_quote_response::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000011_add_indexes::Migration),
        ]
    }
}
