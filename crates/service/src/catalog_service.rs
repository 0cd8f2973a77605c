//! Catalog operations for provider services and seller products.
//! Thin CRUD in front of the entity helpers; ownership checked here.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use chrono::Utc;
use uuid::Uuid;

use common::pagination::Pagination;
use models::{product, service_offering};

use crate::access::{Actor, Capability};
use crate::errors::ServiceError;

/// Create a service offering owned by the calling provider.
pub async fn create_service_offering(
    db: &DatabaseConnection,
    actor: Actor,
    name: &str,
    description: Option<&str>,
    price: Decimal,
    duration_minutes: i32,
) -> Result<service_offering::Model, ServiceError> {
    if !actor.can(Capability::ManageServices) {
        return Err(ServiceError::Forbidden(Capability::ManageServices));
    }
    let created = service_offering::create(db, actor.user_id, name, description, price, duration_minutes).await?;
    Ok(created)
}

/// Flip availability or adjust the price of an offering.
pub async fn update_service_offering(
    db: &DatabaseConnection,
    actor: Actor,
    id: Uuid,
    price: Option<Decimal>,
    active: Option<bool>,
) -> Result<service_offering::Model, ServiceError> {
    if !actor.can(Capability::ManageServices) {
        return Err(ServiceError::Forbidden(Capability::ManageServices));
    }
    let found = service_offering::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("service offering"))?;
    if found.provider_id != actor.user_id && !actor.is_admin() {
        return Err(ServiceError::not_found("service offering"));
    }
    let mut am: service_offering::ActiveModel = found.into();
    if let Some(p) = price {
        if p < Decimal::ZERO {
            return Err(ServiceError::Validation("price must be >= 0".into()));
        }
        am.price = Set(p);
    }
    if let Some(a) = active {
        am.active = Set(a);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?)
}

/// Public listing of active offerings.
pub async fn list_service_offerings(
    db: &DatabaseConnection,
    opts: Pagination,
) -> Result<Vec<service_offering::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let rows = service_offering::Entity::find()
        .filter(service_offering::Column::Active.eq(true))
        .order_by_desc(service_offering::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows)
}

/// Create a product owned by the calling seller.
pub async fn create_product(
    db: &DatabaseConnection,
    actor: Actor,
    name: &str,
    description: Option<&str>,
    price: Decimal,
    image_url: Option<&str>,
    stock_quantity: i32,
) -> Result<product::Model, ServiceError> {
    if !actor.can(Capability::ManageProducts) {
        return Err(ServiceError::Forbidden(Capability::ManageProducts));
    }
    let created = product::create(db, actor.user_id, name, description, price, image_url, stock_quantity).await?;
    Ok(created)
}

/// Adjust price, stock, or availability of a product.
pub async fn update_product(
    db: &DatabaseConnection,
    actor: Actor,
    id: Uuid,
    price: Option<Decimal>,
    stock_quantity: Option<i32>,
    active: Option<bool>,
) -> Result<product::Model, ServiceError> {
    if !actor.can(Capability::ManageProducts) {
        return Err(ServiceError::Forbidden(Capability::ManageProducts));
    }
    let found = product::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("product"))?;
    if found.seller_id != actor.user_id && !actor.is_admin() {
        return Err(ServiceError::not_found("product"));
    }
    let mut am: product::ActiveModel = found.into();
    if let Some(p) = price {
        if p < Decimal::ZERO {
            return Err(ServiceError::Validation("price must be >= 0".into()));
        }
        am.price = Set(p);
    }
    if let Some(s) = stock_quantity {
        if s < 0 {
            return Err(ServiceError::Validation("stock must be >= 0".into()));
        }
        am.stock_quantity = Set(s);
    }
    if let Some(a) = active {
        am.active = Set(a);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?)
}

/// Public listing of active products.
pub async fn list_products(
    db: &DatabaseConnection,
    opts: Pagination,
) -> Result<Vec<product::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let rows = product::Entity::find()
        .filter(product::Column::Active.eq(true))
        .order_by_desc(product::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::test_support::get_db;
    use models::user;

    #[tokio::test]
    async fn catalog_crud_service() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let provider = user::create(
            &db,
            &format!("svc_provider_{}@example.com", Uuid::new_v4()),
            "Provider",
            None,
            user::ROLE_PROVIDER,
        )
        .await?;
        let actor = Actor::new(provider.id, Role::Provider);

        let svc = create_service_offering(&db, actor, "Lawn care", None, Decimal::new(12000, 2), 60).await?;
        assert!(svc.active);

        let updated = update_service_offering(&db, actor, svc.id, Some(Decimal::new(15000, 2)), Some(false)).await?;
        assert_eq!(updated.price, Decimal::new(15000, 2));
        assert!(!updated.active);

        // Customers cannot manage the catalog
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        let err = create_service_offering(&db, customer, "Nope", None, Decimal::ZERO, 30).await;
        assert!(err.is_err());

        service_offering::Entity::delete_by_id(svc.id).exec(&db).await?;
        user::hard_delete(&db, provider.id).await?;
        Ok(())
    }
}
