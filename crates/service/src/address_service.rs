//! Address book operations. Addresses are user-owned leaf records.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use common::pagination::Pagination;
use models::address;

use crate::access::Actor;
use crate::errors::ServiceError;

pub struct CreateAddressInput {
    pub label: String,
    pub line1: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub async fn create_address(
    db: &DatabaseConnection,
    actor: Actor,
    input: CreateAddressInput,
) -> Result<address::Model, ServiceError> {
    let created = address::create(
        db,
        actor.user_id,
        &input.label,
        &input.line1,
        &input.city,
        input.postal_code.as_deref(),
        input.phone.as_deref(),
        input.latitude,
        input.longitude,
    )
    .await?;
    Ok(created)
}

pub async fn list_addresses(
    db: &DatabaseConnection,
    actor: Actor,
    opts: Pagination,
) -> Result<Vec<address::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let rows = address::Entity::find()
        .filter(address::Column::UserId.eq(actor.user_id))
        .order_by_desc(address::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows)
}

pub async fn delete_address(db: &DatabaseConnection, actor: Actor, id: Uuid) -> Result<(), ServiceError> {
    let found = address::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("address"))?;
    if found.user_id != actor.user_id && !actor.is_admin() {
        return Err(ServiceError::not_found("address"));
    }
    address::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}
