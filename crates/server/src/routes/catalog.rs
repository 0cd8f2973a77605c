use axum::{extract::{Path, Query, State}, Extension, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use service::access::Actor;
use service::catalog_service;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;
use crate::routes::bookings::ListQuery;

#[derive(Debug, Deserialize)]
pub struct CreateServiceInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration_minutes: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceInput {
    pub price: Option<Decimal>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub active: Option<bool>,
}

#[utoipa::path(
    get, path = "/catalog/services", tag = "catalog",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list_services(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<models::service_offering::Model>>, JsonApiError> {
    let rows = catalog_service::list_service_offerings(&state.db, q.pagination()).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post, path = "/catalog/services", tag = "catalog",
    request_body = crate::openapi::CreateServiceInputDoc,
    responses((status = 200, description = "Created"), (status = 403, description = "Forbidden"))
)]
pub async fn create_service(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateServiceInput>,
) -> Result<Json<models::service_offering::Model>, JsonApiError> {
    let created = catalog_service::create_service_offering(
        &state.db,
        actor,
        &input.name,
        input.description.as_deref(),
        input.price,
        input.duration_minutes,
    )
    .await?;
    Ok(Json(created))
}

#[utoipa::path(
    put, path = "/catalog/services/{id}", tag = "catalog",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = crate::openapi::UpdateServiceInputDoc,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"))
)]
pub async fn update_service(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateServiceInput>,
) -> Result<Json<models::service_offering::Model>, JsonApiError> {
    let updated = catalog_service::update_service_offering(&state.db, actor, id, input.price, input.active).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    get, path = "/catalog/products", tag = "catalog",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list_products(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<models::product::Model>>, JsonApiError> {
    let rows = catalog_service::list_products(&state.db, q.pagination()).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post, path = "/catalog/products", tag = "catalog",
    request_body = crate::openapi::CreateProductInputDoc,
    responses((status = 200, description = "Created"), (status = 403, description = "Forbidden"))
)]
pub async fn create_product(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateProductInput>,
) -> Result<Json<models::product::Model>, JsonApiError> {
    let created = catalog_service::create_product(
        &state.db,
        actor,
        &input.name,
        input.description.as_deref(),
        input.price,
        input.image_url.as_deref(),
        input.stock_quantity,
    )
    .await?;
    Ok(Json(created))
}

#[utoipa::path(
    put, path = "/catalog/products/{id}", tag = "catalog",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = crate::openapi::UpdateProductInputDoc,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"))
)]
pub async fn update_product(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> Result<Json<models::product::Model>, JsonApiError> {
    let updated = catalog_service::update_product(&state.db, actor, id, input.price, input.stock_quantity, input.active).await?;
    Ok(Json(updated))
}
