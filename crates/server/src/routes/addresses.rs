use axum::{extract::{Path, Query, State}, http::StatusCode, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use service::access::Actor;
use service::address_service::{self, CreateAddressInput};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;
use crate::routes::bookings::ListQuery;

#[derive(Debug, Deserialize)]
pub struct AddressInput {
    pub label: Option<String>,
    pub line1: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[utoipa::path(
    post, path = "/addresses", tag = "addresses",
    request_body = crate::openapi::AddressInputDoc,
    responses((status = 200, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<AddressInput>,
) -> Result<Json<models::address::Model>, JsonApiError> {
    let created = address_service::create_address(
        &state.db,
        actor,
        CreateAddressInput {
            label: input.label.unwrap_or_default(),
            line1: input.line1,
            city: input.city,
            postal_code: input.postal_code,
            phone: input.phone,
            latitude: input.latitude,
            longitude: input.longitude,
        },
    )
    .await?;
    Ok(Json(created))
}

#[utoipa::path(
    get, path = "/addresses", tag = "addresses",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<models::address::Model>>, JsonApiError> {
    let rows = address_service::list_addresses(&state.db, actor, q.pagination()).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    delete, path = "/addresses/{id}", tag = "addresses",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    address_service::delete_address(&state.db, actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
