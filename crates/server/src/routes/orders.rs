use axum::{extract::{Path, Query, State}, Extension, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use service::access::Actor;
use service::order::domain::{CreateOrderInput, Order, ShippingUpdate};
use service::order::status::OrderStatus;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;
use crate::routes::bookings::ListQuery;

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
}

#[utoipa::path(
    post, path = "/orders", tag = "orders",
    request_body = crate::openapi::CreateOrderInputDoc,
    responses(
        (status = 200, description = "Created"),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateOrderInput>,
) -> Result<Json<Order>, JsonApiError> {
    let order = state.orders.create(actor, input).await?;
    info!(order_id = %order.id, code = %order.code, items = order.items.len(), "order created");
    Ok(Json(order))
}

#[utoipa::path(
    get, path = "/orders", tag = "orders",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Order>>, JsonApiError> {
    let rows = state.orders.list_for_actor(actor, q.pagination()).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get, path = "/orders/{id}", tag = "orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, JsonApiError> {
    let order = state.orders.get(actor, id).await?;
    Ok(Json(order))
}

#[utoipa::path(
    post, path = "/orders/{id}/status", tag = "orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = crate::openapi::OrderStatusInputDoc,
    responses(
        (status = 200, description = "Transitioned"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Conflict"),
        (status = 422, description = "Invalid Transition")
    )
)]
pub async fn set_status(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusInput>,
) -> Result<Json<Order>, JsonApiError> {
    let shipping = ShippingUpdate { tracking_number: input.tracking_number, carrier: input.carrier };
    let order = state.orders.transition(actor, id, input.status, shipping).await?;
    Ok(Json(order))
}

#[utoipa::path(
    post, path = "/orders/{id}/pay", tag = "orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Paid"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Conflict")
    )
)]
pub async fn pay(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, JsonApiError> {
    let order = state.orders.mark_paid(actor, id).await?;
    Ok(Json(order))
}
