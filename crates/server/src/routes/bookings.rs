use axum::{extract::{Path, Query, State}, Extension, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::pagination::Pagination;
use service::access::Actor;
use service::booking::domain::{Booking, CreateBookingInput};
use service::booking::status::{BookingAction, BookingStatus};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        let d = Pagination::default();
        Pagination { page: self.page.unwrap_or(d.page), per_page: self.per_page.unwrap_or(d.per_page) }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransitionInput {
    pub action: BookingAction,
}

#[derive(Debug, Deserialize)]
pub struct CancelInput {
    pub reason: Option<String>,
}

#[utoipa::path(
    post, path = "/bookings", tag = "bookings",
    request_body = crate::openapi::CreateBookingInputDoc,
    responses(
        (status = 200, description = "Created"),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateBookingInput>,
) -> Result<Json<Booking>, JsonApiError> {
    let booking = state.bookings.create(actor, input).await?;
    info!(booking_id = %booking.id, code = %booking.code, "booking created");
    Ok(Json(booking))
}

#[utoipa::path(
    get, path = "/bookings", tag = "bookings",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Booking>>, JsonApiError> {
    let rows = state.bookings.list_for_actor(actor, q.pagination()).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get, path = "/bookings/{id}", tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, JsonApiError> {
    let booking = state.bookings.get(actor, id).await?;
    Ok(Json(booking))
}

#[utoipa::path(
    post, path = "/bookings/{id}/transition", tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = crate::openapi::BookingTransitionInputDoc,
    responses(
        (status = 200, description = "Transitioned"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Conflict"),
        (status = 422, description = "Invalid Transition")
    )
)]
pub async fn transition(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<TransitionInput>,
) -> Result<Json<Booking>, JsonApiError> {
    let booking = state.bookings.transition(actor, id, input.action).await?;
    Ok(Json(booking))
}

#[utoipa::path(
    post, path = "/bookings/{id}/cancel", tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = crate::openapi::BookingCancelInputDoc,
    responses(
        (status = 200, description = "Cancelled"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Invalid Transition")
    )
)]
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<CancelInput>,
) -> Result<Json<Booking>, JsonApiError> {
    let booking = state.bookings.cancel(actor, id, input.reason).await?;
    Ok(Json(booking))
}

#[derive(Debug, Deserialize)]
pub struct OverrideInput {
    pub status: BookingStatus,
}

#[utoipa::path(
    post, path = "/admin/bookings/{id}/override", tag = "admin",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = crate::openapi::BookingOverrideInputDoc,
    responses(
        (status = 200, description = "Overridden"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid Transition")
    )
)]
pub async fn admin_override(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<OverrideInput>,
) -> Result<Json<Booking>, JsonApiError> {
    let booking = state.bookings.force_status(actor, id, input.status).await?;
    info!(booking_id = %booking.id, to = %booking.status, "booking status overridden");
    Ok(Json(booking))
}
