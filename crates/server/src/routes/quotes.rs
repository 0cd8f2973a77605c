use axum::{extract::{Path, Query, State}, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use service::access::Actor;
use service::quote::domain::{CreateQuoteInput, Quote, RespondQuoteInput};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;
use crate::routes::bookings::ListQuery;

#[derive(Debug, Deserialize)]
pub struct DecideInput {
    pub accept: bool,
}

#[utoipa::path(
    post, path = "/quotes", tag = "quotes",
    request_body = crate::openapi::CreateQuoteInputDoc,
    responses((status = 200, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateQuoteInput>,
) -> Result<Json<Quote>, JsonApiError> {
    let quote = state.quotes.create(actor, input).await?;
    Ok(Json(quote))
}

#[utoipa::path(
    get, path = "/quotes", tag = "quotes",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Quote>>, JsonApiError> {
    let rows = state.quotes.list_for_actor(actor, q.pagination()).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get, path = "/quotes/{id}", tag = "quotes",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, JsonApiError> {
    let quote = state.quotes.get(actor, id).await?;
    Ok(Json(quote))
}

#[utoipa::path(
    post, path = "/quotes/{id}/respond", tag = "quotes",
    params(("id" = Uuid, Path, description = "Quote ID")),
    request_body = crate::openapi::RespondQuoteInputDoc,
    responses(
        (status = 200, description = "Responded"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Invalid Transition")
    )
)]
pub async fn respond(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<RespondQuoteInput>,
) -> Result<Json<Quote>, JsonApiError> {
    let quote = state.quotes.respond(actor, id, input).await?;
    Ok(Json(quote))
}

#[utoipa::path(
    post, path = "/quotes/{id}/decide", tag = "quotes",
    params(("id" = Uuid, Path, description = "Quote ID")),
    request_body = crate::openapi::QuoteDecideInputDoc,
    responses(
        (status = 200, description = "Decided"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Invalid Transition")
    )
)]
pub async fn decide(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<DecideInput>,
) -> Result<Json<Quote>, JsonApiError> {
    let quote = state.quotes.decide(actor, id, input.accept).await?;
    Ok(Json(quote))
}

#[utoipa::path(
    post, path = "/quotes/{id}/close", tag = "quotes",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Closed"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Invalid Transition")
    )
)]
pub async fn close(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, JsonApiError> {
    let quote = state.quotes.close(actor, id).await?;
    Ok(Json(quote))
}
