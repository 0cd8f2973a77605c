use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

pub mod auth;
pub mod addresses;
pub mod bookings;
pub mod catalog;
pub mod orders;
pub mod quotes;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public, authenticated, and admin routes
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    // Public routes (health + docs); catalog GETs pass the middleware whitelist
    let public = Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()));

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let catalog_routes = Router::new()
        .route("/catalog/services", get(catalog::list_services).post(catalog::create_service))
        .route("/catalog/services/:id", put(catalog::update_service))
        .route("/catalog/products", get(catalog::list_products).post(catalog::create_product))
        .route("/catalog/products/:id", put(catalog::update_product));

    let address_routes = Router::new()
        .route("/addresses", post(addresses::create).get(addresses::list))
        .route("/addresses/:id", delete(addresses::delete));

    let booking_routes = Router::new()
        .route("/bookings", post(bookings::create).get(bookings::list))
        .route("/bookings/:id", get(bookings::get))
        .route("/bookings/:id/transition", post(bookings::transition))
        .route("/bookings/:id/cancel", post(bookings::cancel));

    let order_routes = Router::new()
        .route("/orders", post(orders::create).get(orders::list))
        .route("/orders/:id", get(orders::get))
        .route("/orders/:id/status", post(orders::set_status))
        .route("/orders/:id/pay", post(orders::pay));

    let quote_routes = Router::new()
        .route("/quotes", post(quotes::create).get(quotes::list))
        .route("/quotes/:id", get(quotes::get))
        .route("/quotes/:id/respond", post(quotes::respond))
        .route("/quotes/:id/decide", post(quotes::decide))
        .route("/quotes/:id/close", post(quotes::close));

    let admin_routes = Router::new()
        .route("/admin/bookings/:id/override", post(bookings::admin_override));

    public
        .merge(auth_routes)
        .merge(catalog_routes)
        .merge(address_routes)
        .merge(booking_routes)
        .merge(order_routes)
        .merge(quote_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
