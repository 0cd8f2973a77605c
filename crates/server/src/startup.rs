use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use rust_decimal::Decimal;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::booking::repo::seaorm::SeaOrmBookingRepository;
use service::booking::service::{BookingConfig, BookingService};
use service::events::{EventPublisher, TracingEventPublisher};
use service::order::repo::seaorm::SeaOrmOrderRepository;
use service::order::service::{OrderConfig, OrderService};
use service::quote::repo::seaorm::SeaOrmQuoteRepository;
use service::quote::service::QuoteService;

use crate::routes::{self, auth};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8081);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

fn platform_config() -> configs::PlatformConfig {
    match configs::load_default() {
        Ok(cfg) => cfg.platform,
        Err(_) => configs::PlatformConfig::default(),
    }
}

/// Wire repositories, services, and state for a given connection.
pub fn build_state(db: sea_orm::DatabaseConnection, jwt_secret: String, commission_rate: Decimal, default_shipping_fee: Decimal) -> auth::ServerState {
    let events: Arc<dyn EventPublisher> = Arc::new(TracingEventPublisher);

    let bookings = Arc::new(BookingService::new(
        Arc::new(SeaOrmBookingRepository { db: db.clone() }),
        Arc::clone(&events),
        BookingConfig { commission_rate },
    ));
    let orders = Arc::new(OrderService::new(
        Arc::new(SeaOrmOrderRepository { db: db.clone() }),
        Arc::clone(&events),
        OrderConfig { default_shipping_fee },
    ));
    let quotes = Arc::new(QuoteService::new(
        Arc::new(SeaOrmQuoteRepository { db: db.clone() }),
        Arc::clone(&events),
    ));

    auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret },
        bookings,
        orders,
        quotes,
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // DB connection
    let db = models::db::connect().await?;

    // JWT secret
    let jwt_secret =
        std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());

    let platform = platform_config();
    let state = build_state(db, jwt_secret, platform.commission_rate, platform.default_shipping_fee);

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(cors, state);

    // Bind and serve
    let addr = load_bind_addr()?;
    info!(%addr, "starting marketplace server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
