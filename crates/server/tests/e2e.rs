use std::net::SocketAddr;

use axum::Router;
use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes;
use server::startup::build_state;

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
    client: reqwest::Client,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Ensure models prefer env over config file
    std::env::set_var("CONFIG_PATH", "/nonexistent-config-for-tests.toml");

    // Use DATABASE_URL from environment; if not present, skip tests gracefully
    if std::env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!("missing DATABASE_URL"));
    }

    // Connect DB and run migrations
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("migrations notice: {}", e);
    }

    let state = build_state(db, "test-secret".into(), Decimal::new(15, 2), Decimal::ZERO);
    let app: Router = routes::build_router(cors(), state);

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url, client: reqwest::Client::new() })
}

/// Expect a 200 and parse the JSON body, with the body in the failure message.
async fn json_ok(resp: reqwest::Response) -> anyhow::Result<serde_json::Value> {
    let status = resp.status();
    let text = resp.text().await?;
    anyhow::ensure!(status == HttpStatusCode::OK, "unexpected status {}: {}", status, text);
    Ok(serde_json::from_str(&text)?)
}

async fn register_and_login(app: &TestApp, role: &str) -> anyhow::Result<(Uuid, String)> {
    let email = format!("{}_{}@example.com", role, Uuid::new_v4());
    let resp = app
        .client
        .post(format!("{}/auth/register", app.base_url))
        .json(&json!({
            "email": email,
            "name": format!("{} user", role),
            "phone": null,
            "password": "Passw0rd!",
            "role": role,
        }))
        .send()
        .await?;
    let body = json_ok(resp).await?;
    let user_id: Uuid = body["user_id"].as_str().unwrap().parse()?;

    let resp = app
        .client
        .post(format!("{}/auth/login", app.base_url))
        .json(&json!({ "email": email, "password": "Passw0rd!", "role": role }))
        .send()
        .await?;
    let body = json_ok(resp).await?;
    let token = body["token"].as_str().unwrap().to_string();
    Ok((user_id, token))
}

#[tokio::test]
async fn booking_lifecycle_end_to_end() -> anyhow::Result<()> {
    let app = match start_server().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("skip e2e: {}", e);
            return Ok(());
        }
    };

    let (_provider_id, provider_token) = register_and_login(&app, "provider").await?;
    let (_customer_id, customer_token) = register_and_login(&app, "customer").await?;

    // Provider publishes a service
    let resp = app
        .client
        .post(format!("{}/catalog/services", app.base_url))
        .bearer_auth(&provider_token)
        .json(&json!({ "name": "Deep clean", "description": null, "price": "800.00", "duration_minutes": 120 }))
        .send()
        .await?;
    let service = json_ok(resp).await?;
    let service_id = service["id"].as_str().unwrap().to_string();

    // Customer books it
    let resp = app
        .client
        .post(format!("{}/bookings", app.base_url))
        .bearer_auth(&customer_token)
        .json(&json!({
            "service_id": service_id,
            "scheduled_at": "2026-09-01T10:00:00+00:00",
            "address_text": "1 Main St, Springfield",
            "latitude": null,
            "longitude": null,
            "addon_amount": "100.00",
            "discount_amount": "50.00",
            "tax_amount": "0",
        }))
        .send()
        .await?;
    let booking = json_ok(resp).await?;
    let booking_id = booking["id"].as_str().unwrap().to_string();
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["money"]["total_amount"], "850.00");

    // Provider runs the lifecycle
    for (action, expected) in [("accept", "confirmed"), ("start", "in_progress"), ("complete", "completed")] {
        let resp = app
            .client
            .post(format!("{}/bookings/{}/transition", app.base_url, booking_id))
            .bearer_auth(&provider_token)
            .json(&json!({ "action": action }))
            .send()
            .await?;
        let body = json_ok(resp).await?;
        assert_eq!(body["status"], expected, "action {}", action);
    }

    // Terminal state rejects further actions
    let resp = app
        .client
        .post(format!("{}/bookings/{}/transition", app.base_url, booking_id))
        .bearer_auth(&provider_token)
        .json(&json!({ "action": "complete" }))
        .send()
        .await?;
    assert_eq!(resp.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);

    // Unauthenticated requests are rejected
    let resp = app.client.get(format!("{}/bookings", app.base_url)).send().await?;
    assert_eq!(resp.status(), HttpStatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn order_checkout_end_to_end() -> anyhow::Result<()> {
    let app = match start_server().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("skip e2e: {}", e);
            return Ok(());
        }
    };

    let (_seller_id, seller_token) = register_and_login(&app, "seller").await?;
    let (_customer_id, customer_token) = register_and_login(&app, "customer").await?;

    // Seller lists two products
    let mut product_ids = Vec::new();
    for (name, price) in [("Vacuum", "500.00"), ("Mop", "300.00")] {
        let resp = app
            .client
            .post(format!("{}/catalog/products", app.base_url))
            .bearer_auth(&seller_token)
            .json(&json!({ "name": name, "description": null, "price": price, "image_url": null, "stock_quantity": 10 }))
            .send()
            .await?;
        let product = json_ok(resp).await?;
        product_ids.push(product["id"].as_str().unwrap().to_string());
    }

    // Customer saves an address
    let resp = app
        .client
        .post(format!("{}/addresses", app.base_url))
        .bearer_auth(&customer_token)
        .json(&json!({ "label": "home", "line1": "1 Main St", "city": "Springfield", "postal_code": "12345", "phone": "555-0100" }))
        .send()
        .await?;
    let address = json_ok(resp).await?;
    let address_id = address["id"].as_str().unwrap().to_string();

    // Empty cart is rejected up front
    let resp = app
        .client
        .post(format!("{}/orders", app.base_url))
        .bearer_auth(&customer_token)
        .json(&json!({ "address_id": address_id, "payment_method": "cash_on_delivery", "lines": [], "discount_amount": "0", "tax_amount": "0" }))
        .send()
        .await?;
    assert_eq!(resp.status(), HttpStatusCode::BAD_REQUEST);

    // Checkout: 2x500 + 1x300 + shipping 60 = 1360
    let resp = app
        .client
        .post(format!("{}/orders", app.base_url))
        .bearer_auth(&customer_token)
        .json(&json!({
            "address_id": address_id,
            "payment_method": "cash_on_delivery",
            "lines": [
                { "product_id": product_ids[0], "quantity": 2 },
                { "product_id": product_ids[1], "quantity": 1 },
            ],
            "shipping_cost": "60.00",
            "discount_amount": "0",
            "tax_amount": "0",
        }))
        .send()
        .await?;
    let order = json_ok(resp).await?;
    let order_id = order["id"].as_str().unwrap().to_string();
    assert_eq!(order["status"], "processing");
    assert_eq!(order["subtotal"], "1300.00");
    assert_eq!(order["total_amount"], "1360.00");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    // Seller ships it with tracking metadata
    let resp = app
        .client
        .post(format!("{}/orders/{}/status", app.base_url, order_id))
        .bearer_auth(&seller_token)
        .json(&json!({ "status": "shipped", "tracking_number": "TRK-9", "carrier": "acme" }))
        .send()
        .await?;
    let body = json_ok(resp).await?;
    assert_eq!(body["status"], "shipped");
    assert_eq!(body["tracking_number"], "TRK-9");

    // Backward move is rejected by the transition table
    let resp = app
        .client
        .post(format!("{}/orders/{}/status", app.base_url, order_id))
        .bearer_auth(&seller_token)
        .json(&json!({ "status": "processing" }))
        .send()
        .await?;
    assert_eq!(resp.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);

    // Customers may not drive fulfillment
    let resp = app
        .client
        .post(format!("{}/orders/{}/status", app.base_url, order_id))
        .bearer_auth(&customer_token)
        .json(&json!({ "status": "delivered" }))
        .send()
        .await?;
    assert_eq!(resp.status(), HttpStatusCode::FORBIDDEN);

    Ok(())
}
