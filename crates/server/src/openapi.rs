use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub phone: Option<String>, pub password: String, pub role: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String, pub role: String }

#[derive(utoipa::ToSchema)]
pub struct CreateBookingInputDoc {
    pub service_id: Uuid,
    pub scheduled_at: String,
    pub address_text: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub addon_amount: Option<f64>,
    pub discount_amount: Option<f64>,
    pub tax_amount: Option<f64>,
}

#[derive(utoipa::ToSchema)]
pub struct BookingTransitionInputDoc {
    /// accept | reject | start | complete | cancel
    pub action: String,
}

#[derive(utoipa::ToSchema)]
pub struct BookingCancelInputDoc {
    pub reason: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct BookingOverrideInputDoc {
    /// Target status, e.g. provider_enroute or refund_requested
    pub status: String,
}

#[derive(utoipa::ToSchema)]
pub struct CartLineDoc { pub product_id: Uuid, pub quantity: u32 }

#[derive(utoipa::ToSchema)]
pub struct CreateOrderInputDoc {
    pub address_id: Uuid,
    /// cash_on_delivery | card | bank_transfer
    pub payment_method: String,
    pub lines: Vec<CartLineDoc>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub shipping_cost: Option<f64>,
    pub discount_amount: Option<f64>,
    pub tax_amount: Option<f64>,
}

#[derive(utoipa::ToSchema)]
pub struct OrderStatusInputDoc {
    /// Target fulfillment status, forward-only
    pub status: String,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct CreateQuoteInputDoc {
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub description: String,
    pub preferred_date: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct RespondQuoteInputDoc {
    pub message: String,
    pub quoted_price: f64,
    pub estimated_duration_minutes: Option<i32>,
}

#[derive(utoipa::ToSchema)]
pub struct QuoteDecideInputDoc { pub accept: bool }

#[derive(utoipa::ToSchema)]
pub struct CreateServiceInputDoc {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_minutes: i32,
}

#[derive(utoipa::ToSchema)]
pub struct UpdateServiceInputDoc {
    pub price: Option<f64>,
    pub active: Option<bool>,
}

#[derive(utoipa::ToSchema)]
pub struct CreateProductInputDoc {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
}

#[derive(utoipa::ToSchema)]
pub struct UpdateProductInputDoc {
    pub price: Option<f64>,
    pub stock_quantity: Option<i32>,
    pub active: Option<bool>,
}

#[derive(utoipa::ToSchema)]
pub struct AddressInputDoc {
    pub label: Option<String>,
    pub line1: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::catalog::list_services,
        crate::routes::catalog::create_service,
        crate::routes::catalog::update_service,
        crate::routes::catalog::list_products,
        crate::routes::catalog::create_product,
        crate::routes::catalog::update_product,
        crate::routes::addresses::create,
        crate::routes::addresses::list,
        crate::routes::addresses::delete,
        crate::routes::bookings::create,
        crate::routes::bookings::list,
        crate::routes::bookings::get,
        crate::routes::bookings::transition,
        crate::routes::bookings::cancel,
        crate::routes::bookings::admin_override,
        crate::routes::orders::create,
        crate::routes::orders::list,
        crate::routes::orders::get,
        crate::routes::orders::set_status,
        crate::routes::orders::pay,
        crate::routes::quotes::create,
        crate::routes::quotes::list,
        crate::routes::quotes::get,
        crate::routes::quotes::respond,
        crate::routes::quotes::decide,
        crate::routes::quotes::close,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CreateBookingInputDoc,
            BookingTransitionInputDoc,
            BookingCancelInputDoc,
            BookingOverrideInputDoc,
            CartLineDoc,
            CreateOrderInputDoc,
            OrderStatusInputDoc,
            CreateQuoteInputDoc,
            RespondQuoteInputDoc,
            QuoteDecideInputDoc,
            CreateServiceInputDoc,
            UpdateServiceInputDoc,
            CreateProductInputDoc,
            UpdateProductInputDoc,
            AddressInputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "catalog"),
        (name = "addresses"),
        (name = "bookings"),
        (name = "orders"),
        (name = "quotes"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
