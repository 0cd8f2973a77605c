use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::QuoteStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuoteInput {
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub description: String,
    pub preferred_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondQuoteInput {
    pub message: String,
    pub quoted_price: Decimal,
    pub estimated_duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub provider_id: Uuid,
    pub message: String,
    pub quoted_price: Decimal,
    pub estimated_duration_minutes: Option<i32>,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub code: String,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub description: String,
    pub preferred_date: Option<DateTime<FixedOffset>>,
    pub status: QuoteStatus,
    pub responses: Vec<QuoteResponse>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct NewQuote {
    pub id: Uuid,
    pub code: String,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub description: String,
    pub preferred_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone)]
pub struct NewQuoteResponse {
    pub quote_id: Uuid,
    pub provider_id: Uuid,
    pub message: String,
    pub quoted_price: Decimal,
    pub estimated_duration_minutes: Option<i32>,
}
