use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Role;
use crate::payments::PaymentStatus;

use super::status::BookingStatus;

/// Checkout request for a single service engagement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingInput {
    pub service_id: Uuid,
    pub scheduled_at: DateTime<FixedOffset>,
    pub address_text: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub addon_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
}

/// Monetary breakdown, fixed at creation time. Transitions never touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingMoney {
    pub service_amount: Decimal,
    pub addon_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub commission_amount: Decimal,
    pub provider_earnings: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    pub reason: Option<String>,
    pub by: Role,
    pub at: DateTime<FixedOffset>,
}

/// Domain view of a booking (business view, typed status).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub code: String,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub scheduled_at: DateTime<FixedOffset>,
    pub address_text: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub money: BookingMoney,
    pub cancellation: Option<Cancellation>,
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Row to persist for a new booking; id/code generated by the service.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub id: Uuid,
    pub code: String,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub scheduled_at: DateTime<FixedOffset>,
    pub address_text: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub money: BookingMoney,
}

/// The slice of a service offering a booking needs at creation time.
#[derive(Debug, Clone)]
pub struct OfferingSnapshot {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub price: Decimal,
    pub active: bool,
}

/// Status mutation applied through the compare-and-swap repository call.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub to: BookingStatus,
    pub cancellation: Option<Cancellation>,
}

impl BookingMoney {
    /// `total = service + addon - discount + tax`; commission split taken
    /// from the total at the given rate, rounded to cents.
    pub fn compute(
        service_amount: Decimal,
        addon_amount: Decimal,
        discount_amount: Decimal,
        tax_amount: Decimal,
        commission_rate: Decimal,
    ) -> Self {
        let total_amount = service_amount + addon_amount - discount_amount + tax_amount;
        let commission_amount = (total_amount * commission_rate).round_dp(2);
        let provider_earnings = total_amount - commission_amount;
        Self {
            service_amount,
            addon_amount,
            discount_amount,
            tax_amount,
            total_amount,
            commission_amount,
            provider_earnings,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.total_amount
            == self.service_amount + self.addon_amount - self.discount_amount + self.tax_amount
            && self.commission_amount + self.provider_earnings == self.total_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_breakdown_adds_up() {
        // service 800 + addon 100 - discount 50 + tax 0 == 850
        let m = BookingMoney::compute(
            Decimal::new(80000, 2),
            Decimal::new(10000, 2),
            Decimal::new(5000, 2),
            Decimal::ZERO,
            Decimal::new(15, 2),
        );
        assert_eq!(m.total_amount, Decimal::new(85000, 2));
        assert!(m.is_consistent());
    }

    #[test]
    fn commission_split_preserves_total() {
        let m = BookingMoney::compute(
            Decimal::new(9999, 2),
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::new(15, 2),
        );
        // 99.99 * 0.15 = 14.9985 -> 15.00 after rounding
        assert_eq!(m.commission_amount, Decimal::new(1500, 2));
        assert_eq!(m.provider_earnings, Decimal::new(8499, 2));
        assert!(m.is_consistent());
    }
}
