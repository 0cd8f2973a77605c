use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payments::{PaymentMethod, PaymentStatus};

use super::status::OrderStatus;

/// One cart line at checkout; prices are resolved server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderInput {
    pub address_id: Uuid,
    pub payment_method: PaymentMethod,
    pub lines: Vec<CartLine>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub shipping_cost: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
}

/// Product fields an order snapshot needs at checkout.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub active: bool,
}

/// Address fields denormalized onto the order row.
#[derive(Debug, Clone)]
pub struct AddressSnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_image: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub code: String,
    pub customer_id: Uuid,
    pub address_id: Uuid,
    pub shipping_address: String,
    pub contact_phone: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub delivered_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl Order {
    pub fn is_consistent(&self) -> bool {
        let items_total: Decimal = self.items.iter().map(|i| i.total_price).sum();
        self.subtotal == items_total
            && self.total_amount
                == self.subtotal + self.shipping_cost - self.discount_amount + self.tax_amount
    }
}

/// Aggregate to persist atomically: the order row plus one row per item.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub code: String,
    pub customer_id: Uuid,
    pub address_id: Uuid,
    pub shipping_address: String,
    pub contact_phone: Option<String>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_image: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Optional shipping metadata attached while moving an order forward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingUpdate {
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
}
