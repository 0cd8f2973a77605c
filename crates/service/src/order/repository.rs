use async_trait::async_trait;
use uuid::Uuid;

use common::pagination::Pagination;

use crate::errors::ServiceError;
use crate::payments::PaymentStatus;

use super::domain::{AddressSnapshot, NewOrder, Order, ProductSnapshot, ShippingUpdate};
use super::status::OrderStatus;

/// Repository abstraction for order persistence.
///
/// `insert` must persist the order row and every item row atomically; a
/// failure leaves no partial aggregate behind. `update_status` is a
/// compare-and-swap on the stored status, returning `None` on a miss.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_address(&self, address_id: Uuid) -> Result<Option<AddressSnapshot>, ServiceError>;
    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<ProductSnapshot>, ServiceError>;

    async fn insert(&self, order: NewOrder) -> Result<Order, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ServiceError>;
    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
        shipping: ShippingUpdate,
    ) -> Result<Option<Order>, ServiceError>;
    async fn update_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Option<Order>, ServiceError>;

    async fn list_for_customer(&self, customer_id: Uuid, page: Pagination) -> Result<Vec<Order>, ServiceError>;
    async fn list_all(&self, page: Pagination) -> Result<Vec<Order>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::order::domain::OrderItem;

    #[derive(Default)]
    pub struct MockOrderRepository {
        addresses: Mutex<HashMap<Uuid, AddressSnapshot>>,
        products: Mutex<HashMap<Uuid, ProductSnapshot>>,
        orders: Mutex<HashMap<Uuid, Order>>,
        fail_insert: Mutex<bool>,
    }

    impl MockOrderRepository {
        pub fn put_address(&self, addr: AddressSnapshot) {
            self.addresses.lock().unwrap().insert(addr.id, addr);
        }

        pub fn put_product(&self, product: ProductSnapshot) {
            self.products.lock().unwrap().insert(product.id, product);
        }

        /// Test hook: make the next insert fail as a whole.
        pub fn fail_next_insert(&self) {
            *self.fail_insert.lock().unwrap() = true;
        }

        pub fn order_count(&self) -> usize {
            self.orders.lock().unwrap().len()
        }

        /// Test hook: force a status behind the service's back.
        pub fn force_status(&self, id: Uuid, status: OrderStatus) {
            if let Some(o) = self.orders.lock().unwrap().get_mut(&id) {
                o.status = status;
            }
        }
    }

    #[async_trait]
    impl OrderRepository for MockOrderRepository {
        async fn find_address(&self, address_id: Uuid) -> Result<Option<AddressSnapshot>, ServiceError> {
            Ok(self.addresses.lock().unwrap().get(&address_id).cloned())
        }

        async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<ProductSnapshot>, ServiceError> {
            let products = self.products.lock().unwrap();
            Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
        }

        async fn insert(&self, order: NewOrder) -> Result<Order, ServiceError> {
            if std::mem::take(&mut *self.fail_insert.lock().unwrap()) {
                // Atomic failure: nothing is stored
                return Err(ServiceError::Db("simulated insert failure".into()));
            }
            let now = Utc::now().into();
            let items = order
                .items
                .into_iter()
                .map(|i| OrderItem {
                    id: Uuid::new_v4(),
                    product_id: i.product_id,
                    product_name: i.product_name,
                    product_image: i.product_image,
                    quantity: i.quantity,
                    unit_price: i.unit_price,
                    total_price: i.total_price,
                })
                .collect();
            let stored = Order {
                id: order.id,
                code: order.code,
                customer_id: order.customer_id,
                address_id: order.address_id,
                shipping_address: order.shipping_address,
                contact_phone: order.contact_phone,
                status: order.status,
                payment_status: PaymentStatus::Pending,
                payment_method: order.payment_method,
                subtotal: order.subtotal,
                shipping_cost: order.shipping_cost,
                discount_amount: order.discount_amount,
                tax_amount: order.tax_amount,
                total_amount: order.total_amount,
                tracking_number: None,
                carrier: None,
                notes: order.notes,
                items,
                delivered_at: None,
                created_at: now,
                updated_at: now,
            };
            self.orders.lock().unwrap().insert(stored.id, stored.clone());
            Ok(stored)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ServiceError> {
            Ok(self.orders.lock().unwrap().get(&id).cloned())
        }

        async fn update_status(
            &self,
            id: Uuid,
            expected: OrderStatus,
            next: OrderStatus,
            shipping: ShippingUpdate,
        ) -> Result<Option<Order>, ServiceError> {
            let mut orders = self.orders.lock().unwrap();
            let Some(o) = orders.get_mut(&id) else { return Ok(None) };
            if o.status != expected {
                return Ok(None);
            }
            o.status = next;
            o.updated_at = Utc::now().into();
            o.delivered_at = (next == OrderStatus::Delivered).then_some(o.updated_at);
            if let Some(t) = shipping.tracking_number {
                o.tracking_number = Some(t);
            }
            if let Some(c) = shipping.carrier {
                o.carrier = Some(c);
            }
            Ok(Some(o.clone()))
        }

        async fn update_payment_status(
            &self,
            id: Uuid,
            payment_status: PaymentStatus,
        ) -> Result<Option<Order>, ServiceError> {
            let mut orders = self.orders.lock().unwrap();
            let Some(o) = orders.get_mut(&id) else { return Ok(None) };
            o.payment_status = payment_status;
            o.updated_at = Utc::now().into();
            Ok(Some(o.clone()))
        }

        async fn list_for_customer(&self, customer_id: Uuid, page: Pagination) -> Result<Vec<Order>, ServiceError> {
            let (page_idx, per_page) = page.normalize();
            let mut rows: Vec<Order> = self
                .orders
                .lock()
                .unwrap()
                .values()
                .filter(|o| o.customer_id == customer_id)
                .cloned()
                .collect();
            rows.sort_by_key(|o| std::cmp::Reverse(o.created_at));
            Ok(rows.into_iter().skip((page_idx * per_page) as usize).take(per_page as usize).collect())
        }

        async fn list_all(&self, page: Pagination) -> Result<Vec<Order>, ServiceError> {
            let (page_idx, per_page) = page.normalize();
            let mut rows: Vec<Order> = self.orders.lock().unwrap().values().cloned().collect();
            rows.sort_by_key(|o| std::cmp::Reverse(o.created_at));
            Ok(rows.into_iter().skip((page_idx * per_page) as usize).take(per_page as usize).collect())
        }
    }
}
