use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use common::pagination::Pagination;

use crate::access::{Actor, Capability, Role};
use crate::codes;
use crate::errors::ServiceError;
use crate::events::{DomainEvent, EventPublisher};
use crate::payments::PaymentStatus;

use super::domain::{CreateOrderInput, NewOrder, NewOrderItem, Order, ShippingUpdate};
use super::repository::OrderRepository;
use super::status::{check_transition, OrderStatus};

/// Order service configuration
#[derive(Clone)]
pub struct OrderConfig {
    pub default_shipping_fee: Decimal,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self { default_shipping_fee: configs::PlatformConfig::default().default_shipping_fee }
    }
}

/// Checkout and fulfillment service independent of web framework
pub struct OrderService<R: OrderRepository> {
    repo: Arc<R>,
    events: Arc<dyn EventPublisher>,
    cfg: OrderConfig,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: Arc<R>, events: Arc<dyn EventPublisher>, cfg: OrderConfig) -> Self {
        Self { repo, events, cfg }
    }

    /// Create a multi-item order from the caller's cart.
    ///
    /// Every referenced product is resolved server-side and its
    /// name/image/price snapshotted onto the item rows, so later catalog
    /// edits never alter this order. The order and its items persist in a
    /// single transaction; validation failures happen before any write.
    #[instrument(skip(self, input), fields(customer_id = %actor.user_id, lines = input.lines.len()))]
    pub async fn create(&self, actor: Actor, input: CreateOrderInput) -> Result<Order, ServiceError> {
        if !actor.can(Capability::CreateOrder) {
            return Err(ServiceError::Forbidden(Capability::CreateOrder));
        }
        if input.lines.is_empty() {
            return Err(ServiceError::Validation("cart is empty".into()));
        }
        if input.lines.iter().any(|l| l.quantity == 0) {
            return Err(ServiceError::Validation("line quantity must be > 0".into()));
        }
        if input.discount_amount < Decimal::ZERO || input.tax_amount < Decimal::ZERO {
            return Err(ServiceError::Validation("amounts must be >= 0".into()));
        }
        let shipping_cost = input.shipping_cost.unwrap_or(self.cfg.default_shipping_fee);
        if shipping_cost < Decimal::ZERO {
            return Err(ServiceError::Validation("shipping cost must be >= 0".into()));
        }

        let address = self
            .repo
            .find_address(input.address_id)
            .await?
            .ok_or_else(|| ServiceError::Validation("shipping address not found".into()))?;
        if address.user_id != actor.user_id && !actor.is_admin() {
            return Err(ServiceError::Validation("shipping address not found".into()));
        }

        let mut ids: Vec<Uuid> = input.lines.iter().map(|l| l.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let products: HashMap<Uuid, _> = self
            .repo
            .find_products(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut items = Vec::with_capacity(input.lines.len());
        let mut subtotal = Decimal::ZERO;
        for line in &input.lines {
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| ServiceError::Validation(format!("product {} not found", line.product_id)))?;
            if !product.active {
                return Err(ServiceError::Validation(format!("product {} is not available", product.name)));
            }
            let total_price = product.price * Decimal::from(line.quantity);
            subtotal += total_price;
            items.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name.clone(),
                product_image: product.image_url.clone(),
                quantity: line.quantity,
                unit_price: product.price,
                total_price,
            });
        }

        let total_amount = subtotal + shipping_cost - input.discount_amount + input.tax_amount;
        if total_amount < Decimal::ZERO {
            return Err(ServiceError::Validation("discount exceeds order total".into()));
        }

        // Cash settles at the door; anything else waits for payment first
        let status = if input.payment_method.settles_offline() {
            OrderStatus::Processing
        } else {
            OrderStatus::PendingPayment
        };

        let item_count = items.len();
        let new_order = NewOrder {
            id: Uuid::new_v4(),
            code: codes::order_code(),
            customer_id: actor.user_id,
            address_id: address.id,
            shipping_address: address.text,
            contact_phone: input.contact_phone.or(address.phone),
            status,
            payment_method: input.payment_method,
            subtotal,
            shipping_cost,
            discount_amount: input.discount_amount,
            tax_amount: input.tax_amount,
            total_amount,
            notes: input.notes,
            items,
        };
        let order = self.repo.insert(new_order).await?;

        info!(order_id = %order.id, code = %order.code, total = %order.total_amount, items = item_count, "order_created");
        self.events
            .publish(DomainEvent::OrderCreated {
                order_id: order.id,
                code: order.code.clone(),
                items: item_count,
            })
            .await;
        Ok(order)
    }

    /// Move an order to `next` through the enforced transition table.
    ///
    /// Persisted with a compare-and-swap on the current status; a lost
    /// race surfaces as `Conflict` instead of silently overwriting.
    #[instrument(skip(self, shipping), fields(actor_id = %actor.user_id, role = %actor.role, %id, next = %next))]
    pub async fn transition(
        &self,
        actor: Actor,
        id: Uuid,
        next: OrderStatus,
        shipping: ShippingUpdate,
    ) -> Result<Order, ServiceError> {
        if !actor.can(Capability::FulfillOrder) {
            return Err(ServiceError::Forbidden(Capability::FulfillOrder));
        }

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("order"))?;
        check_transition(current.status, next)?;

        let updated = self.repo.update_status(id, current.status, next, shipping).await?;
        let order = match updated {
            Some(o) => o,
            None => match self.repo.find_by_id(id).await? {
                Some(_) => return Err(ServiceError::concurrent_update("order")),
                None => return Err(ServiceError::not_found("order")),
            },
        };

        info!(order_id = %order.id, from = %current.status, to = %order.status, "order_transitioned");
        self.events
            .publish(DomainEvent::OrderStatusChanged {
                order_id: order.id,
                from: current.status.to_string(),
                to: order.status.to_string(),
            })
            .await;
        Ok(order)
    }

    /// Payment stub: flips the payment status only, no gateway involved.
    /// A pending-payment order moves into processing on settlement.
    #[instrument(skip(self), fields(actor_id = %actor.user_id, %id))]
    pub async fn mark_paid(&self, actor: Actor, id: Uuid) -> Result<Order, ServiceError> {
        if !actor.can(Capability::FulfillOrder) {
            return Err(ServiceError::Forbidden(Capability::FulfillOrder));
        }

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("order"))?;
        if current.payment_status == PaymentStatus::Paid {
            return Err(ServiceError::Conflict("order is already paid".into()));
        }

        let order = self
            .repo
            .update_payment_status(id, PaymentStatus::Paid)
            .await?
            .ok_or_else(|| ServiceError::not_found("order"))?;
        self.events.publish(DomainEvent::OrderPaid { order_id: order.id }).await;

        // Settlement unblocks fulfillment
        if order.status == OrderStatus::PendingPayment {
            return self.transition(actor, id, OrderStatus::Processing, ShippingUpdate::default()).await;
        }
        Ok(order)
    }

    /// Fetch an order visible to the caller (owner, seller, admin).
    pub async fn get(&self, actor: Actor, id: Uuid) -> Result<Order, ServiceError> {
        let order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("order"))?;
        let visible = actor.is_admin()
            || actor.role == Role::Seller
            || order.customer_id == actor.user_id;
        if !visible {
            return Err(ServiceError::not_found("order"));
        }
        Ok(order)
    }

    pub async fn list_for_actor(&self, actor: Actor, page: Pagination) -> Result<Vec<Order>, ServiceError> {
        match actor.role {
            Role::Seller | Role::Admin => self.repo.list_all(page).await,
            _ => self.repo.list_for_customer(actor.user_id, page).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::domain::{AddressSnapshot, CartLine, ProductSnapshot};
    use crate::order::repository::mock::MockOrderRepository;
    use crate::events::mock::MemoryEventPublisher;
    use crate::payments::PaymentMethod;

    struct Fixture {
        repo: Arc<MockOrderRepository>,
        events: Arc<MemoryEventPublisher>,
        svc: OrderService<MockOrderRepository>,
        customer: Actor,
        seller: Actor,
        address_id: Uuid,
        product_p: Uuid,
        product_q: Uuid,
    }

    fn setup() -> Fixture {
        let repo = Arc::new(MockOrderRepository::default());
        let events = Arc::new(MemoryEventPublisher::default());
        let svc = OrderService::new(
            Arc::clone(&repo),
            events.clone() as Arc<dyn EventPublisher>,
            OrderConfig { default_shipping_fee: Decimal::ZERO },
        );
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        let seller = Actor::new(Uuid::new_v4(), Role::Seller);

        let address_id = Uuid::new_v4();
        repo.put_address(AddressSnapshot {
            id: address_id,
            user_id: customer.user_id,
            text: "1 Main St, Springfield 12345".into(),
            phone: Some("555-0100".into()),
        });

        let product_p = Uuid::new_v4();
        let product_q = Uuid::new_v4();
        repo.put_product(ProductSnapshot {
            id: product_p,
            name: "Vacuum".into(),
            image_url: Some("vacuum.jpg".into()),
            price: Decimal::new(50000, 2),
            active: true,
        });
        repo.put_product(ProductSnapshot {
            id: product_q,
            name: "Mop".into(),
            image_url: None,
            price: Decimal::new(30000, 2),
            active: true,
        });

        Fixture { repo, events, svc, customer, seller, address_id, product_p, product_q }
    }

    fn checkout_input(f: &Fixture) -> CreateOrderInput {
        CreateOrderInput {
            address_id: f.address_id,
            payment_method: PaymentMethod::CashOnDelivery,
            lines: vec![
                CartLine { product_id: f.product_p, quantity: 2 },
                CartLine { product_id: f.product_q, quantity: 1 },
            ],
            contact_phone: None,
            notes: None,
            shipping_cost: Some(Decimal::new(6000, 2)),
            discount_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
        }
    }

    #[tokio::test]
    async fn checkout_computes_totals_and_snapshots_items() {
        let f = setup();
        // P at 500 x2, Q at 300 x1, shipping 60
        let order = f.svc.create(f.customer, checkout_input(&f)).await.unwrap();

        assert_eq!(order.subtotal, Decimal::new(130000, 2));
        assert_eq!(order.total_amount, Decimal::new(136000, 2));
        assert_eq!(order.items.len(), 2);
        let p_item = order.items.iter().find(|i| i.product_id == f.product_p).unwrap();
        let q_item = order.items.iter().find(|i| i.product_id == f.product_q).unwrap();
        assert_eq!(p_item.total_price, Decimal::new(100000, 2));
        assert_eq!(q_item.total_price, Decimal::new(30000, 2));
        assert_eq!(p_item.product_name, "Vacuum");
        assert!(order.is_consistent());
        // Cash on delivery goes straight to processing
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(order.code.starts_with("ORD-"));
        // Phone falls back to the address record
        assert_eq!(order.contact_phone.as_deref(), Some("555-0100"));

        let evs = f.events.take();
        assert!(matches!(evs.as_slice(), [DomainEvent::OrderCreated { items: 2, .. }]));
    }

    #[tokio::test]
    async fn empty_cart_rejected_before_any_write() {
        let f = setup();
        let mut input = checkout_input(&f);
        input.lines.clear();

        let err = f.svc.create(f.customer, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(f.repo.order_count(), 0, "no order row may exist");
        assert!(f.events.snapshot().is_empty());
    }

    #[tokio::test]
    async fn unknown_address_rejected_before_any_write() {
        let f = setup();
        let mut input = checkout_input(&f);
        input.address_id = Uuid::new_v4();

        let err = f.svc.create(f.customer, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(f.repo.order_count(), 0);
    }

    #[tokio::test]
    async fn foreign_address_rejected() {
        let f = setup();
        let other_address = Uuid::new_v4();
        f.repo.put_address(AddressSnapshot {
            id: other_address,
            user_id: Uuid::new_v4(),
            text: "2 Elm St".into(),
            phone: None,
        });
        let mut input = checkout_input(&f);
        input.address_id = other_address;

        let err = f.svc.create(f.customer, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn failed_insert_leaves_no_partial_aggregate() {
        let f = setup();
        f.repo.fail_next_insert();

        let err = f.svc.create(f.customer, checkout_input(&f)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));
        assert_eq!(f.repo.order_count(), 0);
        assert!(f.events.snapshot().is_empty(), "no event without a committed order");
    }

    #[tokio::test]
    async fn card_checkout_waits_for_payment() {
        let f = setup();
        let mut input = checkout_input(&f);
        input.payment_method = PaymentMethod::Card;

        let order = f.svc.create(f.customer, input).await.unwrap();
        assert_eq!(order.status, OrderStatus::PendingPayment);
        f.events.take();

        // Settlement moves it into processing
        let order = f.svc.mark_paid(f.seller, order.id).await.unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.status, OrderStatus::Processing);
        let evs = f.events.take();
        assert!(matches!(evs[0], DomainEvent::OrderPaid { .. }));
        assert!(matches!(evs[1], DomainEvent::OrderStatusChanged { .. }));

        // Second settlement is rejected
        let err = f.svc.mark_paid(f.seller, order.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn seller_walks_the_fulfillment_sequence() {
        let f = setup();
        let order = f.svc.create(f.customer, checkout_input(&f)).await.unwrap();
        f.events.take();

        let o = f.svc.transition(f.seller, order.id, OrderStatus::Packed, ShippingUpdate::default()).await.unwrap();
        assert_eq!(o.status, OrderStatus::Packed);
        let o = f
            .svc
            .transition(
                f.seller,
                order.id,
                OrderStatus::Shipped,
                ShippingUpdate { tracking_number: Some("TRK-1".into()), carrier: Some("acme".into()) },
            )
            .await
            .unwrap();
        assert_eq!(o.tracking_number.as_deref(), Some("TRK-1"));
        let o = f.svc.transition(f.seller, order.id, OrderStatus::Delivered, ShippingUpdate::default()).await.unwrap();
        assert_eq!(o.status, OrderStatus::Delivered);
        assert!(o.delivered_at.is_some());

        // Delivered is closed
        let err = f
            .svc
            .transition(f.seller, order.id, OrderStatus::Processing, ShippingUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Transition(_)));
    }

    #[tokio::test]
    async fn backward_moves_rejected() {
        let f = setup();
        let order = f.svc.create(f.customer, checkout_input(&f)).await.unwrap();

        f.svc.transition(f.seller, order.id, OrderStatus::Shipped, ShippingUpdate::default()).await.unwrap();
        let err = f
            .svc
            .transition(f.seller, order.id, OrderStatus::Packed, ShippingUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Transition(_)));
    }

    #[tokio::test]
    async fn customers_cannot_fulfill() {
        let f = setup();
        let order = f.svc.create(f.customer, checkout_input(&f)).await.unwrap();

        let err = f
            .svc
            .transition(f.customer, order.id, OrderStatus::Packed, ShippingUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn transitions_never_touch_money() {
        let f = setup();
        let order = f.svc.create(f.customer, checkout_input(&f)).await.unwrap();
        let (subtotal, total) = (order.subtotal, order.total_amount);

        let o = f.svc.transition(f.seller, order.id, OrderStatus::Packed, ShippingUpdate::default()).await.unwrap();
        assert_eq!(o.subtotal, subtotal);
        assert_eq!(o.total_amount, total);
        assert!(o.is_consistent());
    }
}
