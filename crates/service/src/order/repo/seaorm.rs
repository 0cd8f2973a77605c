use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use common::pagination::Pagination;

use crate::errors::ServiceError;
use crate::payments::{PaymentMethod, PaymentStatus};

use super::super::domain::{
    AddressSnapshot, NewOrder, Order, OrderItem, ProductSnapshot, ShippingUpdate,
};
use super::super::repository::OrderRepository;
use super::super::status::OrderStatus;

pub struct SeaOrmOrderRepository {
    pub db: DatabaseConnection,
}

fn to_domain(m: models::order::Model, item_rows: Vec<models::order_item::Model>) -> Result<Order, ServiceError> {
    let status: OrderStatus = m
        .status
        .parse()
        .map_err(|e: String| ServiceError::Db(format!("order {}: {}", m.id, e)))?;
    let payment_status: PaymentStatus = m
        .payment_status
        .parse()
        .map_err(|e: String| ServiceError::Db(format!("order {}: {}", m.id, e)))?;
    let payment_method: PaymentMethod = m
        .payment_method
        .parse()
        .map_err(|e: String| ServiceError::Db(format!("order {}: {}", m.id, e)))?;
    let items = item_rows
        .into_iter()
        .map(|i| OrderItem {
            id: i.id,
            product_id: i.product_id,
            product_name: i.product_name,
            product_image: i.product_image,
            quantity: i.quantity as u32,
            unit_price: i.unit_price,
            total_price: i.total_price,
        })
        .collect();
    Ok(Order {
        id: m.id,
        code: m.code,
        customer_id: m.customer_id,
        address_id: m.address_id,
        shipping_address: m.shipping_address,
        contact_phone: m.contact_phone,
        status,
        payment_status,
        payment_method,
        subtotal: m.subtotal,
        shipping_cost: m.shipping_cost,
        discount_amount: m.discount_amount,
        tax_amount: m.tax_amount,
        total_amount: m.total_amount,
        tracking_number: m.tracking_number,
        carrier: m.carrier,
        notes: m.notes,
        items,
        delivered_at: m.delivered_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

impl SeaOrmOrderRepository {
    async fn load_items(&self, order_id: Uuid) -> Result<Vec<models::order_item::Model>, ServiceError> {
        models::order_item::Entity::find()
            .filter(models::order_item::Column::OrderId.eq(order_id))
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn find_address(&self, address_id: Uuid) -> Result<Option<AddressSnapshot>, ServiceError> {
        let res = models::address::Entity::find_by_id(address_id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(res.map(|a| AddressSnapshot {
            id: a.id,
            user_id: a.user_id,
            text: models::address::format_single_line(&a),
            phone: a.phone,
        }))
    }

    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<ProductSnapshot>, ServiceError> {
        let rows = models::product::Entity::find()
            .filter(models::product::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|p| ProductSnapshot {
                id: p.id,
                name: p.name,
                image_url: p.image_url,
                price: p.price,
                active: p.active,
            })
            .collect())
    }

    async fn insert(&self, order: NewOrder) -> Result<Order, ServiceError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

        // Order row and item rows commit or roll back together; a failed
        // item insert must not leave an empty order behind.
        let txn = self.db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;

        let order_am = models::order::ActiveModel {
            id: Set(order.id),
            code: Set(order.code),
            customer_id: Set(order.customer_id),
            address_id: Set(order.address_id),
            shipping_address: Set(order.shipping_address),
            contact_phone: Set(order.contact_phone),
            status: Set(order.status.as_str().into()),
            payment_status: Set(PaymentStatus::Pending.as_str().into()),
            payment_method: Set(order.payment_method.as_str().into()),
            subtotal: Set(order.subtotal),
            shipping_cost: Set(order.shipping_cost),
            discount_amount: Set(order.discount_amount),
            tax_amount: Set(order.tax_amount),
            total_amount: Set(order.total_amount),
            tracking_number: Set(None),
            carrier: Set(None),
            notes: Set(order.notes),
            delivered_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = order_am.insert(&txn).await.map_err(|e| ServiceError::Db(e.to_string()))?;

        for item in &order.items {
            let item_am = models::order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(created.id),
                product_id: Set(item.product_id),
                product_name: Set(item.product_name.clone()),
                product_image: Set(item.product_image.clone()),
                quantity: Set(item.quantity as i32),
                unit_price: Set(item.unit_price),
                total_price: Set(item.total_price),
                created_at: Set(now),
            };
            item_am.insert(&txn).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        }

        txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;

        let items = self.load_items(created.id).await?;
        to_domain(created, items)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ServiceError> {
        let res = models::order::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        match res {
            Some(m) => {
                let items = self.load_items(m.id).await?;
                Ok(Some(to_domain(m, items)?))
            }
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
        shipping: ShippingUpdate,
    ) -> Result<Option<Order>, ServiceError> {
        use models::order::Column;

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let mut update = models::order::Entity::update_many()
            .col_expr(Column::Status, Expr::value(next.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(expected.as_str()));

        if next == OrderStatus::Delivered {
            update = update.col_expr(Column::DeliveredAt, Expr::value(Some(now)));
        }
        if let Some(t) = shipping.tracking_number {
            update = update.col_expr(Column::TrackingNumber, Expr::value(t));
        }
        if let Some(c) = shipping.carrier {
            update = update.col_expr(Column::Carrier, Expr::value(c));
        }

        let res = update.exec(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Option<Order>, ServiceError> {
        use models::order::Column;

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let res = models::order::Entity::update_many()
            .col_expr(Column::PaymentStatus, Expr::value(payment_status.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn list_for_customer(&self, customer_id: Uuid, page: Pagination) -> Result<Vec<Order>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        let rows = models::order::Entity::find()
            .filter(models::order::Column::CustomerId.eq(customer_id))
            .order_by_desc(models::order::Column::CreatedAt)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let mut orders = Vec::with_capacity(rows.len());
        for m in rows {
            let items = self.load_items(m.id).await?;
            orders.push(to_domain(m, items)?);
        }
        Ok(orders)
    }

    async fn list_all(&self, page: Pagination) -> Result<Vec<Order>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        let rows = models::order::Entity::find()
            .order_by_desc(models::order::Column::CreatedAt)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let mut orders = Vec::with_capacity(rows.len());
        for m in rows {
            let items = self.load_items(m.id).await?;
            orders.push(to_domain(m, items)?);
        }
        Ok(orders)
    }
}
