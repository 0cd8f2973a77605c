use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use common::pagination::Pagination;

use crate::errors::ServiceError;
use crate::payments::PaymentStatus;

use super::super::domain::{Booking, Cancellation, NewBooking, OfferingSnapshot, StatusChange};
use super::super::repository::BookingRepository;
use super::super::status::BookingStatus;

pub struct SeaOrmBookingRepository {
    pub db: DatabaseConnection,
}

fn to_domain(m: models::booking::Model) -> Result<Booking, ServiceError> {
    let status: BookingStatus = m
        .status
        .parse()
        .map_err(|e: String| ServiceError::Db(format!("booking {}: {}", m.id, e)))?;
    let payment_status: PaymentStatus = m
        .payment_status
        .parse()
        .map_err(|e: String| ServiceError::Db(format!("booking {}: {}", m.id, e)))?;
    let cancellation = match (m.cancelled_by.as_deref(), m.cancelled_at) {
        (Some(by), Some(at)) => Some(Cancellation {
            reason: m.cancellation_reason.clone(),
            by: by.parse().map_err(|e: String| ServiceError::Db(format!("booking {}: {}", m.id, e)))?,
            at,
        }),
        _ => None,
    };
    Ok(Booking {
        id: m.id,
        code: m.code,
        customer_id: m.customer_id,
        provider_id: m.provider_id,
        service_id: m.service_id,
        scheduled_at: m.scheduled_at,
        address_text: m.address_text,
        latitude: m.latitude,
        longitude: m.longitude,
        status,
        payment_status,
        money: super::super::domain::BookingMoney {
            service_amount: m.service_amount,
            addon_amount: m.addon_amount,
            discount_amount: m.discount_amount,
            tax_amount: m.tax_amount,
            total_amount: m.total_amount,
            commission_amount: m.commission_amount,
            provider_earnings: m.provider_earnings,
        },
        cancellation,
        completed_at: m.completed_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn find_offering(&self, service_id: Uuid) -> Result<Option<OfferingSnapshot>, ServiceError> {
        let res = models::service_offering::Entity::find_by_id(service_id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(res.map(|o| OfferingSnapshot {
            id: o.id,
            provider_id: o.provider_id,
            price: o.price,
            active: o.active,
        }))
    }

    async fn insert(&self, booking: NewBooking) -> Result<Booking, ServiceError> {
        let now = Utc::now().into();
        let am = models::booking::ActiveModel {
            id: Set(booking.id),
            code: Set(booking.code),
            customer_id: Set(booking.customer_id),
            provider_id: Set(booking.provider_id),
            service_id: Set(booking.service_id),
            scheduled_at: Set(booking.scheduled_at),
            address_text: Set(booking.address_text),
            latitude: Set(booking.latitude),
            longitude: Set(booking.longitude),
            status: Set(BookingStatus::Pending.as_str().into()),
            payment_status: Set(PaymentStatus::Pending.as_str().into()),
            service_amount: Set(booking.money.service_amount),
            addon_amount: Set(booking.money.addon_amount),
            discount_amount: Set(booking.money.discount_amount),
            tax_amount: Set(booking.money.tax_amount),
            total_amount: Set(booking.money.total_amount),
            commission_amount: Set(booking.money.commission_amount),
            provider_earnings: Set(booking.money.provider_earnings),
            cancellation_reason: Set(None),
            cancelled_by: Set(None),
            cancelled_at: Set(None),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = am.insert(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        to_domain(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, ServiceError> {
        let res = models::booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        res.map(to_domain).transpose()
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        change: StatusChange,
    ) -> Result<Option<Booking>, ServiceError> {
        use models::booking::Column;

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        // Compare-and-swap: the filter on the current status makes two
        // concurrent transitions resolve to exactly one winner.
        let mut update = models::booking::Entity::update_many()
            .col_expr(Column::Status, Expr::value(change.to.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(expected.as_str()));

        // completed_at is set iff the booking sits in completed
        if change.to == BookingStatus::Completed {
            update = update.col_expr(Column::CompletedAt, Expr::value(Some(now)));
        } else {
            update = update.col_expr(Column::CompletedAt, Expr::value(None::<sea_orm::prelude::DateTimeWithTimeZone>));
        }

        if change.to == BookingStatus::Cancelled {
            if let Some(c) = &change.cancellation {
                update = update
                    .col_expr(Column::CancellationReason, Expr::value(c.reason.clone()))
                    .col_expr(Column::CancelledBy, Expr::value(c.by.as_str()))
                    .col_expr(Column::CancelledAt, Expr::value(c.at));
            }
        }

        let res = update.exec(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn list_for_customer(&self, customer_id: Uuid, page: Pagination) -> Result<Vec<Booking>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        let rows = models::booking::Entity::find()
            .filter(models::booking::Column::CustomerId.eq(customer_id))
            .order_by_desc(models::booking::Column::CreatedAt)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn list_for_provider(&self, provider_id: Uuid, page: Pagination) -> Result<Vec<Booking>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        let rows = models::booking::Entity::find()
            .filter(models::booking::Column::ProviderId.eq(provider_id))
            .order_by_desc(models::booking::Column::CreatedAt)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        rows.into_iter().map(to_domain).collect()
    }
}
