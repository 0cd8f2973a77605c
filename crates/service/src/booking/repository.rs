use async_trait::async_trait;
use uuid::Uuid;

use common::pagination::Pagination;

use crate::errors::ServiceError;

use super::domain::{Booking, NewBooking, OfferingSnapshot, StatusChange};
use super::status::BookingStatus;

/// Repository abstraction for booking persistence.
///
/// `update_status` is a compare-and-swap: the write only applies when the
/// stored status still equals `expected`, and returns `None` when it no
/// longer does. Callers re-read to distinguish a lost race from a missing
/// row.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_offering(&self, service_id: Uuid) -> Result<Option<OfferingSnapshot>, ServiceError>;

    async fn insert(&self, booking: NewBooking) -> Result<Booking, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, ServiceError>;
    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        change: StatusChange,
    ) -> Result<Option<Booking>, ServiceError>;

    async fn list_for_customer(&self, customer_id: Uuid, page: Pagination) -> Result<Vec<Booking>, ServiceError>;
    async fn list_for_provider(&self, provider_id: Uuid, page: Pagination) -> Result<Vec<Booking>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::payments::PaymentStatus;

    #[derive(Default)]
    pub struct MockBookingRepository {
        offerings: Mutex<HashMap<Uuid, OfferingSnapshot>>,
        bookings: Mutex<HashMap<Uuid, Booking>>,
    }

    impl MockBookingRepository {
        pub fn with_offering(self, offering: OfferingSnapshot) -> Self {
            self.offerings.lock().unwrap().insert(offering.id, offering);
            self
        }

        pub fn put_offering(&self, offering: OfferingSnapshot) {
            self.offerings.lock().unwrap().insert(offering.id, offering);
        }

        /// Test hook: force a status behind the service's back.
        pub fn force_status(&self, id: Uuid, status: BookingStatus) {
            if let Some(b) = self.bookings.lock().unwrap().get_mut(&id) {
                b.status = status;
            }
        }
    }

    #[async_trait]
    impl BookingRepository for MockBookingRepository {
        async fn find_offering(&self, service_id: Uuid) -> Result<Option<OfferingSnapshot>, ServiceError> {
            Ok(self.offerings.lock().unwrap().get(&service_id).cloned())
        }

        async fn insert(&self, booking: NewBooking) -> Result<Booking, ServiceError> {
            let now = Utc::now().into();
            let stored = Booking {
                id: booking.id,
                code: booking.code,
                customer_id: booking.customer_id,
                provider_id: booking.provider_id,
                service_id: booking.service_id,
                scheduled_at: booking.scheduled_at,
                address_text: booking.address_text,
                latitude: booking.latitude,
                longitude: booking.longitude,
                status: BookingStatus::Pending,
                payment_status: PaymentStatus::Pending,
                money: booking.money,
                cancellation: None,
                completed_at: None,
                created_at: now,
                updated_at: now,
            };
            self.bookings.lock().unwrap().insert(stored.id, stored.clone());
            Ok(stored)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, ServiceError> {
            Ok(self.bookings.lock().unwrap().get(&id).cloned())
        }

        async fn update_status(
            &self,
            id: Uuid,
            expected: BookingStatus,
            change: StatusChange,
        ) -> Result<Option<Booking>, ServiceError> {
            let mut bookings = self.bookings.lock().unwrap();
            let Some(b) = bookings.get_mut(&id) else { return Ok(None) };
            if b.status != expected {
                return Ok(None);
            }
            b.status = change.to;
            b.updated_at = Utc::now().into();
            b.completed_at = if change.to == BookingStatus::Completed {
                Some(b.updated_at)
            } else {
                None
            };
            if change.to == BookingStatus::Cancelled {
                b.cancellation = change.cancellation;
            }
            Ok(Some(b.clone()))
        }

        async fn list_for_customer(&self, customer_id: Uuid, page: Pagination) -> Result<Vec<Booking>, ServiceError> {
            let (page_idx, per_page) = page.normalize();
            let mut rows: Vec<Booking> = self
                .bookings
                .lock()
                .unwrap()
                .values()
                .filter(|b| b.customer_id == customer_id)
                .cloned()
                .collect();
            rows.sort_by_key(|b| std::cmp::Reverse(b.created_at));
            Ok(rows.into_iter().skip((page_idx * per_page) as usize).take(per_page as usize).collect())
        }

        async fn list_for_provider(&self, provider_id: Uuid, page: Pagination) -> Result<Vec<Booking>, ServiceError> {
            let (page_idx, per_page) = page.normalize();
            let mut rows: Vec<Booking> = self
                .bookings
                .lock()
                .unwrap()
                .values()
                .filter(|b| b.provider_id == provider_id)
                .cloned()
                .collect();
            rows.sort_by_key(|b| std::cmp::Reverse(b.created_at));
            Ok(rows.into_iter().skip((page_idx * per_page) as usize).take(per_page as usize).collect())
        }
    }
}
