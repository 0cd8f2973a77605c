use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use common::pagination::Pagination;

use crate::access::{Actor, Capability, Role};
use crate::codes;
use crate::errors::ServiceError;
use crate::events::{DomainEvent, EventPublisher};

use super::domain::{Booking, BookingMoney, Cancellation, CreateBookingInput, NewBooking, StatusChange};
use super::repository::BookingRepository;
use super::status::{admin_override, next_status, BookingAction, BookingStatus};

/// Booking service configuration
#[derive(Clone)]
pub struct BookingConfig {
    pub commission_rate: Decimal,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self { commission_rate: configs::PlatformConfig::default().commission_rate }
    }
}

/// Booking lifecycle service independent of web framework
pub struct BookingService<R: BookingRepository> {
    repo: Arc<R>,
    events: Arc<dyn EventPublisher>,
    cfg: BookingConfig,
}

impl<R: BookingRepository> BookingService<R> {
    pub fn new(repo: Arc<R>, events: Arc<dyn EventPublisher>, cfg: BookingConfig) -> Self {
        Self { repo, events, cfg }
    }

    /// Create a booking for the calling customer.
    ///
    /// The service amount is taken from the current offering price; the
    /// total and the commission split are fixed here and never recomputed.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use rust_decimal::Decimal;
    /// use service::access::{Actor, Role};
    /// use service::booking::domain::{CreateBookingInput, OfferingSnapshot};
    /// use service::booking::repository::mock::MockBookingRepository;
    /// use service::booking::service::{BookingConfig, BookingService};
    /// use service::events::mock::MemoryEventPublisher;
    ///
    /// let offering = OfferingSnapshot { id: uuid::Uuid::new_v4(), provider_id: uuid::Uuid::new_v4(), price: Decimal::new(80000, 2), active: true };
    /// let repo = Arc::new(MockBookingRepository::default().with_offering(offering.clone()));
    /// let svc = BookingService::new(repo, Arc::new(MemoryEventPublisher::default()), BookingConfig { commission_rate: Decimal::new(15, 2) });
    /// let customer = Actor::new(uuid::Uuid::new_v4(), Role::Customer);
    /// let input = CreateBookingInput {
    ///     service_id: offering.id,
    ///     scheduled_at: chrono::Utc::now().into(),
    ///     address_text: "1 Main St, Springfield".into(),
    ///     latitude: None,
    ///     longitude: None,
    ///     addon_amount: Decimal::ZERO,
    ///     discount_amount: Decimal::ZERO,
    ///     tax_amount: Decimal::ZERO,
    /// };
    /// let booking = tokio_test::block_on(svc.create(customer, input)).unwrap();
    /// assert_eq!(booking.money.total_amount, Decimal::new(80000, 2));
    /// assert!(booking.code.starts_with("BK-"));
    /// ```
    #[instrument(skip(self, input), fields(customer_id = %actor.user_id, service_id = %input.service_id))]
    pub async fn create(&self, actor: Actor, input: CreateBookingInput) -> Result<Booking, ServiceError> {
        if !actor.can(Capability::CreateBooking) {
            return Err(ServiceError::Forbidden(Capability::CreateBooking));
        }
        if input.address_text.trim().is_empty() {
            return Err(ServiceError::Validation("service address required".into()));
        }
        if input.addon_amount < Decimal::ZERO || input.discount_amount < Decimal::ZERO || input.tax_amount < Decimal::ZERO {
            return Err(ServiceError::Validation("amounts must be >= 0".into()));
        }

        let offering = self
            .repo
            .find_offering(input.service_id)
            .await?
            .ok_or_else(|| ServiceError::Validation("service offering not found".into()))?;
        if !offering.active {
            return Err(ServiceError::Validation("service offering is not active".into()));
        }

        let money = BookingMoney::compute(
            offering.price,
            input.addon_amount,
            input.discount_amount,
            input.tax_amount,
            self.cfg.commission_rate,
        );
        if money.total_amount < Decimal::ZERO {
            return Err(ServiceError::Validation("discount exceeds booking total".into()));
        }

        let new_booking = NewBooking {
            id: Uuid::new_v4(),
            code: codes::booking_code(),
            customer_id: actor.user_id,
            provider_id: offering.provider_id,
            service_id: offering.id,
            scheduled_at: input.scheduled_at,
            address_text: input.address_text,
            latitude: input.latitude,
            longitude: input.longitude,
            money,
        };
        let booking = self.repo.insert(new_booking).await?;

        info!(booking_id = %booking.id, code = %booking.code, total = %booking.money.total_amount, "booking_created");
        self.events
            .publish(DomainEvent::BookingCreated { booking_id: booking.id, code: booking.code.clone() })
            .await;
        Ok(booking)
    }

    /// Apply a lifecycle action (accept/reject/start/complete/cancel).
    ///
    /// The transition is computed by the pure `next_status` table and
    /// persisted with a compare-and-swap on the current status, so two
    /// concurrent actions on the same booking resolve to one winner and
    /// one `Conflict`.
    #[instrument(skip(self), fields(actor_id = %actor.user_id, role = %actor.role, %id, action = %action))]
    pub async fn transition(&self, actor: Actor, id: Uuid, action: BookingAction) -> Result<Booking, ServiceError> {
        self.transition_inner(actor, id, action, None).await
    }

    /// Customer/admin cancellation with a recorded reason.
    pub async fn cancel(&self, actor: Actor, id: Uuid, reason: Option<String>) -> Result<Booking, ServiceError> {
        if !actor.can(Capability::CancelBooking) {
            return Err(ServiceError::Forbidden(Capability::CancelBooking));
        }
        self.transition_inner(actor, id, BookingAction::Cancel, reason).await
    }

    async fn transition_inner(
        &self,
        actor: Actor,
        id: Uuid,
        action: BookingAction,
        reason: Option<String>,
    ) -> Result<Booking, ServiceError> {
        let required = match action {
            BookingAction::Cancel => Capability::CancelBooking,
            _ => Capability::ActOnBooking,
        };
        if !actor.can(required) {
            return Err(ServiceError::Forbidden(required));
        }

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("booking"))?;
        self.check_ownership(&actor, &current)?;

        let next = next_status(current.status, action, actor.role)?;
        let cancellation = (next == BookingStatus::Cancelled).then(|| Cancellation {
            reason,
            by: actor.role,
            at: Utc::now().into(),
        });

        let updated = self
            .repo
            .update_status(id, current.status, StatusChange { to: next, cancellation })
            .await?;
        let booking = match updated {
            Some(b) => b,
            // CAS missed: someone else moved the status first (or the row vanished)
            None => match self.repo.find_by_id(id).await? {
                Some(_) => return Err(ServiceError::concurrent_update("booking")),
                None => return Err(ServiceError::not_found("booking")),
            },
        };

        info!(booking_id = %booking.id, from = %current.status, to = %booking.status, "booking_transitioned");
        if let Some(event) = transition_event(&booking, actor.role) {
            self.events.publish(event).await;
        }
        Ok(booking)
    }

    /// Administrative status override for the states the normal action
    /// table never produces (enroute, refund flow).
    #[instrument(skip(self), fields(actor_id = %actor.user_id, %id, target = %target))]
    pub async fn force_status(&self, actor: Actor, id: Uuid, target: BookingStatus) -> Result<Booking, ServiceError> {
        if !actor.can(Capability::AdminOverride) {
            return Err(ServiceError::Forbidden(Capability::AdminOverride));
        }

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("booking"))?;
        let next = admin_override(current.status, target)?;
        let cancellation = (next == BookingStatus::Cancelled).then(|| Cancellation {
            reason: Some("administrative override".into()),
            by: actor.role,
            at: Utc::now().into(),
        });

        let updated = self
            .repo
            .update_status(id, current.status, StatusChange { to: next, cancellation })
            .await?;
        let booking = match updated {
            Some(b) => b,
            None => match self.repo.find_by_id(id).await? {
                Some(_) => return Err(ServiceError::concurrent_update("booking")),
                None => return Err(ServiceError::not_found("booking")),
            },
        };

        info!(booking_id = %booking.id, from = %current.status, to = %booking.status, "booking_overridden");
        self.events
            .publish(DomainEvent::BookingOverridden {
                booking_id: booking.id,
                from: current.status.to_string(),
                to: booking.status.to_string(),
            })
            .await;
        Ok(booking)
    }

    /// Fetch a booking visible to the caller (owner, assigned provider, admin).
    pub async fn get(&self, actor: Actor, id: Uuid) -> Result<Booking, ServiceError> {
        let booking = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("booking"))?;
        let visible = actor.is_admin()
            || booking.customer_id == actor.user_id
            || booking.provider_id == actor.user_id;
        if !visible {
            return Err(ServiceError::not_found("booking"));
        }
        Ok(booking)
    }

    pub async fn list_for_actor(&self, actor: Actor, page: Pagination) -> Result<Vec<Booking>, ServiceError> {
        match actor.role {
            Role::Provider => self.repo.list_for_provider(actor.user_id, page).await,
            _ => self.repo.list_for_customer(actor.user_id, page).await,
        }
    }

    fn check_ownership(&self, actor: &Actor, booking: &Booking) -> Result<(), ServiceError> {
        if actor.is_admin() {
            return Ok(());
        }
        let owns = match actor.role {
            Role::Provider => booking.provider_id == actor.user_id,
            Role::Customer => booking.customer_id == actor.user_id,
            _ => false,
        };
        if !owns {
            // Hide other people's bookings rather than acknowledging them
            return Err(ServiceError::not_found("booking"));
        }
        Ok(())
    }
}

fn transition_event(booking: &Booking, by: Role) -> Option<DomainEvent> {
    match booking.status {
        BookingStatus::Confirmed => Some(DomainEvent::BookingConfirmed { booking_id: booking.id }),
        BookingStatus::InProgress => Some(DomainEvent::BookingStarted { booking_id: booking.id }),
        BookingStatus::Completed => Some(DomainEvent::BookingCompleted { booking_id: booking.id }),
        BookingStatus::Cancelled => Some(DomainEvent::BookingCancelled { booking_id: booking.id, by }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::domain::OfferingSnapshot;
    use crate::booking::repository::mock::MockBookingRepository;
    use crate::events::mock::MemoryEventPublisher;
    use crate::payments::PaymentStatus;

    fn setup() -> (Arc<MockBookingRepository>, Arc<MemoryEventPublisher>, BookingService<MockBookingRepository>, OfferingSnapshot) {
        let offering = OfferingSnapshot {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            price: Decimal::new(80000, 2),
            active: true,
        };
        let repo = Arc::new(MockBookingRepository::default());
        repo.put_offering(offering.clone());
        let events = Arc::new(MemoryEventPublisher::default());
        let svc = BookingService::new(
            Arc::clone(&repo),
            events.clone() as Arc<dyn EventPublisher>,
            BookingConfig { commission_rate: Decimal::new(15, 2) },
        );
        (repo, events, svc, offering)
    }

    fn input_for(offering: &OfferingSnapshot) -> CreateBookingInput {
        CreateBookingInput {
            service_id: offering.id,
            scheduled_at: Utc::now().into(),
            address_text: "1 Main St, Springfield".into(),
            latitude: None,
            longitude: None,
            addon_amount: Decimal::new(10000, 2),
            discount_amount: Decimal::new(5000, 2),
            tax_amount: Decimal::ZERO,
        }
    }

    #[tokio::test]
    async fn create_computes_breakdown_and_commission() {
        let (_repo, events, svc, offering) = setup();
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);

        let booking = svc.create(customer, input_for(&offering)).await.unwrap();
        // 800 + 100 - 50 + 0 == 850
        assert_eq!(booking.money.total_amount, Decimal::new(85000, 2));
        assert!(booking.money.is_consistent());
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert_eq!(booking.provider_id, offering.provider_id);

        let evs = events.take();
        assert!(matches!(evs.as_slice(), [DomainEvent::BookingCreated { .. }]));
    }

    #[tokio::test]
    async fn create_requires_address() {
        let (_repo, _events, svc, offering) = setup();
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        let mut input = input_for(&offering);
        input.address_text = "  ".into();
        let err = svc.create(customer, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_inactive_offering() {
        let (repo, _events, svc, mut offering) = setup();
        offering.active = false;
        repo.put_offering(offering.clone());
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        let err = svc.create(customer, input_for(&offering)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn provider_runs_the_lifecycle() {
        let (_repo, events, svc, offering) = setup();
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        let provider = Actor::new(offering.provider_id, Role::Provider);

        let booking = svc.create(customer, input_for(&offering)).await.unwrap();
        let money = booking.money;
        events.take();

        let b = svc.transition(provider, booking.id, BookingAction::Accept).await.unwrap();
        assert_eq!(b.status, BookingStatus::Confirmed);
        let b = svc.transition(provider, booking.id, BookingAction::Start).await.unwrap();
        assert_eq!(b.status, BookingStatus::InProgress);
        let b = svc.transition(provider, booking.id, BookingAction::Complete).await.unwrap();
        assert_eq!(b.status, BookingStatus::Completed);
        assert!(b.completed_at.is_some());
        // Transitions never touch the monetary fields
        assert_eq!(b.money, money);

        let evs = events.take();
        assert_eq!(
            evs,
            vec![
                DomainEvent::BookingConfirmed { booking_id: booking.id },
                DomainEvent::BookingStarted { booking_id: booking.id },
                DomainEvent::BookingCompleted { booking_id: booking.id },
            ]
        );
    }

    #[tokio::test]
    async fn completed_booking_rejects_further_actions() {
        let (_repo, _events, svc, offering) = setup();
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        let provider = Actor::new(offering.provider_id, Role::Provider);

        let booking = svc.create(customer, input_for(&offering)).await.unwrap();
        svc.transition(provider, booking.id, BookingAction::Accept).await.unwrap();
        svc.transition(provider, booking.id, BookingAction::Start).await.unwrap();
        svc.transition(provider, booking.id, BookingAction::Complete).await.unwrap();

        let err = svc.transition(provider, booking.id, BookingAction::Complete).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transition(_)));
        let err = svc.cancel(customer, booking.id, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transition(_)));
    }

    #[tokio::test]
    async fn foreign_provider_sees_not_found() {
        let (_repo, _events, svc, offering) = setup();
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        let stranger = Actor::new(Uuid::new_v4(), Role::Provider);

        let booking = svc.create(customer, input_for(&offering)).await.unwrap();
        let err = svc.transition(stranger, booking.id, BookingAction::Accept).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn cas_update_requires_expected_status() {
        let (repo, _events, svc, offering) = setup();
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);

        let booking = svc.create(customer, input_for(&offering)).await.unwrap();
        // A concurrent writer moved the booking on after our read
        repo.force_status(booking.id, BookingStatus::Confirmed);

        // Stale expectation loses the compare-and-swap
        let miss = repo
            .update_status(
                booking.id,
                BookingStatus::Pending,
                StatusChange { to: BookingStatus::Confirmed, cancellation: None },
            )
            .await
            .unwrap();
        assert!(miss.is_none());

        // Matching expectation wins
        let hit = repo
            .update_status(
                booking.id,
                BookingStatus::Confirmed,
                StatusChange { to: BookingStatus::InProgress, cancellation: None },
            )
            .await
            .unwrap();
        assert_eq!(hit.unwrap().status, BookingStatus::InProgress);
    }

    #[tokio::test]
    async fn cancellation_records_actor_and_reason() {
        let (_repo, _events, svc, offering) = setup();
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);

        let booking = svc.create(customer, input_for(&offering)).await.unwrap();
        let b = svc.cancel(customer, booking.id, Some("changed my mind".into())).await.unwrap();
        assert_eq!(b.status, BookingStatus::Cancelled);
        let c = b.cancellation.expect("cancellation metadata");
        assert_eq!(c.by, Role::Customer);
        assert_eq!(c.reason.as_deref(), Some("changed my mind"));
    }

    #[tokio::test]
    async fn refund_flow_via_override_only() {
        let (_repo, _events, svc, offering) = setup();
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        let provider = Actor::new(offering.provider_id, Role::Provider);
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);

        let booking = svc.create(customer, input_for(&offering)).await.unwrap();
        svc.transition(provider, booking.id, BookingAction::Accept).await.unwrap();
        svc.transition(provider, booking.id, BookingAction::Start).await.unwrap();
        svc.transition(provider, booking.id, BookingAction::Complete).await.unwrap();

        let b = svc.force_status(admin, booking.id, BookingStatus::RefundRequested).await.unwrap();
        assert_eq!(b.status, BookingStatus::RefundRequested);
        // Leaving completed clears the completion stamp
        assert!(b.completed_at.is_none());
        let b = svc.force_status(admin, booking.id, BookingStatus::Refunded).await.unwrap();
        assert_eq!(b.status, BookingStatus::Refunded);

        // Non-admins cannot use the override path
        let err = svc.force_status(provider, booking.id, BookingStatus::Completed).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }
}
