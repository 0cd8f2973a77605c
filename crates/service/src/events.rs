//! Domain events emitted after successful state changes.
//!
//! Lifecycle side effects (payment capture, notifications, earnings ledger)
//! subscribe to these instead of being inlined into the services.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::access::Role;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    BookingCreated { booking_id: Uuid, code: String },
    BookingConfirmed { booking_id: Uuid },
    BookingStarted { booking_id: Uuid },
    BookingCompleted { booking_id: Uuid },
    BookingCancelled { booking_id: Uuid, by: Role },
    BookingOverridden { booking_id: Uuid, from: String, to: String },
    OrderCreated { order_id: Uuid, code: String, items: usize },
    OrderStatusChanged { order_id: Uuid, from: String, to: String },
    OrderPaid { order_id: Uuid },
    QuoteSubmitted { quote_id: Uuid, code: String },
    QuoteResponded { quote_id: Uuid, response_id: Uuid },
    QuoteDecided { quote_id: Uuid, accepted: bool },
    QuoteClosed { quote_id: Uuid },
}

/// Downstream collaborators receive events through this seam.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent);
}

/// Default publisher: structured log records only. Real consumers
/// (notification fanout, earnings ledger) plug in behind the same trait.
#[derive(Default)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: DomainEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(target: "domain_events", %payload, "domain event"),
            Err(_) => info!(target: "domain_events", ?event, "domain event"),
        }
    }
}

/// In-memory collector for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryEventPublisher {
        events: Mutex<Vec<DomainEvent>>,
    }

    impl MemoryEventPublisher {
        pub fn take(&self) -> Vec<DomainEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }

        pub fn snapshot(&self) -> Vec<DomainEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventPublisher for MemoryEventPublisher {
        async fn publish(&self, event: DomainEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
