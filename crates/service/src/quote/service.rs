use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use common::pagination::Pagination;

use crate::access::{Actor, Capability, Role};
use crate::codes;
use crate::errors::ServiceError;
use crate::events::{DomainEvent, EventPublisher};

use super::domain::{CreateQuoteInput, NewQuote, NewQuoteResponse, Quote, RespondQuoteInput};
use super::repository::QuoteRepository;
use super::status::{next_status, QuoteAction, QuoteStatus};

/// Custom-price request service independent of web framework
pub struct QuoteService<R: QuoteRepository> {
    repo: Arc<R>,
    events: Arc<dyn EventPublisher>,
}

impl<R: QuoteRepository> QuoteService<R> {
    pub fn new(repo: Arc<R>, events: Arc<dyn EventPublisher>) -> Self {
        Self { repo, events }
    }

    /// Submit a quote request to a provider for one of its services.
    #[instrument(skip(self, input), fields(customer_id = %actor.user_id, provider_id = %input.provider_id))]
    pub async fn create(&self, actor: Actor, input: CreateQuoteInput) -> Result<Quote, ServiceError> {
        if !actor.can(Capability::RequestQuote) {
            return Err(ServiceError::Forbidden(Capability::RequestQuote));
        }
        if input.description.trim().is_empty() {
            return Err(ServiceError::Validation("description required".into()));
        }
        if !self.repo.service_belongs_to_provider(input.service_id, input.provider_id).await? {
            return Err(ServiceError::Validation("service does not belong to provider".into()));
        }

        let quote = self
            .repo
            .insert(NewQuote {
                id: Uuid::new_v4(),
                code: codes::quote_code(),
                customer_id: actor.user_id,
                provider_id: input.provider_id,
                service_id: input.service_id,
                description: input.description,
                preferred_date: input.preferred_date,
            })
            .await?;

        info!(quote_id = %quote.id, code = %quote.code, "quote_submitted");
        self.events
            .publish(DomainEvent::QuoteSubmitted { quote_id: quote.id, code: quote.code.clone() })
            .await;
        Ok(quote)
    }

    /// Provider offer: records a response row and flips the quote to
    /// responded in one transactional write.
    #[instrument(skip(self, input), fields(provider_id = %actor.user_id, %id))]
    pub async fn respond(&self, actor: Actor, id: Uuid, input: RespondQuoteInput) -> Result<Quote, ServiceError> {
        if !actor.can(Capability::RespondQuote) {
            return Err(ServiceError::Forbidden(Capability::RespondQuote));
        }
        if input.message.trim().is_empty() {
            return Err(ServiceError::Validation("message required".into()));
        }
        if input.quoted_price < Decimal::ZERO {
            return Err(ServiceError::Validation("quoted price must be >= 0".into()));
        }

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("quote"))?;
        if current.provider_id != actor.user_id && !actor.is_admin() {
            return Err(ServiceError::not_found("quote"));
        }
        next_status(current.status, QuoteAction::Respond, actor.role)?;

        let updated = self
            .repo
            .add_response(
                NewQuoteResponse {
                    quote_id: id,
                    provider_id: actor.user_id,
                    message: input.message,
                    quoted_price: input.quoted_price,
                    estimated_duration_minutes: input.estimated_duration_minutes,
                },
                current.status,
            )
            .await?;
        let (quote, response) = match updated {
            Some(pair) => pair,
            None => match self.repo.find_by_id(id).await? {
                Some(_) => return Err(ServiceError::concurrent_update("quote")),
                None => return Err(ServiceError::not_found("quote")),
            },
        };

        info!(quote_id = %quote.id, response_id = %response.id, price = %response.quoted_price, "quote_responded");
        self.events
            .publish(DomainEvent::QuoteResponded { quote_id: quote.id, response_id: response.id })
            .await;
        Ok(quote)
    }

    /// Customer decision on a responded quote.
    #[instrument(skip(self), fields(customer_id = %actor.user_id, %id, accept))]
    pub async fn decide(&self, actor: Actor, id: Uuid, accept: bool) -> Result<Quote, ServiceError> {
        if !actor.can(Capability::DecideQuote) {
            return Err(ServiceError::Forbidden(Capability::DecideQuote));
        }

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("quote"))?;
        if current.customer_id != actor.user_id && !actor.is_admin() {
            return Err(ServiceError::not_found("quote"));
        }

        let action = if accept { QuoteAction::Accept } else { QuoteAction::Reject };
        let next = next_status(current.status, action, actor.role)?;

        let quote = match self.repo.update_status(id, current.status, next).await? {
            Some(q) => q,
            None => match self.repo.find_by_id(id).await? {
                Some(_) => return Err(ServiceError::concurrent_update("quote")),
                None => return Err(ServiceError::not_found("quote")),
            },
        };

        info!(quote_id = %quote.id, to = %quote.status, "quote_decided");
        self.events
            .publish(DomainEvent::QuoteDecided { quote_id: quote.id, accepted: accept })
            .await;
        Ok(quote)
    }

    /// Close out a decided quote.
    pub async fn close(&self, actor: Actor, id: Uuid) -> Result<Quote, ServiceError> {
        if !actor.can(Capability::DecideQuote) {
            return Err(ServiceError::Forbidden(Capability::DecideQuote));
        }

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("quote"))?;
        if current.customer_id != actor.user_id && !actor.is_admin() {
            return Err(ServiceError::not_found("quote"));
        }
        let next = next_status(current.status, QuoteAction::Close, actor.role)?;

        let quote = match self.repo.update_status(id, current.status, next).await? {
            Some(q) => q,
            None => match self.repo.find_by_id(id).await? {
                Some(_) => return Err(ServiceError::concurrent_update("quote")),
                None => return Err(ServiceError::not_found("quote")),
            },
        };

        self.events.publish(DomainEvent::QuoteClosed { quote_id: quote.id }).await;
        Ok(quote)
    }

    pub async fn get(&self, actor: Actor, id: Uuid) -> Result<Quote, ServiceError> {
        let quote = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("quote"))?;
        let visible = actor.is_admin()
            || quote.customer_id == actor.user_id
            || quote.provider_id == actor.user_id;
        if !visible {
            return Err(ServiceError::not_found("quote"));
        }
        Ok(quote)
    }

    pub async fn list_for_actor(&self, actor: Actor, page: Pagination) -> Result<Vec<Quote>, ServiceError> {
        match actor.role {
            Role::Provider => self.repo.list_for_provider(actor.user_id, page).await,
            _ => self.repo.list_for_customer(actor.user_id, page).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::mock::MemoryEventPublisher;
    use crate::quote::repository::mock::MockQuoteRepository;

    struct Fixture {
        events: Arc<MemoryEventPublisher>,
        svc: QuoteService<MockQuoteRepository>,
        customer: Actor,
        provider: Actor,
        service_id: Uuid,
    }

    fn setup() -> Fixture {
        let repo = Arc::new(MockQuoteRepository::default());
        let events = Arc::new(MemoryEventPublisher::default());
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        let provider = Actor::new(Uuid::new_v4(), Role::Provider);
        let service_id = Uuid::new_v4();
        repo.put_provider_service(provider.user_id, service_id);
        let svc = QuoteService::new(Arc::clone(&repo), events.clone() as Arc<dyn EventPublisher>);
        Fixture { events, svc, customer, provider, service_id }
    }

    fn request_input(f: &Fixture) -> CreateQuoteInput {
        CreateQuoteInput {
            provider_id: f.provider.user_id,
            service_id: f.service_id,
            description: "Paint two rooms, ceilings included".into(),
            preferred_date: None,
        }
    }

    fn offer_input() -> RespondQuoteInput {
        RespondQuoteInput {
            message: "Can do next week".into(),
            quoted_price: Decimal::new(45000, 2),
            estimated_duration_minutes: Some(240),
        }
    }

    #[tokio::test]
    async fn request_offer_accept_close_flow() {
        let f = setup();

        let quote = f.svc.create(f.customer, request_input(&f)).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert!(quote.code.starts_with("QT-"));

        let quote = f.svc.respond(f.provider, quote.id, offer_input()).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Responded);
        assert_eq!(quote.responses.len(), 1);
        assert_eq!(quote.responses[0].quoted_price, Decimal::new(45000, 2));

        // A revised offer is allowed while still undecided
        let quote = f.svc.respond(f.provider, quote.id, offer_input()).await.unwrap();
        assert_eq!(quote.responses.len(), 2);

        let quote = f.svc.decide(f.customer, quote.id, true).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Accepted);

        let quote = f.svc.close(f.customer, quote.id).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Closed);

        let evs = f.events.take();
        assert_eq!(evs.len(), 5);
        assert!(matches!(evs[0], DomainEvent::QuoteSubmitted { .. }));
        assert!(matches!(evs[4], DomainEvent::QuoteClosed { .. }));
    }

    #[tokio::test]
    async fn create_validates_provider_service_pair() {
        let f = setup();
        let mut input = request_input(&f);
        input.service_id = Uuid::new_v4();
        let err = f.svc.create(f.customer, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn decide_requires_an_offer_first() {
        let f = setup();
        let quote = f.svc.create(f.customer, request_input(&f)).await.unwrap();
        let err = f.svc.decide(f.customer, quote.id, true).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transition(_)));
    }

    #[tokio::test]
    async fn foreign_provider_cannot_respond() {
        let f = setup();
        let quote = f.svc.create(f.customer, request_input(&f)).await.unwrap();
        let stranger = Actor::new(Uuid::new_v4(), Role::Provider);
        let err = f.svc.respond(stranger, quote.id, offer_input()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn closed_quote_is_immutable() {
        let f = setup();
        let quote = f.svc.create(f.customer, request_input(&f)).await.unwrap();
        f.svc.respond(f.provider, quote.id, offer_input()).await.unwrap();
        f.svc.decide(f.customer, quote.id, false).await.unwrap();
        f.svc.close(f.customer, quote.id).await.unwrap();

        let err = f.svc.respond(f.provider, quote.id, offer_input()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transition(_)));
    }
}
