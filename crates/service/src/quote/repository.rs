use async_trait::async_trait;
use uuid::Uuid;

use common::pagination::Pagination;

use crate::errors::ServiceError;

use super::domain::{NewQuote, NewQuoteResponse, Quote, QuoteResponse};
use super::status::QuoteStatus;

/// Repository abstraction for quote persistence. Status writes are
/// compare-and-swap like bookings/orders; `add_response` pairs the response
/// insert with the status flip in one transaction.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn service_belongs_to_provider(&self, service_id: Uuid, provider_id: Uuid) -> Result<bool, ServiceError>;

    async fn insert(&self, quote: NewQuote) -> Result<Quote, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quote>, ServiceError>;
    async fn add_response(
        &self,
        response: NewQuoteResponse,
        expected: QuoteStatus,
    ) -> Result<Option<(Quote, QuoteResponse)>, ServiceError>;
    async fn update_status(
        &self,
        id: Uuid,
        expected: QuoteStatus,
        next: QuoteStatus,
    ) -> Result<Option<Quote>, ServiceError>;

    async fn list_for_customer(&self, customer_id: Uuid, page: Pagination) -> Result<Vec<Quote>, ServiceError>;
    async fn list_for_provider(&self, provider_id: Uuid, page: Pagination) -> Result<Vec<Quote>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockQuoteRepository {
        provider_services: Mutex<HashSet<(Uuid, Uuid)>>,
        quotes: Mutex<HashMap<Uuid, Quote>>,
    }

    impl MockQuoteRepository {
        pub fn put_provider_service(&self, provider_id: Uuid, service_id: Uuid) {
            self.provider_services.lock().unwrap().insert((provider_id, service_id));
        }
    }

    #[async_trait]
    impl QuoteRepository for MockQuoteRepository {
        async fn service_belongs_to_provider(&self, service_id: Uuid, provider_id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.provider_services.lock().unwrap().contains(&(provider_id, service_id)))
        }

        async fn insert(&self, quote: NewQuote) -> Result<Quote, ServiceError> {
            let now = Utc::now().into();
            let stored = Quote {
                id: quote.id,
                code: quote.code,
                customer_id: quote.customer_id,
                provider_id: quote.provider_id,
                service_id: quote.service_id,
                description: quote.description,
                preferred_date: quote.preferred_date,
                status: QuoteStatus::Pending,
                responses: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            self.quotes.lock().unwrap().insert(stored.id, stored.clone());
            Ok(stored)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Quote>, ServiceError> {
            Ok(self.quotes.lock().unwrap().get(&id).cloned())
        }

        async fn add_response(
            &self,
            response: NewQuoteResponse,
            expected: QuoteStatus,
        ) -> Result<Option<(Quote, QuoteResponse)>, ServiceError> {
            let mut quotes = self.quotes.lock().unwrap();
            let Some(q) = quotes.get_mut(&response.quote_id) else { return Ok(None) };
            if q.status != expected {
                return Ok(None);
            }
            let stored = QuoteResponse {
                id: Uuid::new_v4(),
                quote_id: response.quote_id,
                provider_id: response.provider_id,
                message: response.message,
                quoted_price: response.quoted_price,
                estimated_duration_minutes: response.estimated_duration_minutes,
                created_at: Utc::now().into(),
            };
            q.responses.push(stored.clone());
            q.status = QuoteStatus::Responded;
            q.updated_at = stored.created_at;
            Ok(Some((q.clone(), stored)))
        }

        async fn update_status(
            &self,
            id: Uuid,
            expected: QuoteStatus,
            next: QuoteStatus,
        ) -> Result<Option<Quote>, ServiceError> {
            let mut quotes = self.quotes.lock().unwrap();
            let Some(q) = quotes.get_mut(&id) else { return Ok(None) };
            if q.status != expected {
                return Ok(None);
            }
            q.status = next;
            q.updated_at = Utc::now().into();
            Ok(Some(q.clone()))
        }

        async fn list_for_customer(&self, customer_id: Uuid, page: Pagination) -> Result<Vec<Quote>, ServiceError> {
            let (page_idx, per_page) = page.normalize();
            let mut rows: Vec<Quote> = self
                .quotes
                .lock()
                .unwrap()
                .values()
                .filter(|q| q.customer_id == customer_id)
                .cloned()
                .collect();
            rows.sort_by_key(|q| std::cmp::Reverse(q.created_at));
            Ok(rows.into_iter().skip((page_idx * per_page) as usize).take(per_page as usize).collect())
        }

        async fn list_for_provider(&self, provider_id: Uuid, page: Pagination) -> Result<Vec<Quote>, ServiceError> {
            let (page_idx, per_page) = page.normalize();
            let mut rows: Vec<Quote> = self
                .quotes
                .lock()
                .unwrap()
                .values()
                .filter(|q| q.provider_id == provider_id)
                .cloned()
                .collect();
            rows.sort_by_key(|q| std::cmp::Reverse(q.created_at));
            Ok(rows.into_iter().skip((page_idx * per_page) as usize).take(per_page as usize).collect())
        }
    }
}
