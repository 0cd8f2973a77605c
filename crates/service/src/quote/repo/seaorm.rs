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

use super::super::domain::{NewQuote, NewQuoteResponse, Quote, QuoteResponse};
use super::super::repository::QuoteRepository;
use super::super::status::QuoteStatus;

pub struct SeaOrmQuoteRepository {
    pub db: DatabaseConnection,
}

fn response_to_domain(m: models::quote_response::Model) -> QuoteResponse {
    QuoteResponse {
        id: m.id,
        quote_id: m.quote_id,
        provider_id: m.provider_id,
        message: m.message,
        quoted_price: m.quoted_price,
        estimated_duration_minutes: m.estimated_duration_minutes,
        created_at: m.created_at,
    }
}

fn to_domain(m: models::quote::Model, responses: Vec<models::quote_response::Model>) -> Result<Quote, ServiceError> {
    let status: QuoteStatus = m
        .status
        .parse()
        .map_err(|e: String| ServiceError::Db(format!("quote {}: {}", m.id, e)))?;
    Ok(Quote {
        id: m.id,
        code: m.code,
        customer_id: m.customer_id,
        provider_id: m.provider_id,
        service_id: m.service_id,
        description: m.description,
        preferred_date: m.preferred_date,
        status,
        responses: responses.into_iter().map(response_to_domain).collect(),
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

impl SeaOrmQuoteRepository {
    async fn load_responses(&self, quote_id: Uuid) -> Result<Vec<models::quote_response::Model>, ServiceError> {
        models::quote_response::Entity::find()
            .filter(models::quote_response::Column::QuoteId.eq(quote_id))
            .order_by_asc(models::quote_response::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }
}

#[async_trait]
impl QuoteRepository for SeaOrmQuoteRepository {
    async fn service_belongs_to_provider(&self, service_id: Uuid, provider_id: Uuid) -> Result<bool, ServiceError> {
        let count = models::service_offering::Entity::find()
            .filter(models::service_offering::Column::Id.eq(service_id))
            .filter(models::service_offering::Column::ProviderId.eq(provider_id))
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(count > 0)
    }

    async fn insert(&self, quote: NewQuote) -> Result<Quote, ServiceError> {
        let now = Utc::now().into();
        let am = models::quote::ActiveModel {
            id: Set(quote.id),
            code: Set(quote.code),
            customer_id: Set(quote.customer_id),
            provider_id: Set(quote.provider_id),
            service_id: Set(quote.service_id),
            description: Set(quote.description),
            preferred_date: Set(quote.preferred_date),
            status: Set(QuoteStatus::Pending.as_str().into()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = am.insert(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        to_domain(created, Vec::new())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quote>, ServiceError> {
        let res = models::quote::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        match res {
            Some(m) => {
                let responses = self.load_responses(m.id).await?;
                Ok(Some(to_domain(m, responses)?))
            }
            None => Ok(None),
        }
    }

    async fn add_response(
        &self,
        response: NewQuoteResponse,
        expected: QuoteStatus,
    ) -> Result<Option<(Quote, QuoteResponse)>, ServiceError> {
        use models::quote::Column;

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

        // Response row and status flip commit together; the CAS on the
        // current status keeps concurrent decisions out.
        let txn = self.db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;

        let res = models::quote::Entity::update_many()
            .col_expr(Column::Status, Expr::value(QuoteStatus::Responded.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(response.quote_id))
            .filter(Column::Status.eq(expected.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if res.rows_affected == 0 {
            txn.rollback().await.map_err(|e| ServiceError::Db(e.to_string()))?;
            return Ok(None);
        }

        let am = models::quote_response::ActiveModel {
            id: Set(Uuid::new_v4()),
            quote_id: Set(response.quote_id),
            provider_id: Set(response.provider_id),
            message: Set(response.message),
            quoted_price: Set(response.quoted_price),
            estimated_duration_minutes: Set(response.estimated_duration_minutes),
            created_at: Set(now),
        };
        let created = am.insert(&txn).await.map_err(|e| ServiceError::Db(e.to_string()))?;

        txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;

        match self.find_by_id(response.quote_id).await? {
            Some(quote) => Ok(Some((quote, response_to_domain(created)))),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: QuoteStatus,
        next: QuoteStatus,
    ) -> Result<Option<Quote>, ServiceError> {
        use models::quote::Column;

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let res = models::quote::Entity::update_many()
            .col_expr(Column::Status, Expr::value(next.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn list_for_customer(&self, customer_id: Uuid, page: Pagination) -> Result<Vec<Quote>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        let rows = models::quote::Entity::find()
            .filter(models::quote::Column::CustomerId.eq(customer_id))
            .order_by_desc(models::quote::Column::CreatedAt)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let mut quotes = Vec::with_capacity(rows.len());
        for m in rows {
            let responses = self.load_responses(m.id).await?;
            quotes.push(to_domain(m, responses)?);
        }
        Ok(quotes)
    }

    async fn list_for_provider(&self, provider_id: Uuid, page: Pagination) -> Result<Vec<Quote>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        let rows = models::quote::Entity::find()
            .filter(models::quote::Column::ProviderId.eq(provider_id))
            .order_by_desc(models::quote::Column::CreatedAt)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let mut quotes = Vec::with_capacity(rows.len());
        for m in rows {
            let responses = self.load_responses(m.id).await?;
            quotes.push(to_domain(m, responses)?);
        }
        Ok(quotes)
    }
}
