use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Entity;
use crate::database::query_builder::QueryBuilder;
use crate::database::EntityStore;
use crate::filter::Specification;
use crate::types::{Page, PageRequest};

/// Postgres adapter for one entity table
pub struct Repository<E> {
    pool: PgPool,
    log_queries: bool,
    slow_query_threshold: Option<Duration>,
    _phantom: PhantomData<E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, log_queries: false, slow_query_threshold: None, _phantom: PhantomData }
    }

    pub fn with_logging(mut self, log_queries: bool, slow_query_threshold: Option<Duration>) -> Self {
        self.log_queries = log_queries;
        self.slow_query_threshold = slow_query_threshold;
        self
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for Repository<E> {
    async fn find_page(
        &self,
        spec: &Specification<E::Field>,
        page: &PageRequest<E::Field>,
    ) -> Result<Page<E>, DatabaseError> {
        let builder = QueryBuilder::<E>::new(spec)
            .page(page)
            .logging(self.log_queries, self.slow_query_threshold);

        let total = builder.count(&self.pool).await.map_err(|e| {
            error!(table = E::TABLE, "Count query failed: {}", e);
            e
        })?;
        let rows = builder.select_all(&self.pool).await.map_err(|e| {
            error!(table = E::TABLE, "Select query failed: {}", e);
            e
        })?;

        Ok(Page::new(rows, page, total.max(0) as u64))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
