use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};

use crate::criteria::{SearchCriteria, ValidationErrors};
use crate::database::{DatabaseError, Entity, EntityStore};
use crate::middleware::AuthUser;
use crate::projection::{project, EntityProjection};
use crate::types::Page;

/// Per-request context threaded explicitly through the service layer.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub subject: AuthUser,
    /// Upper bound on the store round trip.
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// validate -> build specification -> bounded store query -> projection
#[derive(Debug, Clone, Copy)]
pub struct SearchService {
    default_page_size: u32,
}

impl SearchService {
    pub fn new(default_page_size: u32) -> Self {
        Self { default_page_size }
    }

    pub async fn search<C: SearchCriteria>(
        &self,
        store: &dyn EntityStore<C::Entity>,
        criteria: &C,
        ctx: &RequestContext,
    ) -> Result<Page<EntityProjection>, SearchError> {
        criteria.validate()?;

        let spec = criteria.to_specification();
        let page_request = criteria.to_page_request(self.default_page_size);
        let fields = criteria.selected_fields();
        debug!(
            table = <C::Entity as Entity>::TABLE,
            user = %ctx.subject.user_id,
            distinct = spec.distinct,
            "Search {:?}",
            spec.predicate
        );

        let page = tokio::time::timeout(ctx.timeout, store.find_page(&spec, &page_request))
            .await
            .map_err(|_| {
                error!(table = <C::Entity as Entity>::TABLE, "Search timed out after {:?}", ctx.timeout);
                DatabaseError::Timeout(ctx.timeout)
            })??;

        Ok(page.map(|entity| project(&entity, &fields)))
    }
}
