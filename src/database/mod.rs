pub mod manager;
pub mod memory;
pub mod models;
pub mod query_builder;
pub mod repository;

use async_trait::async_trait;

use crate::filter::Specification;
use crate::types::{Page, PageRequest};

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use models::Entity;
pub use repository::Repository;

/// Persistent store port: runs a predicate tree with paging and sort and
/// returns one page plus the total match count.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn find_page(
        &self,
        spec: &Specification<E::Field>,
        page: &PageRequest<E::Field>,
    ) -> Result<Page<E>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
