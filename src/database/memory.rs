use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::database::EntityStore;
use crate::filter::matcher::{matches, sort_entities};
use crate::filter::Specification;
use crate::types::{Page, PageRequest};

/// In-process store that evaluates specifications against loaded entities
/// with the same semantics as the SQL adapter.
pub struct MemoryStore<E> {
    rows: RwLock<Vec<E>>,
}

impl<E: Entity> MemoryStore<E> {
    pub fn new(rows: Vec<E>) -> Self {
        Self { rows: RwLock::new(rows) }
    }

    pub async fn insert(&self, entity: E) {
        self.rows.write().await.push(entity);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for MemoryStore<E> {
    async fn find_page(
        &self,
        spec: &Specification<E::Field>,
        page: &PageRequest<E::Field>,
    ) -> Result<Page<E>, DatabaseError> {
        // Each row is visited once, so a match over a collection yields the
        // entity once regardless of the distinct marker.
        let mut matched: Vec<E> = {
            let rows = self.rows.read().await;
            rows.iter().filter(|row| matches(*row, &spec.predicate)).cloned().collect()
        };
        sort_entities(&mut matched, page.sort_field, page.sort_direction);

        let total = matched.len() as u64;
        let content = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();
        Ok(Page::new(content, page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Ward, WardField};
    use crate::filter::{FilterOp, Predicate, SortDirection};
    use chrono::Utc;
    use uuid::Uuid;

    fn ward(number: i32, population: Option<i64>) -> Ward {
        Ward {
            id: Uuid::new_v4(),
            municipality_id: Uuid::nil(),
            ward_number: number,
            area_sq_km: None,
            population,
            latitude: None,
            longitude: None,
            office_address: None,
            contact_number: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(page: u32, page_size: u32) -> PageRequest<WardField> {
        PageRequest { page, page_size, sort_field: WardField::WardNumber, sort_direction: SortDirection::Asc }
    }

    #[tokio::test]
    async fn pages_through_sorted_matches() {
        let store = MemoryStore::new((1..=5).rev().map(|n| ward(n, Some(n as i64 * 100))).collect());
        let page = store.find_page(&Specification::all(), &request(1, 2)).await.unwrap();
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
        let numbers: Vec<i32> = page.content.iter().map(|w| w.ward_number).collect();
        assert_eq!(numbers, vec![3, 4]);
    }

    #[tokio::test]
    async fn filters_before_counting() {
        let store = MemoryStore::new(vec![ward(1, Some(50)), ward(2, None), ward(3, Some(900))]);
        let spec = Specification::from_predicate(Predicate::leaf(WardField::Population, FilterOp::Gte, 100));
        let page = store.find_page(&spec, &request(0, 20)).await.unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].ward_number, 3);
        assert!(store.health_check().await.is_ok());
    }
}
