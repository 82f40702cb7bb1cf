//! Search criteria: the deserialized request bundle of filters, paging, sort
//! and field selection for one entity type.
//!
//! `validate` is purely structural and reports every violation at once. A
//! criteria object that passes it can always be turned into a page request
//! and a specification.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::database::models::Entity;
use crate::field::{EntityField, SortField};
use crate::filter::{SortDirection, Specification};
use crate::types::PageRequest;

pub mod geography;
pub mod family;
pub mod user;
pub mod validation;

pub use family::FamilySearchCriteria;
pub use geography::{DistrictSearchCriteria, MunicipalitySearchCriteria, ProvinceSearchCriteria, WardSearchCriteria};
pub use user::UserSearchCriteria;
pub use validation::{GeoFilter, ValidationErrors, Violations};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Paging and sort block flattened into every criteria object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "S: Deserialize<'de>", serialize = "S: Serialize"))]
pub struct Paging<S> {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<S>,
    pub sort_direction: Option<SortDirection>,
}

impl<S> Default for Paging<S> {
    fn default() -> Self {
        Self { page: None, page_size: None, sort_by: None, sort_direction: None }
    }
}

impl<S: SortField + Default> Paging<S> {
    pub fn check(&self, violations: &mut Violations) {
        violations.at_least("page", self.page, 0);
        violations.between("pageSize", self.page_size, 1, MAX_PAGE_SIZE as i64);
    }

    /// Only meaningful once `check` has passed; out-of-range values are clamped.
    pub fn to_page_request(&self, default_page_size: u32) -> PageRequest<S::Field> {
        let page_size = self
            .page_size
            .map(|size| size.clamp(1, MAX_PAGE_SIZE as i64) as u32)
            .unwrap_or_else(|| default_page_size.clamp(1, MAX_PAGE_SIZE));
        PageRequest {
            page: self.page.unwrap_or(0).clamp(0, u32::MAX as i64) as u32,
            page_size,
            sort_field: self.sort_by.unwrap_or_default().to_entity_field(),
            sort_direction: self.sort_direction.unwrap_or_default(),
        }
    }
}

type FieldOf<C> = <<C as SearchCriteria>::Entity as Entity>::Field;

pub trait SearchCriteria: for<'de> Deserialize<'de> + Default + Send + Sync + 'static {
    type Entity: Entity;
    type Sort: SortField<Field = FieldOf<Self>> + Default;

    fn paging(&self) -> &Paging<Self::Sort>;

    /// Requested projection; `None` or empty selects the default set.
    fn fields(&self) -> Option<&BTreeSet<FieldOf<Self>>>;

    /// Entity-specific structural checks.
    fn check(&self, violations: &mut Violations);

    /// Lowers the filter fields into a predicate tree. Absent filters
    /// contribute no constraint.
    fn to_specification(&self) -> Specification<FieldOf<Self>>;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut violations = Violations::default();
        self.paging().check(&mut violations);
        self.check(&mut violations);
        violations.into_result()
    }

    fn to_page_request(&self, default_page_size: u32) -> PageRequest<FieldOf<Self>> {
        self.paging().to_page_request(default_page_size)
    }

    fn selected_fields(&self) -> Vec<FieldOf<Self>> {
        match self.fields() {
            Some(fields) if !fields.is_empty() => fields.iter().copied().collect(),
            _ => <FieldOf<Self> as EntityField>::DEFAULT_FIELDS.to_vec(),
        }
    }
}

/// Trims and drops blank search terms.
pub(crate) fn search_term(term: &Option<String>) -> Option<&str> {
    term.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{UserField, UserSortField};

    #[test]
    fn empty_paging_uses_defaults() {
        let paging: Paging<UserSortField> = serde_json::from_str("{}").unwrap();
        let request = paging.to_page_request(DEFAULT_PAGE_SIZE);
        assert_eq!(request.page, 0);
        assert_eq!(request.page_size, 20);
        assert_eq!(request.sort_field, UserField::CreatedAt);
        assert_eq!(request.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn paging_bounds_are_checked() {
        let paging: Paging<UserSortField> =
            serde_json::from_str(r#"{"page": -1, "pageSize": 101, "sortBy": "fullName", "sortDirection": "DESC"}"#)
                .unwrap();
        let mut v = Violations::default();
        paging.check(&mut v);
        let err = v.into_result().unwrap_err();
        assert!(err.contains("page"));
        assert!(err.contains("pageSize"));
        assert_eq!(paging.sort_by, Some(UserSortField::FullName));
    }

    #[test]
    fn blank_search_term_is_absent() {
        assert_eq!(search_term(&Some("   ".to_string())), None);
        assert_eq!(search_term(&Some(" john ".to_string())), Some("john"));
    }
}
