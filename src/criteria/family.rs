use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::validation::MAX_SEARCH_TERM_CHARS;
use super::{GeoFilter, Paging, SearchCriteria, Violations};
use crate::database::models::{Family, FamilyField, FamilySortField, HouseOwnership};
use crate::filter::Specification;
use crate::specification;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilySearchCriteria {
    /// Matched against head of family (both scripts), tole and contact number.
    pub search_term: Option<String>,
    pub ward_number: Option<i32>,
    pub ward_number_from: Option<i32>,
    pub ward_number_to: Option<i32>,
    pub min_members: Option<i32>,
    pub max_members: Option<i32>,
    pub house_ownerships: BTreeSet<HouseOwnership>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub location: GeoFilter,
    pub fields: Option<BTreeSet<FamilyField>>,
    #[serde(flatten)]
    pub paging: Paging<FamilySortField>,
}

impl SearchCriteria for FamilySearchCriteria {
    type Entity = Family;
    type Sort = FamilySortField;

    fn paging(&self) -> &Paging<FamilySortField> {
        &self.paging
    }

    fn fields(&self) -> Option<&BTreeSet<FamilyField>> {
        self.fields.as_ref()
    }

    fn check(&self, v: &mut Violations) {
        v.max_chars("searchTerm", self.search_term.as_deref(), MAX_SEARCH_TERM_CHARS);
        v.at_least("wardNumber", self.ward_number, 1);
        v.at_least("wardNumberFrom", self.ward_number_from, 1);
        v.at_least("wardNumberTo", self.ward_number_to, 1);
        v.range("wardNumberFrom", self.ward_number_from, "wardNumberTo", self.ward_number_to);
        v.exclusive(
            "wardNumber",
            self.ward_number.is_some(),
            "wardNumberFrom/wardNumberTo",
            self.ward_number_from.is_some() || self.ward_number_to.is_some(),
        );
        v.at_least("minMembers", self.min_members, 0);
        v.at_least("maxMembers", self.max_members, 0);
        v.range("minMembers", self.min_members, "maxMembers", self.max_members);
        v.range("createdFrom", self.created_from, "createdTo", self.created_to);
        self.location.check(v);
    }

    fn to_specification(&self) -> Specification<FamilyField> {
        specification::family::from_criteria(self)
    }
}
