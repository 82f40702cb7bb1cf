use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::validation::MAX_SEARCH_TERM_CHARS;
use super::{Paging, SearchCriteria, Violations};
use crate::database::models::{OfficePost, RoleType, User, UserField, UserSortField};
use crate::filter::Specification;
use crate::specification;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSearchCriteria {
    /// Matched against full name, Nepali full name and email.
    pub search_term: Option<String>,
    pub roles: BTreeSet<RoleType>,
    pub office_posts: BTreeSet<OfficePost>,
    pub is_approved: Option<bool>,
    pub is_active: Option<bool>,
    pub ward_number: Option<i32>,
    pub ward_number_from: Option<i32>,
    pub ward_number_to: Option<i32>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub fields: Option<BTreeSet<UserField>>,
    #[serde(flatten)]
    pub paging: Paging<UserSortField>,
}

impl SearchCriteria for UserSearchCriteria {
    type Entity = User;
    type Sort = UserSortField;

    fn paging(&self) -> &Paging<UserSortField> {
        &self.paging
    }

    fn fields(&self) -> Option<&BTreeSet<UserField>> {
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
        v.range("createdFrom", self.created_from, "createdTo", self.created_to);
    }

    fn to_specification(&self) -> Specification<UserField> {
        specification::user::from_criteria(self)
    }
}
