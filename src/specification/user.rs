use super::{all_of, equal, member_of, one_of, range, search_term};
use crate::criteria::UserSearchCriteria;
use crate::database::models::UserField;
use crate::filter::Specification;

const SEARCHABLE: &[UserField] = &[UserField::FullName, UserField::FullNameNepali, UserField::Email];

pub fn from_criteria(criteria: &UserSearchCriteria) -> Specification<UserField> {
    all_of([
        search_term(criteria.search_term.as_deref(), SEARCHABLE),
        member_of(UserField::Roles, &criteria.roles),
        one_of(UserField::OfficePost, &criteria.office_posts),
        equal(UserField::IsApproved, criteria.is_approved),
        equal(UserField::IsActive, criteria.is_active),
        equal(UserField::WardNumber, criteria.ward_number),
        range(UserField::WardNumber, criteria.ward_number_from, criteria.ward_number_to),
        range(UserField::CreatedAt, criteria.created_from, criteria.created_to),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SearchCriteria;
    use crate::database::models::RoleType;
    use crate::filter::{FilterOp, Predicate};

    #[test]
    fn empty_criteria_matches_everything() {
        let spec = UserSearchCriteria::default().to_specification();
        assert!(spec.is_unconstrained());
    }

    #[test]
    fn roles_mark_query_distinct() {
        let criteria = UserSearchCriteria {
            roles: [RoleType::Editor, RoleType::Viewer].into_iter().collect(),
            is_approved: Some(true),
            ..Default::default()
        };
        let spec = from_criteria(&criteria);
        assert!(spec.distinct);
        assert_eq!(
            spec.predicate,
            Predicate::And(vec![
                Predicate::leaf(UserField::Roles, FilterOp::In, vec!["EDITOR", "VIEWER"]),
                Predicate::leaf(UserField::IsApproved, FilterOp::Eq, true),
            ])
        );
    }
}
