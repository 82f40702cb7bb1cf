use super::{all_of, equal, one_of, range, search_term, within_radius};
use crate::criteria::FamilySearchCriteria;
use crate::database::models::FamilyField;
use crate::filter::Specification;

const SEARCHABLE: &[FamilyField] = &[
    FamilyField::HeadOfFamily,
    FamilyField::HeadOfFamilyNepali,
    FamilyField::Tole,
    FamilyField::ContactNumber,
];

pub fn from_criteria(criteria: &FamilySearchCriteria) -> Specification<FamilyField> {
    all_of([
        search_term(criteria.search_term.as_deref(), SEARCHABLE),
        equal(FamilyField::WardNumber, criteria.ward_number),
        range(FamilyField::WardNumber, criteria.ward_number_from, criteria.ward_number_to),
        range(FamilyField::TotalMembers, criteria.min_members, criteria.max_members),
        one_of(FamilyField::HouseOwnership, &criteria.house_ownerships),
        range(FamilyField::CreatedAt, criteria.created_from, criteria.created_to),
        within_radius(FamilyField::Latitude, FamilyField::Longitude, criteria.location.circle()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::GeoFilter;
    use crate::filter::{FilterOp, Predicate};

    #[test]
    fn member_bounds_apply_independently() {
        let criteria = FamilySearchCriteria { min_members: Some(5), ..Default::default() };
        let spec = from_criteria(&criteria);
        assert_eq!(spec.predicate, Predicate::leaf(FamilyField::TotalMembers, FilterOp::Gte, 5));
        assert!(!spec.distinct);
    }

    #[test]
    fn radius_becomes_geo_predicate() {
        let criteria = FamilySearchCriteria {
            location: GeoFilter { latitude: Some(27.7), longitude: Some(85.3), radius_km: Some(3.0) },
            ..Default::default()
        };
        assert!(matches!(from_criteria(&criteria).predicate, Predicate::WithinRadius { radius_km, .. } if radius_km == 3.0));
    }
}
