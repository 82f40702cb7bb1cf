use super::{all_of, equal, one_of, range, search_term, within_radius};
use crate::criteria::geography::{
    DistrictSearchCriteria, MunicipalitySearchCriteria, ProvinceSearchCriteria, WardSearchCriteria,
};
use crate::database::models::{DistrictField, MunicipalityField, ProvinceField, WardField};
use crate::filter::Specification;

pub fn province(criteria: &ProvinceSearchCriteria) -> Specification<ProvinceField> {
    all_of([
        search_term(
            criteria.search_term.as_deref(),
            &[ProvinceField::Name, ProvinceField::NameNepali, ProvinceField::Headquarter],
        ),
        range(ProvinceField::AreaSqKm, criteria.size.min_area, criteria.size.max_area),
        range(ProvinceField::Population, criteria.size.min_population, criteria.size.max_population),
    ])
}

pub fn district(criteria: &DistrictSearchCriteria) -> Specification<DistrictField> {
    all_of([
        search_term(
            criteria.search_term.as_deref(),
            &[DistrictField::Name, DistrictField::NameNepali, DistrictField::Headquarter],
        ),
        equal(DistrictField::ProvinceId, criteria.province_id),
        range(DistrictField::AreaSqKm, criteria.size.min_area, criteria.size.max_area),
        range(DistrictField::Population, criteria.size.min_population, criteria.size.max_population),
    ])
}

pub fn municipality(criteria: &MunicipalitySearchCriteria) -> Specification<MunicipalityField> {
    all_of([
        search_term(
            criteria.search_term.as_deref(),
            &[MunicipalityField::Name, MunicipalityField::NameNepali],
        ),
        equal(MunicipalityField::DistrictId, criteria.district_id),
        one_of(MunicipalityField::Type, &criteria.types),
        range(MunicipalityField::TotalWards, criteria.min_wards, criteria.max_wards),
        range(MunicipalityField::AreaSqKm, criteria.size.min_area, criteria.size.max_area),
        range(MunicipalityField::Population, criteria.size.min_population, criteria.size.max_population),
        within_radius(MunicipalityField::Latitude, MunicipalityField::Longitude, criteria.location.circle()),
    ])
}

pub fn ward(criteria: &WardSearchCriteria) -> Specification<WardField> {
    all_of([
        search_term(criteria.search_term.as_deref(), &[WardField::OfficeAddress]),
        equal(WardField::MunicipalityId, criteria.municipality_id),
        equal(WardField::WardNumber, criteria.ward_number),
        range(WardField::WardNumber, criteria.ward_number_from, criteria.ward_number_to),
        range(WardField::AreaSqKm, criteria.size.min_area, criteria.size.max_area),
        range(WardField::Population, criteria.size.min_population, criteria.size.max_population),
        within_radius(WardField::Latitude, WardField::Longitude, criteria.location.circle()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SearchCriteria;
    use crate::database::models::MunicipalityType;
    use crate::filter::{FilterOp, Predicate};
    use uuid::Uuid;

    #[test]
    fn defaults_are_unconstrained_at_every_level() {
        assert!(ProvinceSearchCriteria::default().to_specification().is_unconstrained());
        assert!(DistrictSearchCriteria::default().to_specification().is_unconstrained());
        assert!(MunicipalitySearchCriteria::default().to_specification().is_unconstrained());
        assert!(WardSearchCriteria::default().to_specification().is_unconstrained());
    }

    #[test]
    fn district_filters_by_parent() {
        let province_id = Uuid::new_v4();
        let criteria = DistrictSearchCriteria { province_id: Some(province_id), ..Default::default() };
        assert_eq!(
            district(&criteria).predicate,
            Predicate::leaf(DistrictField::ProvinceId, FilterOp::Eq, province_id)
        );
    }

    #[test]
    fn municipality_type_set_is_scalar_membership() {
        let criteria = MunicipalitySearchCriteria {
            types: [MunicipalityType::MetropolitanCity].into_iter().collect(),
            ..Default::default()
        };
        let spec = municipality(&criteria);
        assert!(!spec.distinct);
        assert_eq!(
            spec.predicate,
            Predicate::leaf(MunicipalityField::Type, FilterOp::In, vec!["METROPOLITAN_CITY"])
        );
    }
}
