//! Criteria for the administrative hierarchy: province, district,
//! municipality and ward.

use std::collections::BTreeSet;

use serde::Deserialize;
use uuid::Uuid;

use super::validation::MAX_SEARCH_TERM_CHARS;
use super::{GeoFilter, Paging, SearchCriteria, Violations};
use crate::database::models::{
    District, DistrictField, DistrictSortField, Municipality, MunicipalityField, MunicipalitySortField,
    MunicipalityType, Province, ProvinceField, ProvinceSortField, Ward, WardField, WardSortField,
};
use crate::filter::Specification;
use crate::specification;

/// Area and population bounds shared by every level of the hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SizeFilter {
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub min_population: Option<i64>,
    pub max_population: Option<i64>,
}

impl SizeFilter {
    pub fn check(&self, v: &mut Violations) {
        v.at_least("minArea", self.min_area, 0.0);
        v.at_least("maxArea", self.max_area, 0.0);
        v.range("minArea", self.min_area, "maxArea", self.max_area);
        v.at_least("minPopulation", self.min_population, 0);
        v.at_least("maxPopulation", self.max_population, 0);
        v.range("minPopulation", self.min_population, "maxPopulation", self.max_population);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvinceSearchCriteria {
    /// Matched against name (both scripts) and headquarter.
    pub search_term: Option<String>,
    #[serde(flatten)]
    pub size: SizeFilter,
    pub fields: Option<BTreeSet<ProvinceField>>,
    #[serde(flatten)]
    pub paging: Paging<ProvinceSortField>,
}

impl SearchCriteria for ProvinceSearchCriteria {
    type Entity = Province;
    type Sort = ProvinceSortField;

    fn paging(&self) -> &Paging<ProvinceSortField> {
        &self.paging
    }

    fn fields(&self) -> Option<&BTreeSet<ProvinceField>> {
        self.fields.as_ref()
    }

    fn check(&self, v: &mut Violations) {
        v.max_chars("searchTerm", self.search_term.as_deref(), MAX_SEARCH_TERM_CHARS);
        self.size.check(v);
    }

    fn to_specification(&self) -> Specification<ProvinceField> {
        specification::geography::province(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DistrictSearchCriteria {
    pub search_term: Option<String>,
    pub province_id: Option<Uuid>,
    #[serde(flatten)]
    pub size: SizeFilter,
    pub fields: Option<BTreeSet<DistrictField>>,
    #[serde(flatten)]
    pub paging: Paging<DistrictSortField>,
}

impl SearchCriteria for DistrictSearchCriteria {
    type Entity = District;
    type Sort = DistrictSortField;

    fn paging(&self) -> &Paging<DistrictSortField> {
        &self.paging
    }

    fn fields(&self) -> Option<&BTreeSet<DistrictField>> {
        self.fields.as_ref()
    }

    fn check(&self, v: &mut Violations) {
        v.max_chars("searchTerm", self.search_term.as_deref(), MAX_SEARCH_TERM_CHARS);
        self.size.check(v);
    }

    fn to_specification(&self) -> Specification<DistrictField> {
        specification::geography::district(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MunicipalitySearchCriteria {
    pub search_term: Option<String>,
    pub district_id: Option<Uuid>,
    pub types: BTreeSet<MunicipalityType>,
    pub min_wards: Option<i32>,
    pub max_wards: Option<i32>,
    #[serde(flatten)]
    pub size: SizeFilter,
    #[serde(flatten)]
    pub location: GeoFilter,
    pub fields: Option<BTreeSet<MunicipalityField>>,
    #[serde(flatten)]
    pub paging: Paging<MunicipalitySortField>,
}

impl SearchCriteria for MunicipalitySearchCriteria {
    type Entity = Municipality;
    type Sort = MunicipalitySortField;

    fn paging(&self) -> &Paging<MunicipalitySortField> {
        &self.paging
    }

    fn fields(&self) -> Option<&BTreeSet<MunicipalityField>> {
        self.fields.as_ref()
    }

    fn check(&self, v: &mut Violations) {
        v.max_chars("searchTerm", self.search_term.as_deref(), MAX_SEARCH_TERM_CHARS);
        v.at_least("minWards", self.min_wards, 1);
        v.at_least("maxWards", self.max_wards, 1);
        v.range("minWards", self.min_wards, "maxWards", self.max_wards);
        self.size.check(v);
        self.location.check(v);
    }

    fn to_specification(&self) -> Specification<MunicipalityField> {
        specification::geography::municipality(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WardSearchCriteria {
    /// Matched against office address.
    pub search_term: Option<String>,
    pub municipality_id: Option<Uuid>,
    pub ward_number: Option<i32>,
    pub ward_number_from: Option<i32>,
    pub ward_number_to: Option<i32>,
    #[serde(flatten)]
    pub size: SizeFilter,
    #[serde(flatten)]
    pub location: GeoFilter,
    pub fields: Option<BTreeSet<WardField>>,
    #[serde(flatten)]
    pub paging: Paging<WardSortField>,
}

impl SearchCriteria for WardSearchCriteria {
    type Entity = Ward;
    type Sort = WardSortField;

    fn paging(&self) -> &Paging<WardSortField> {
        &self.paging
    }

    fn fields(&self) -> Option<&BTreeSet<WardField>> {
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
        self.size.check(v);
        self.location.check(v);
    }

    fn to_specification(&self) -> Specification<WardField> {
        specification::geography::ward(self)
    }
}
