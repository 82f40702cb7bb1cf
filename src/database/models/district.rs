use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use super::{opt, text, Collection, Entity};
use crate::types::FieldValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: Uuid,
    pub province_id: Uuid,
    pub name: String,
    pub name_nepali: Option<String>,
    pub area_sq_km: Option<f64>,
    pub population: Option<i64>,
    pub headquarter: Option<String>,
    pub headquarter_nepali: Option<String>,
    pub municipality_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

crate::entity_fields! {
    pub enum DistrictField {
        Id => ("ID", "id"),
        ProvinceId => ("PROVINCE_ID", "province_id"),
        Name => ("NAME", "name"),
        NameNepali => ("NAME_NEPALI", "name_nepali"),
        AreaSqKm => ("AREA_SQ_KM", "area_sq_km"),
        Population => ("POPULATION", "population"),
        Headquarter => ("HEADQUARTER", "headquarter"),
        HeadquarterNepali => ("HEADQUARTER_NEPALI", "headquarter_nepali"),
        MunicipalityCount => ("MUNICIPALITY_COUNT", "municipalities.size"),
        CreatedAt => ("CREATED_AT", "created_at"),
        UpdatedAt => ("UPDATED_AT", "updated_at"),
    }
    default = [Id, ProvinceId, Name, NameNepali, Headquarter, MunicipalityCount];
    summary = [Id, Name];
    audit = [CreatedAt, UpdatedAt];
}

crate::sort_fields! {
    pub enum DistrictSortField for DistrictField {
        Name,
        AreaSqKm,
        Population,
        MunicipalityCount,
        CreatedAt,
    }
    default = Name;
}

impl Entity for District {
    type Field = DistrictField;

    const TABLE: &'static str = "districts";
    const SELECT_COLUMNS: &'static str = "t.*, (SELECT COUNT(*) FROM \"municipalities\" c WHERE c.\"district_id\" = t.\"id\") AS \"municipality_count\"";
    const COLLECTIONS: &'static [Collection] = &[Collection {
        name: "municipalities",
        table: "municipalities",
        foreign_key: "district_id",
        value_column: None,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn get(&self, field: DistrictField) -> Option<FieldValue> {
        match field {
            DistrictField::Id => Some(self.id.into()),
            DistrictField::ProvinceId => Some(self.province_id.into()),
            DistrictField::Name => Some(self.name.as_str().into()),
            DistrictField::NameNepali => text(&self.name_nepali),
            DistrictField::AreaSqKm => opt(&self.area_sq_km),
            DistrictField::Population => opt(&self.population),
            DistrictField::Headquarter => text(&self.headquarter),
            DistrictField::HeadquarterNepali => text(&self.headquarter_nepali),
            DistrictField::MunicipalityCount => Some(self.municipality_count.into()),
            DistrictField::CreatedAt => Some(self.created_at.into()),
            DistrictField::UpdatedAt => Some(self.updated_at.into()),
        }
    }
}

impl<'r> FromRow<'r, PgRow> for District {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            province_id: row.try_get("province_id")?,
            name: row.try_get("name")?,
            name_nepali: row.try_get("name_nepali")?,
            area_sq_km: row.try_get("area_sq_km")?,
            population: row.try_get("population")?,
            headquarter: row.try_get("headquarter")?,
            headquarter_nepali: row.try_get("headquarter_nepali")?,
            municipality_count: row.try_get("municipality_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
