use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use super::{opt, text, Collection, Entity};
use crate::types::FieldValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Province {
    pub id: Uuid,
    pub name: String,
    pub name_nepali: Option<String>,
    pub area_sq_km: Option<f64>,
    pub population: Option<i64>,
    pub headquarter: Option<String>,
    pub headquarter_nepali: Option<String>,
    pub district_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

crate::entity_fields! {
    pub enum ProvinceField {
        Id => ("ID", "id"),
        Name => ("NAME", "name"),
        NameNepali => ("NAME_NEPALI", "name_nepali"),
        AreaSqKm => ("AREA_SQ_KM", "area_sq_km"),
        Population => ("POPULATION", "population"),
        Headquarter => ("HEADQUARTER", "headquarter"),
        HeadquarterNepali => ("HEADQUARTER_NEPALI", "headquarter_nepali"),
        DistrictCount => ("DISTRICT_COUNT", "districts.size"),
        CreatedAt => ("CREATED_AT", "created_at"),
        UpdatedAt => ("UPDATED_AT", "updated_at"),
    }
    default = [Id, Name, NameNepali, Headquarter, DistrictCount];
    summary = [Id, Name];
    audit = [CreatedAt, UpdatedAt];
}

crate::sort_fields! {
    pub enum ProvinceSortField for ProvinceField {
        Name,
        AreaSqKm,
        Population,
        DistrictCount,
        CreatedAt,
    }
    default = Name;
}

impl Entity for Province {
    type Field = ProvinceField;

    const TABLE: &'static str = "provinces";
    const SELECT_COLUMNS: &'static str = "t.*, (SELECT COUNT(*) FROM \"districts\" c WHERE c.\"province_id\" = t.\"id\") AS \"district_count\"";
    const COLLECTIONS: &'static [Collection] = &[Collection {
        name: "districts",
        table: "districts",
        foreign_key: "province_id",
        value_column: None,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn get(&self, field: ProvinceField) -> Option<FieldValue> {
        match field {
            ProvinceField::Id => Some(self.id.into()),
            ProvinceField::Name => Some(self.name.as_str().into()),
            ProvinceField::NameNepali => text(&self.name_nepali),
            ProvinceField::AreaSqKm => opt(&self.area_sq_km),
            ProvinceField::Population => opt(&self.population),
            ProvinceField::Headquarter => text(&self.headquarter),
            ProvinceField::HeadquarterNepali => text(&self.headquarter_nepali),
            ProvinceField::DistrictCount => Some(self.district_count.into()),
            ProvinceField::CreatedAt => Some(self.created_at.into()),
            ProvinceField::UpdatedAt => Some(self.updated_at.into()),
        }
    }
}

impl<'r> FromRow<'r, PgRow> for Province {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            name_nepali: row.try_get("name_nepali")?,
            area_sq_km: row.try_get("area_sq_km")?,
            population: row.try_get("population")?,
            headquarter: row.try_get("headquarter")?,
            headquarter_nepali: row.try_get("headquarter_nepali")?,
            district_count: row.try_get("district_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
