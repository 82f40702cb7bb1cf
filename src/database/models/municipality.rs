use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use super::{decode_text, opt, text, Collection, Entity};
use crate::types::FieldValue;

text_enum! {
    pub enum MunicipalityType {
        MetropolitanCity => "METROPOLITAN_CITY",
        SubMetropolitanCity => "SUB_METROPOLITAN_CITY",
        Municipality => "MUNICIPALITY",
        RuralMunicipality => "RURAL_MUNICIPALITY",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Municipality {
    pub id: Uuid,
    pub district_id: Uuid,
    pub name: String,
    pub name_nepali: Option<String>,
    pub municipality_type: MunicipalityType,
    pub area_sq_km: Option<f64>,
    pub population: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub office_address: Option<String>,
    pub website: Option<String>,
    pub total_wards: i32,
    pub ward_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

crate::entity_fields! {
    pub enum MunicipalityField {
        Id => ("ID", "id"),
        DistrictId => ("DISTRICT_ID", "district_id"),
        Name => ("NAME", "name"),
        NameNepali => ("NAME_NEPALI", "name_nepali"),
        Type => ("TYPE", "municipality_type"),
        AreaSqKm => ("AREA_SQ_KM", "area_sq_km"),
        Population => ("POPULATION", "population"),
        Latitude => ("LATITUDE", "latitude"),
        Longitude => ("LONGITUDE", "longitude"),
        OfficeAddress => ("OFFICE_ADDRESS", "office_address"),
        Website => ("WEBSITE", "website"),
        TotalWards => ("TOTAL_WARDS", "total_wards"),
        WardCount => ("WARD_COUNT", "wards.size"),
        CreatedAt => ("CREATED_AT", "created_at"),
        UpdatedAt => ("UPDATED_AT", "updated_at"),
    }
    default = [Id, DistrictId, Name, NameNepali, Type, TotalWards];
    summary = [Id, Name, Type];
    audit = [CreatedAt, UpdatedAt];
}

crate::sort_fields! {
    pub enum MunicipalitySortField for MunicipalityField {
        Name,
        Type,
        AreaSqKm,
        Population,
        TotalWards,
        WardCount,
        CreatedAt,
    }
    default = Name;
}

impl Entity for Municipality {
    type Field = MunicipalityField;

    const TABLE: &'static str = "municipalities";
    const SELECT_COLUMNS: &'static str = "t.*, (SELECT COUNT(*) FROM \"wards\" c WHERE c.\"municipality_id\" = t.\"id\") AS \"ward_count\"";
    const COLLECTIONS: &'static [Collection] = &[Collection {
        name: "wards",
        table: "wards",
        foreign_key: "municipality_id",
        value_column: None,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn get(&self, field: MunicipalityField) -> Option<FieldValue> {
        match field {
            MunicipalityField::Id => Some(self.id.into()),
            MunicipalityField::DistrictId => Some(self.district_id.into()),
            MunicipalityField::Name => Some(self.name.as_str().into()),
            MunicipalityField::NameNepali => text(&self.name_nepali),
            MunicipalityField::Type => Some(self.municipality_type.into()),
            MunicipalityField::AreaSqKm => opt(&self.area_sq_km),
            MunicipalityField::Population => opt(&self.population),
            MunicipalityField::Latitude => opt(&self.latitude),
            MunicipalityField::Longitude => opt(&self.longitude),
            MunicipalityField::OfficeAddress => text(&self.office_address),
            MunicipalityField::Website => text(&self.website),
            MunicipalityField::TotalWards => Some(self.total_wards.into()),
            MunicipalityField::WardCount => Some(self.ward_count.into()),
            MunicipalityField::CreatedAt => Some(self.created_at.into()),
            MunicipalityField::UpdatedAt => Some(self.updated_at.into()),
        }
    }
}

impl<'r> FromRow<'r, PgRow> for Municipality {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            district_id: row.try_get("district_id")?,
            name: row.try_get("name")?,
            name_nepali: row.try_get("name_nepali")?,
            municipality_type: decode_text(row, "municipality_type")?,
            area_sq_km: row.try_get("area_sq_km")?,
            population: row.try_get("population")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            office_address: row.try_get("office_address")?,
            website: row.try_get("website")?,
            total_wards: row.try_get("total_wards")?,
            ward_count: row.try_get("ward_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
