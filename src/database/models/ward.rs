use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use super::{opt, text, Entity};
use crate::types::FieldValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    pub id: Uuid,
    pub municipality_id: Uuid,
    pub ward_number: i32,
    pub area_sq_km: Option<f64>,
    pub population: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub office_address: Option<String>,
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

crate::entity_fields! {
    pub enum WardField {
        Id => ("ID", "id"),
        MunicipalityId => ("MUNICIPALITY_ID", "municipality_id"),
        WardNumber => ("WARD_NUMBER", "ward_number"),
        AreaSqKm => ("AREA_SQ_KM", "area_sq_km"),
        Population => ("POPULATION", "population"),
        Latitude => ("LATITUDE", "latitude"),
        Longitude => ("LONGITUDE", "longitude"),
        OfficeAddress => ("OFFICE_ADDRESS", "office_address"),
        ContactNumber => ("CONTACT_NUMBER", "contact_number"),
        CreatedAt => ("CREATED_AT", "created_at"),
        UpdatedAt => ("UPDATED_AT", "updated_at"),
    }
    default = [Id, MunicipalityId, WardNumber, Population, OfficeAddress];
    summary = [Id, WardNumber];
    audit = [CreatedAt, UpdatedAt];
}

crate::sort_fields! {
    pub enum WardSortField for WardField {
        WardNumber,
        Population,
        AreaSqKm,
        CreatedAt,
    }
    default = WardNumber;
}

impl Entity for Ward {
    type Field = WardField;

    const TABLE: &'static str = "wards";
    const SELECT_COLUMNS: &'static str = "t.*";

    fn id(&self) -> Uuid {
        self.id
    }

    fn get(&self, field: WardField) -> Option<FieldValue> {
        match field {
            WardField::Id => Some(self.id.into()),
            WardField::MunicipalityId => Some(self.municipality_id.into()),
            WardField::WardNumber => Some(self.ward_number.into()),
            WardField::AreaSqKm => opt(&self.area_sq_km),
            WardField::Population => opt(&self.population),
            WardField::Latitude => opt(&self.latitude),
            WardField::Longitude => opt(&self.longitude),
            WardField::OfficeAddress => text(&self.office_address),
            WardField::ContactNumber => text(&self.contact_number),
            WardField::CreatedAt => Some(self.created_at.into()),
            WardField::UpdatedAt => Some(self.updated_at.into()),
        }
    }
}

impl<'r> FromRow<'r, PgRow> for Ward {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            municipality_id: row.try_get("municipality_id")?,
            ward_number: row.try_get("ward_number")?,
            area_sq_km: row.try_get("area_sq_km")?,
            population: row.try_get("population")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            office_address: row.try_get("office_address")?,
            contact_number: row.try_get("contact_number")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
