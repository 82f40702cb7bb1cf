use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use super::{decode_text, opt, text, Entity};
use crate::types::FieldValue;

text_enum! {
    pub enum HouseOwnership {
        Owned => "OWNED",
        Rented => "RENTED",
        Institutional => "INSTITUTIONAL",
        Other => "OTHER",
    }
}

/// Household census record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: Uuid,
    pub head_of_family: String,
    pub head_of_family_nepali: Option<String>,
    pub contact_number: Option<String>,
    pub ward_number: i32,
    pub tole: Option<String>,
    pub total_members: i32,
    pub house_ownership: HouseOwnership,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

crate::entity_fields! {
    pub enum FamilyField {
        Id => ("ID", "id"),
        HeadOfFamily => ("HEAD_OF_FAMILY", "head_of_family"),
        HeadOfFamilyNepali => ("HEAD_OF_FAMILY_NEPALI", "head_of_family_nepali"),
        ContactNumber => ("CONTACT_NUMBER", "contact_number"),
        WardNumber => ("WARD_NUMBER", "ward_number"),
        Tole => ("TOLE", "tole"),
        TotalMembers => ("TOTAL_MEMBERS", "total_members"),
        HouseOwnership => ("HOUSE_OWNERSHIP", "house_ownership"),
        Latitude => ("LATITUDE", "latitude"),
        Longitude => ("LONGITUDE", "longitude"),
        PhotoUrl => ("PHOTO_URL", "photo_url"),
        CreatedBy => ("CREATED_BY", "created_by"),
        CreatedAt => ("CREATED_AT", "created_at"),
        UpdatedAt => ("UPDATED_AT", "updated_at"),
    }
    default = [Id, HeadOfFamily, WardNumber, Tole, TotalMembers, HouseOwnership];
    summary = [Id, HeadOfFamily, WardNumber];
    audit = [CreatedBy, CreatedAt, UpdatedAt];
}

crate::sort_fields! {
    pub enum FamilySortField for FamilyField {
        HeadOfFamily,
        WardNumber,
        TotalMembers,
        CreatedAt,
        UpdatedAt,
    }
    default = CreatedAt;
}

impl Entity for Family {
    type Field = FamilyField;

    const TABLE: &'static str = "families";
    const SELECT_COLUMNS: &'static str = "t.*";

    fn id(&self) -> Uuid {
        self.id
    }

    fn get(&self, field: FamilyField) -> Option<FieldValue> {
        match field {
            FamilyField::Id => Some(self.id.into()),
            FamilyField::HeadOfFamily => Some(self.head_of_family.as_str().into()),
            FamilyField::HeadOfFamilyNepali => text(&self.head_of_family_nepali),
            FamilyField::ContactNumber => text(&self.contact_number),
            FamilyField::WardNumber => Some(self.ward_number.into()),
            FamilyField::Tole => text(&self.tole),
            FamilyField::TotalMembers => Some(self.total_members.into()),
            FamilyField::HouseOwnership => Some(self.house_ownership.into()),
            FamilyField::Latitude => opt(&self.latitude),
            FamilyField::Longitude => opt(&self.longitude),
            FamilyField::PhotoUrl => text(&self.photo_url),
            FamilyField::CreatedBy => opt(&self.created_by),
            FamilyField::CreatedAt => Some(self.created_at.into()),
            FamilyField::UpdatedAt => Some(self.updated_at.into()),
        }
    }
}

impl<'r> FromRow<'r, PgRow> for Family {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            head_of_family: row.try_get("head_of_family")?,
            head_of_family_nepali: row.try_get("head_of_family_nepali")?,
            contact_number: row.try_get("contact_number")?,
            ward_number: row.try_get("ward_number")?,
            tole: row.try_get("tole")?,
            total_members: row.try_get("total_members")?,
            house_ownership: decode_text(row, "house_ownership")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            photo_url: row.try_get("photo_url")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
