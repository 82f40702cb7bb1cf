use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use super::{decode_optional_text, decode_text_list, opt, text, Collection, Entity};
use crate::types::FieldValue;

text_enum! {
    pub enum RoleType {
        Superadmin => "SUPERADMIN",
        Admin => "ADMIN",
        Editor => "EDITOR",
        Viewer => "VIEWER",
    }
}

text_enum! {
    pub enum OfficePost {
        ChiefAdministrativeOfficer => "CHIEF_ADMINISTRATIVE_OFFICER",
        WardSecretary => "WARD_SECRETARY",
        InformationOfficer => "INFORMATION_OFFICER",
        ItOfficer => "IT_OFFICER",
        DataEntryOperator => "DATA_ENTRY_OPERATOR",
        Other => "OTHER",
    }
}

/// System user. Accounts start unapproved and gain access once an
/// administrator approves them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub full_name_nepali: Option<String>,
    pub phone_number: Option<String>,
    pub roles: Vec<RoleType>,
    pub office_post: Option<OfficePost>,
    pub ward_number: Option<i32>,
    pub is_approved: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

crate::entity_fields! {
    pub enum UserField {
        Id => ("ID", "id"),
        Email => ("EMAIL", "email"),
        FullName => ("FULL_NAME", "full_name"),
        FullNameNepali => ("FULL_NAME_NEPALI", "full_name_nepali"),
        PhoneNumber => ("PHONE_NUMBER", "phone_number"),
        Roles => ("ROLES", "roles"),
        OfficePost => ("OFFICE_POST", "office_post"),
        WardNumber => ("WARD_NUMBER", "ward_number"),
        IsApproved => ("IS_APPROVED", "is_approved"),
        ApprovedBy => ("APPROVED_BY", "approved_by"),
        ApprovedAt => ("APPROVED_AT", "approved_at"),
        IsActive => ("IS_ACTIVE", "is_active"),
        ProfilePicture => ("PROFILE_PICTURE", "profile_picture"),
        CreatedAt => ("CREATED_AT", "created_at"),
        UpdatedAt => ("UPDATED_AT", "updated_at"),
    }
    default = [Id, Email, FullName, Roles, OfficePost, WardNumber, IsApproved];
    summary = [Id, FullName, Email];
    audit = [CreatedAt, UpdatedAt, ApprovedBy, ApprovedAt];
}

crate::sort_fields! {
    pub enum UserSortField for UserField {
        FullName,
        Email,
        WardNumber,
        CreatedAt,
        ApprovedAt,
    }
    default = CreatedAt;
}

impl Entity for User {
    type Field = UserField;

    const TABLE: &'static str = "users";
    const SELECT_COLUMNS: &'static str = "t.*, ARRAY(SELECT r.\"role\" FROM \"user_roles\" r WHERE r.\"user_id\" = t.\"id\" ORDER BY r.\"role\") AS \"roles\"";
    const COLLECTIONS: &'static [Collection] = &[Collection {
        name: "roles",
        table: "user_roles",
        foreign_key: "user_id",
        value_column: Some("role"),
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn get(&self, field: UserField) -> Option<FieldValue> {
        match field {
            UserField::Id => Some(self.id.into()),
            UserField::Email => Some(self.email.as_str().into()),
            UserField::FullName => Some(self.full_name.as_str().into()),
            UserField::FullNameNepali => text(&self.full_name_nepali),
            UserField::PhoneNumber => text(&self.phone_number),
            UserField::Roles => Some(self.roles.clone().into()),
            UserField::OfficePost => opt(&self.office_post),
            UserField::WardNumber => opt(&self.ward_number),
            UserField::IsApproved => Some(self.is_approved.into()),
            UserField::ApprovedBy => opt(&self.approved_by),
            UserField::ApprovedAt => opt(&self.approved_at),
            UserField::IsActive => Some(self.is_active.into()),
            UserField::ProfilePicture => text(&self.profile_picture),
            UserField::CreatedAt => Some(self.created_at.into()),
            UserField::UpdatedAt => Some(self.updated_at.into()),
        }
    }
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            full_name_nepali: row.try_get("full_name_nepali")?,
            phone_number: row.try_get("phone_number")?,
            roles: decode_text_list(row, "roles")?,
            office_post: decode_optional_text(row, "office_post")?,
            ward_number: row.try_get("ward_number")?,
            is_approved: row.try_get("is_approved")?,
            approved_by: row.try_get("approved_by")?,
            approved_at: row.try_get("approved_at")?,
            is_active: row.try_get("is_active")?,
            profile_picture: row.try_get("profile_picture")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
