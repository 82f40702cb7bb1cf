//! Persistent entities and their attribute metadata.
//!
//! Field access is an explicit match over each entity's field enum: there is
//! no reflection, and adding a variant without an accessor arm fails to compile.

use std::str::FromStr;

use sqlx::{postgres::PgRow, FromRow, Row};
use thiserror::Error;
use uuid::Uuid;

use crate::field::EntityField;
use crate::types::FieldValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Enum persisted as upper-snake text, serialized the same way on the wire.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ::serde::Serialize, ::serde::Deserialize)]
        $vis enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::database::models::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let upper = s.trim().to_ascii_uppercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == upper)
                    .ok_or_else(|| $crate::database::models::UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }

        impl From<$name> for $crate::types::FieldValue {
            fn from(value: $name) -> Self {
                $crate::types::FieldValue::Text(value.as_str().to_string())
            }
        }
    };
}

pub mod district;
pub mod family;
pub mod municipality;
pub mod province;
pub mod user;
pub mod ward;

pub use district::{District, DistrictField, DistrictSortField};
pub use family::{Family, FamilyField, FamilySortField, HouseOwnership};
pub use municipality::{Municipality, MunicipalityField, MunicipalitySortField, MunicipalityType};
pub use province::{Province, ProvinceField, ProvinceSortField};
pub use user::{OfficePost, RoleType, User, UserField, UserSortField};
pub use ward::{Ward, WardField, WardSortField};

/// A to-many association reachable from an entity's table.
///
/// `value_column` is set for collections of scalars (e.g. a user's roles),
/// which can be filtered on directly; otherwise only the derived `size` of
/// the collection is addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub name: &'static str,
    pub table: &'static str,
    pub foreign_key: &'static str,
    pub value_column: Option<&'static str>,
}

pub trait Entity: Clone + Send + Sync + Unpin + 'static + for<'r> FromRow<'r, PgRow> {
    type Field: EntityField;

    /// Storage table; the lowered query aliases it as `t`.
    const TABLE: &'static str;

    /// Select list, including derived columns for collections.
    const SELECT_COLUMNS: &'static str;

    const COLLECTIONS: &'static [Collection] = &[];

    fn id(&self) -> Uuid;

    /// Resolves one attribute. `None` when the attribute is absent.
    fn get(&self, field: Self::Field) -> Option<FieldValue>;

    fn collection(name: &str) -> Option<&'static Collection> {
        Self::COLLECTIONS.iter().find(|c| c.name == name)
    }
}

pub(crate) fn decode_text<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: UnknownVariant| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn decode_optional_text<T>(row: &PgRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| s.parse())
        .transpose()
        .map_err(|e: UnknownVariant| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

pub(crate) fn decode_text_list<T>(row: &PgRow, column: &str) -> Result<Vec<T>, sqlx::Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: Vec<String> = row.try_get(column)?;
    raw.iter()
        .map(|s| s.parse())
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e: UnknownVariant| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

/// `None` only for a missing column value; blank text is still a value.
pub(crate) fn text(value: &Option<String>) -> Option<FieldValue> {
    value.as_deref().map(FieldValue::from)
}

pub(crate) fn opt<T: Clone + Into<FieldValue>>(value: &Option<T>) -> Option<FieldValue> {
    value.clone().map(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enums_parse_case_insensitively() {
        assert_eq!("editor".parse::<RoleType>(), Ok(RoleType::Editor));
        assert_eq!(RoleType::Editor.as_str(), "EDITOR");
        let err = "janitor".parse::<RoleType>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown RoleType value 'janitor'");
    }

    #[test]
    fn collections_are_looked_up_by_name() {
        assert!(User::collection("roles").is_some());
        assert!(User::collection("wards").is_none());
        assert_eq!(Province::collection("districts").map(|c| c.foreign_key), Some("province_id"));
    }
}
