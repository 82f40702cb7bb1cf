//! Selectable / sortable attribute enumerations.
//!
//! Every entity declares a field enum with [`entity_fields!`]. Each variant has
//! a canonical constant name (`WARD_NUMBER`), a storage path (`ward_number`,
//! or dotted for derived values such as `districts.size`) and a wire name
//! derived from the constant name (`wardNumber`).

use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown field: '{token}'")]
pub struct UnknownFieldError {
    pub token: String,
}

impl UnknownFieldError {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

pub trait EntityField: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    const ALL: &'static [Self];
    const DEFAULT_FIELDS: &'static [Self];
    const SUMMARY_FIELDS: &'static [Self];
    const AUDIT_FIELDS: &'static [Self];

    /// Canonical upper-snake name, e.g. `WARD_NUMBER`.
    fn constant_name(&self) -> &'static str;

    /// Storage attribute path, e.g. `ward_number` or `municipalities.size`.
    fn field_name(&self) -> &'static str;

    fn detail_fields() -> &'static [Self] {
        Self::ALL
    }

    fn to_json_field_name(&self) -> String {
        to_json_field_name(self.constant_name())
    }

    /// Upper-cases the token and matches it exactly against the constant names.
    fn from_string(token: &str) -> Result<Self, UnknownFieldError> {
        let upper = token.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.constant_name() == upper)
            .ok_or_else(|| UnknownFieldError::new(token))
    }

    /// Accepts either a constant name (any case) or a camelCase wire name.
    fn parse(token: &str) -> Result<Self, UnknownFieldError> {
        Self::from_string(token)
            .or_else(|_| Self::from_string(&to_constant_name(token.trim())))
            .map_err(|_| UnknownFieldError::new(token))
    }

    /// Resolves every token before returning, so one bad name fails the lot.
    fn resolve_all<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Self>, UnknownFieldError> {
        let mut fields = Vec::with_capacity(tokens.len());
        for token in tokens {
            let field = Self::parse(token.as_ref())?;
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        Ok(fields)
    }
}

/// Sortable subset of an entity's fields.
pub trait SortField: Copy + Eq + Debug + Send + Sync + 'static {
    type Field: EntityField;

    const ALL: &'static [Self];

    fn to_entity_field(&self) -> Self::Field;
}

/// `WARD_NUMBER` -> `wardNumber`
pub fn to_json_field_name(constant: &str) -> String {
    let mut out = String::with_capacity(constant.len());
    for (index, segment) in constant.split('_').filter(|s| !s.is_empty()).enumerate() {
        let lower = segment.to_ascii_lowercase();
        if index == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// `wardNumber` -> `WARD_NUMBER`
pub fn to_constant_name(wire: &str) -> String {
    let mut out = String::with_capacity(wire.len() + 4);
    for (index, c) in wire.chars().enumerate() {
        if c.is_ascii_uppercase() && index > 0 {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// Declares an entity field enum together with its `EntityField`, `Display`,
/// `FromStr` and serde implementations. Serialized form is the wire name.
#[macro_export]
macro_rules! entity_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => ($constant:literal, $path:literal) ),+ $(,)?
        }
        default = [$($default:ident),* $(,)?];
        summary = [$($summary:ident),* $(,)?];
        audit = [$($audit:ident),* $(,)?];
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::field::EntityField for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const DEFAULT_FIELDS: &'static [Self] = &[$(Self::$default),*];
            const SUMMARY_FIELDS: &'static [Self] = &[$(Self::$summary),*];
            const AUDIT_FIELDS: &'static [Self] = &[$(Self::$audit),*];

            fn constant_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $constant),+
                }
            }

            fn field_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $path),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&$crate::field::EntityField::to_json_field_name(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::field::UnknownFieldError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as $crate::field::EntityField>::parse(s)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&$crate::field::EntityField::to_json_field_name(self))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let token = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                <Self as $crate::field::EntityField>::parse(&token).map_err(::serde::de::Error::custom)
            }
        }
    };
}

/// Declares the sortable subset of a field enum. Variant names must match the
/// field enum's variants.
#[macro_export]
macro_rules! sort_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident for $field:ident {
            $($variant:ident),+ $(,)?
        }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::field::SortField for $name {
            type Field = $field;

            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn to_entity_field(&self) -> $field {
                match self {
                    $(Self::$variant => $field::$variant),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let field = $crate::field::SortField::to_entity_field(self);
                serializer.serialize_str(&$crate::field::EntityField::to_json_field_name(&field))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let token = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                let field = <$field as $crate::field::EntityField>::parse(&token)
                    .map_err(::serde::de::Error::custom)?;
                <Self as $crate::field::SortField>::ALL
                    .iter()
                    .copied()
                    .find(|candidate| $crate::field::SortField::to_entity_field(candidate) == field)
                    .ok_or_else(|| ::serde::de::Error::custom(format!("Field '{}' is not sortable", token)))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::entity_fields! {
        enum SampleField {
            Id => ("ID", "id"),
            WardNumber => ("WARD_NUMBER", "ward_number"),
            UserId => ("USER_ID", "user_id"),
            DistrictCount => ("DISTRICT_COUNT", "districts.size"),
        }
        default = [Id, WardNumber];
        summary = [Id];
        audit = [];
    }

    crate::sort_fields! {
        enum SampleSort for SampleField {
            WardNumber,
            DistrictCount,
        }
        default = WardNumber;
    }

    #[test]
    fn derives_wire_names() {
        assert_eq!(SampleField::WardNumber.to_json_field_name(), "wardNumber");
        assert_eq!(SampleField::UserId.to_json_field_name(), "userId");
        assert_eq!(SampleField::Id.to_json_field_name(), "id");
        assert_eq!(SampleField::DistrictCount.field_name(), "districts.size");
    }

    #[test]
    fn wire_name_round_trips_through_from_string() {
        for field in SampleField::ALL {
            let wire = field.to_json_field_name();
            assert_eq!(SampleField::from_string(&to_constant_name(&wire)), Ok(*field));
            assert_eq!(field.to_json_field_name(), wire);
        }
    }

    fn assert_names_round_trip<F: EntityField>() {
        for field in F::ALL {
            let wire = field.to_json_field_name();
            assert_eq!(F::from_string(field.constant_name()), Ok(*field), "{:?}", field);
            assert_eq!(F::from_string(&to_constant_name(&wire)), Ok(*field), "{}", wire);
            assert_eq!(F::parse(&wire), Ok(*field), "{}", wire);
        }
        for set in [F::DEFAULT_FIELDS, F::SUMMARY_FIELDS, F::AUDIT_FIELDS] {
            assert!(set.iter().all(|field| F::ALL.contains(field)));
        }
    }

    #[test]
    fn entity_field_names_round_trip() {
        use crate::database::models::{DistrictField, FamilyField, MunicipalityField, ProvinceField, UserField, WardField};

        assert_names_round_trip::<UserField>();
        assert_names_round_trip::<FamilyField>();
        assert_names_round_trip::<ProvinceField>();
        assert_names_round_trip::<DistrictField>();
        assert_names_round_trip::<MunicipalityField>();
        assert_names_round_trip::<WardField>();
    }

    #[test]
    fn from_string_is_case_insensitive_on_input() {
        assert_eq!(SampleField::from_string("ward_number"), Ok(SampleField::WardNumber));
        assert_eq!(SampleField::from_string("Ward_Number"), Ok(SampleField::WardNumber));
        assert_eq!(SampleField::from_string("wardnumber"), Err(UnknownFieldError::new("wardnumber")));
    }

    #[test]
    fn parse_accepts_wire_names() {
        assert_eq!(SampleField::parse("wardNumber"), Ok(SampleField::WardNumber));
        let err = SampleField::parse("shoeSize").unwrap_err();
        assert_eq!(err.to_string(), "Unknown field: 'shoeSize'");
    }

    #[test]
    fn resolve_all_fails_on_any_unknown_token() {
        assert_eq!(
            SampleField::resolve_all(&["id", "wardNumber", "id"]),
            Ok(vec![SampleField::Id, SampleField::WardNumber])
        );
        assert!(SampleField::resolve_all(&["id", "nope"]).is_err());
    }

    #[test]
    fn detail_fields_are_all_variants() {
        assert_eq!(SampleField::detail_fields().len(), 4);
        assert_eq!(SampleField::DEFAULT_FIELDS, &[SampleField::Id, SampleField::WardNumber]);
    }

    #[test]
    fn sort_field_rejects_unsortable_fields() {
        let ok: SampleSort = serde_json::from_str("\"districtCount\"").unwrap();
        assert_eq!(ok.to_entity_field(), SampleField::DistrictCount);
        let err = serde_json::from_str::<SampleSort>("\"userId\"").unwrap_err();
        assert!(err.to_string().contains("not sortable"));
        assert!(serde_json::from_str::<SampleSort>("\"bogus\"").is_err());
    }
}
