//! Sparse, field-selected views of entities for serialization.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::database::models::Entity;
use crate::field::{EntityField, UnknownFieldError};
use crate::types::FieldValue;

/// Ordered wire-name → value pairs. Absent attributes are never present, so
/// the JSON form has no `null` members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityProjection {
    entries: Vec<(String, FieldValue)>,
}

impl EntityProjection {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for EntityProjection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Reads each requested field off the entity in order, skipping absent ones.
pub fn project<E: Entity>(entity: &E, fields: &[E::Field]) -> EntityProjection {
    let mut entries = Vec::with_capacity(fields.len());
    for field in fields {
        let key = field.to_json_field_name();
        if entries.iter().any(|(k, _): &(String, FieldValue)| *k == key) {
            continue;
        }
        if let Some(value) = entity.get(*field) {
            entries.push((key, value));
        }
    }
    EntityProjection { entries }
}

/// Resolves every name first; an unknown name fails before the entity is read.
pub fn project_named<E: Entity, S: AsRef<str>>(entity: &E, names: &[S]) -> Result<EntityProjection, UnknownFieldError> {
    let fields = E::Field::resolve_all(names)?;
    Ok(project(entity, &fields))
}
