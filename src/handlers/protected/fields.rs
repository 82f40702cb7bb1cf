// handlers/protected/fields.rs - GET /api/{entity}/fields handler

use serde::Serialize;

use crate::app::Searchable;
use crate::database::Entity;
use crate::field::EntityField;
use crate::middleware::ApiResponse;

/// Selectable field sets of one entity, as wire names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCatalogue {
    pub entity: &'static str,
    pub default: Vec<String>,
    pub summary: Vec<String>,
    pub detail: Vec<String>,
    pub audit: Vec<String>,
}

impl FieldCatalogue {
    pub fn of<E: Entity>(entity: &'static str) -> Self {
        fn names<F: EntityField>(fields: &[F]) -> Vec<String> {
            fields.iter().map(|field| field.to_json_field_name()).collect()
        }

        Self {
            entity,
            default: names(<E::Field as EntityField>::DEFAULT_FIELDS),
            summary: names(<E::Field as EntityField>::SUMMARY_FIELDS),
            detail: names(<E::Field as EntityField>::detail_fields()),
            audit: names(<E::Field as EntityField>::AUDIT_FIELDS),
        }
    }
}

pub async fn fields_get<E: Searchable>() -> ApiResponse<FieldCatalogue> {
    ApiResponse::success(FieldCatalogue::of::<E>(E::PATH))
}
