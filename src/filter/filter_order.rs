use super::error::FilterError;
use super::filter_where::ColumnExpr;
use super::types::SortDirection;
use crate::database::models::Entity;
use crate::field::EntityField;

pub struct FilterOrder;

impl FilterOrder {
    /// Builds the ORDER BY clause for one sort key. Nulls sort last in both
    /// directions and `t."id"` breaks ties so paging is stable.
    pub fn generate<E: Entity>(field: E::Field, direction: SortDirection) -> Result<String, FilterError> {
        let column = match ColumnExpr::resolve::<E>(field.field_name())? {
            ColumnExpr::Joined { .. } => {
                return Err(FilterError::InvalidColumn(format!(
                    "Cannot sort on collection field: {}",
                    field.to_json_field_name()
                )))
            }
            expr => expr.sql().to_string(),
        };

        let mut parts = vec![format!("{} {} NULLS LAST", column, direction.to_sql())];
        if field.field_name() != "id" {
            parts.push(format!("t.\"id\" {}", direction.to_sql()));
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{District, DistrictField, User, UserField};

    #[test]
    fn orders_with_nulls_last_and_id_tiebreak() {
        let clause = FilterOrder::generate::<User>(UserField::FullName, SortDirection::Desc).unwrap();
        assert_eq!(clause, "ORDER BY t.\"full_name\" DESC NULLS LAST, t.\"id\" DESC");
    }

    #[test]
    fn orders_by_derived_count() {
        let clause = FilterOrder::generate::<District>(DistrictField::MunicipalityCount, SortDirection::Asc).unwrap();
        assert!(clause.starts_with("ORDER BY (SELECT COUNT(*) FROM \"municipalities\""));
    }

    #[test]
    fn rejects_collection_sort() {
        assert!(FilterOrder::generate::<User>(UserField::Roles, SortDirection::Asc).is_err());
    }
}
