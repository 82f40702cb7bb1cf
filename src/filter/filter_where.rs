use std::marker::PhantomData;

use super::error::FilterError;
use super::types::{Condition, FilterOp, GeoPoint, Predicate};
use crate::database::models::{Collection, Entity};
use crate::field::EntityField;
use crate::types::FieldValue;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// SQL expression an entity field path lowers to
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnExpr {
    /// Plain column on the entity table
    Column(String),
    /// Value column of a joined to-many association
    Joined { sql: String, collection: &'static Collection },
    /// Correlated `COUNT(*)` over a to-many association
    Count(String),
}

impl ColumnExpr {
    pub fn sql(&self) -> &str {
        match self {
            ColumnExpr::Column(sql) | ColumnExpr::Count(sql) => sql,
            ColumnExpr::Joined { sql, .. } => sql,
        }
    }

    /// Resolves a storage path (`ward_number`, `roles`, `districts.size`)
    /// against the entity's table aliased as `t`.
    pub fn resolve<E: Entity>(path: &str) -> Result<Self, FilterError> {
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or_default();
        let tail = segments.next();
        if segments.next().is_some() {
            return Err(FilterError::InvalidColumn(format!("Path nested too deep: {}", path)));
        }
        validate_identifier(head)?;

        match (E::collection(head), tail) {
            (Some(collection), Some("size")) => Ok(ColumnExpr::Count(format!(
                "(SELECT COUNT(*) FROM \"{}\" c WHERE c.\"{}\" = t.\"id\")",
                collection.table, collection.foreign_key
            ))),
            (Some(collection), None) => match collection.value_column {
                Some(value_column) => Ok(ColumnExpr::Joined {
                    sql: format!("\"{}\".\"{}\"", collection.name, value_column),
                    collection,
                }),
                None => Err(FilterError::InvalidColumn(format!(
                    "Collection '{}' has no value column",
                    head
                ))),
            },
            (None, None) => Ok(ColumnExpr::Column(format!("t.\"{}\"", head))),
            (_, Some(_)) => Err(FilterError::InvalidColumn(format!("Unsupported path: {}", path))),
        }
    }
}

/// Lowers a predicate tree into a parameterised WHERE clause.
pub struct FilterWhere<E: Entity> {
    param_values: Vec<FieldValue>,
    param_index: usize,
    joins: Vec<&'static Collection>,
    _entity: PhantomData<E>,
}

impl<E: Entity> FilterWhere<E> {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            joins: vec![],
            _entity: PhantomData,
        }
    }

    /// Returns the WHERE clause, its parameters and the associations it joins.
    pub fn generate(
        predicate: &Predicate<E::Field>,
        starting_param_index: usize,
    ) -> Result<(String, Vec<FieldValue>, Vec<&'static Collection>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let clause = filter_where.build(predicate)?;
        Ok((clause, filter_where.param_values, filter_where.joins))
    }

    fn build(&mut self, predicate: &Predicate<E::Field>) -> Result<String, FilterError> {
        match predicate {
            Predicate::Always => Ok("1=1".to_string()),
            Predicate::And(parts) => self.build_group(parts, " AND "),
            Predicate::Or(parts) => self.build_group(parts, " OR "),
            Predicate::Leaf(condition) => self.build_condition(condition),
            Predicate::WithinRadius { latitude, longitude, center, radius_km } => {
                self.build_radius(*latitude, *longitude, *center, *radius_km)
            }
        }
    }

    fn build_group(&mut self, parts: &[Predicate<E::Field>], joiner: &str) -> Result<String, FilterError> {
        if parts.is_empty() {
            return Ok("1=1".to_string());
        }
        let mut sql_parts = Vec::with_capacity(parts.len());
        for part in parts {
            sql_parts.push(self.build(part)?);
        }
        Ok(format!("({})", sql_parts.join(joiner)))
    }

    fn build_condition(&mut self, condition: &Condition<E::Field>) -> Result<String, FilterError> {
        let column = self.column(condition.field)?;
        match condition.operator {
            FilterOp::Eq => Ok(format!("{} = {}", column, self.param(condition.data.clone()))),
            FilterOp::Gte => Ok(format!("{} >= {}", column, self.param(condition.data.clone()))),
            FilterOp::Lte => Ok(format!("{} <= {}", column, self.param(condition.data.clone()))),
            FilterOp::Contains => {
                let term = condition.data.as_text().ok_or_else(|| {
                    FilterError::InvalidOperatorData(format!(
                        "Substring match on {} requires text",
                        condition.field.field_name()
                    ))
                })?;
                let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
                Ok(format!("LOWER({}) LIKE {}", column, self.param(FieldValue::Text(pattern))))
            }
            FilterOp::In => match &condition.data {
                FieldValue::List(values) => {
                    if values.is_empty() {
                        return Ok("1=0".to_string());
                    }
                    let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                    Ok(format!("{} IN ({})", column, params.join(", ")))
                }
                single => Ok(format!("{} = {}", column, self.param(single.clone()))),
            },
        }
    }

    fn build_radius(
        &mut self,
        latitude: E::Field,
        longitude: E::Field,
        center: GeoPoint,
        radius_km: f64,
    ) -> Result<String, FilterError> {
        let lat_column = self.column(latitude)?;
        let lng_column = self.column(longitude)?;
        let lat = self.param(FieldValue::Float(center.latitude));
        let lng = self.param(FieldValue::Float(center.longitude));
        let radius = self.param(FieldValue::Float(radius_km));
        Ok(format!(
            "({lat_col} IS NOT NULL AND {lng_col} IS NOT NULL AND \
             {earth:.1} * acos(LEAST(1.0, GREATEST(-1.0, \
             cos(radians({lat})) * cos(radians({lat_col})) * cos(radians({lng_col}) - radians({lng})) \
             + sin(radians({lat})) * sin(radians({lat_col}))))) <= {radius})",
            lat_col = lat_column,
            lng_col = lng_column,
            earth = EARTH_RADIUS_KM,
            lat = lat,
            lng = lng,
            radius = radius,
        ))
    }

    fn column(&mut self, field: E::Field) -> Result<String, FilterError> {
        let expr = ColumnExpr::resolve::<E>(field.field_name())?;
        if let ColumnExpr::Joined { collection, .. } = &expr {
            if !self.joins.iter().any(|c| c.name == collection.name) {
                self.joins.push(collection);
            }
        }
        Ok(expr.sql().to_string())
    }

    fn param(&mut self, value: FieldValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

pub fn validate_identifier(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", name)));
    }
    Ok(())
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
