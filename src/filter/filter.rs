use std::marker::PhantomData;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Specification, SqlResult};
use crate::database::models::{Collection, Entity};
use crate::types::PageRequest;

/// Lowers a specification plus paging into SELECT and COUNT statements for
/// one entity table.
pub struct Filter<'a, E: Entity> {
    spec: &'a Specification<E::Field>,
    page: Option<&'a PageRequest<E::Field>>,
    _entity: PhantomData<E>,
}

impl<'a, E: Entity> Filter<'a, E> {
    pub fn new(spec: &'a Specification<E::Field>) -> Result<Self, FilterError> {
        validate_table_name(E::TABLE)?;
        Ok(Self { spec, page: None, _entity: PhantomData })
    }

    pub fn page(mut self, page: &'a PageRequest<E::Field>) -> Result<Self, FilterError> {
        if page.page_size == 0 {
            return Err(FilterError::InvalidLimit("Page size must be positive".to_string()));
        }
        self.page = Some(page);
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params, joins) = FilterWhere::<E>::generate(&self.spec.predicate, 0)?;
        let distinct = self.spec.distinct || !joins.is_empty();

        let (order_clause, limit_clause) = match self.page {
            Some(page) => (
                FilterOrder::generate::<E>(page.sort_field, page.sort_direction)?,
                format!("LIMIT {} OFFSET {}", page.page_size, page.offset()),
            ),
            None => (String::new(), String::new()),
        };

        let query = if distinct {
            [
                format!("SELECT {} FROM \"{}\" t", E::SELECT_COLUMNS, E::TABLE),
                format!(
                    "WHERE t.\"id\" IN (SELECT DISTINCT t.\"id\" FROM \"{}\" t{} WHERE {})",
                    E::TABLE,
                    join_clause(&joins),
                    where_clause
                ),
                order_clause,
                limit_clause,
            ]
        } else {
            [
                format!("SELECT {} FROM \"{}\" t", E::SELECT_COLUMNS, E::TABLE),
                format!("WHERE {}", where_clause),
                order_clause,
                limit_clause,
            ]
        }
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params, joins) = FilterWhere::<E>::generate(&self.spec.predicate, 0)?;
        let query = if self.spec.distinct || !joins.is_empty() {
            format!(
                "SELECT COUNT(DISTINCT t.\"id\") AS count FROM \"{}\" t{} WHERE {}",
                E::TABLE,
                join_clause(&joins),
                where_clause
            )
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" t WHERE {}", E::TABLE, where_clause)
        };
        Ok(SqlResult { query, params })
    }
}

fn join_clause(joins: &[&'static Collection]) -> String {
    joins
        .iter()
        .map(|c| {
            format!(
                " LEFT JOIN \"{}\" \"{}\" ON \"{}\".\"{}\" = t.\"id\"",
                c.table, c.name, c.name, c.foreign_key
            )
        })
        .collect()
}

fn validate_table_name(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
    }
    Ok(())
}
