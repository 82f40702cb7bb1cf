use std::time::{Duration, Instant};

use sqlx::{self, postgres::PgArguments, PgPool, Row};
use tracing::{debug, warn};

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::filter::{Filter, Specification, SqlResult};
use crate::types::{FieldValue, PageRequest};

/// Runs the statements a `Filter` produces for one entity table.
pub struct QueryBuilder<'a, E: Entity> {
    spec: &'a Specification<E::Field>,
    page: Option<&'a PageRequest<E::Field>>,
    log_queries: bool,
    slow_query_threshold: Option<Duration>,
}

impl<'a, E: Entity> QueryBuilder<'a, E> {
    pub fn new(spec: &'a Specification<E::Field>) -> Self {
        Self { spec, page: None, log_queries: false, slow_query_threshold: None }
    }

    pub fn page(mut self, page: &'a PageRequest<E::Field>) -> Self {
        self.page = Some(page);
        self
    }

    pub fn logging(mut self, log_queries: bool, slow_query_threshold: Option<Duration>) -> Self {
        self.log_queries = log_queries;
        self.slow_query_threshold = slow_query_threshold;
        self
    }

    pub async fn select_all(&self, pool: &PgPool) -> Result<Vec<E>, DatabaseError> {
        let mut filter = Filter::<E>::new(self.spec)?;
        if let Some(page) = self.page {
            filter = filter.page(page)?;
        }
        let sql_result = filter.to_sql()?;
        self.log(&sql_result);

        let started = Instant::now();
        let mut q = sqlx::query_as::<_, E>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        self.check_slow(&sql_result, started);
        Ok(rows)
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = Filter::<E>::new(self.spec)?.to_count_sql()?;
        self.log(&sql_result);

        let started = Instant::now();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        self.check_slow(&sql_result, started);
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    fn log(&self, sql_result: &SqlResult) {
        if self.log_queries {
            debug!(table = E::TABLE, params = sql_result.params.len(), "{}", sql_result.query);
        }
    }

    fn check_slow(&self, sql_result: &SqlResult, started: Instant) {
        let elapsed = started.elapsed();
        if let Some(threshold) = self.slow_query_threshold {
            if elapsed > threshold {
                warn!(table = E::TABLE, elapsed_ms = elapsed.as_millis() as u64, "Slow query: {}", sql_result.query);
            }
        }
    }
}

macro_rules! bind_field_value {
    ($q:expr, $v:expr) => {
        match $v {
            FieldValue::Text(s) => $q.bind(s.as_str()),
            FieldValue::Integer(i) => $q.bind(*i),
            FieldValue::Float(f) => $q.bind(*f),
            FieldValue::Boolean(b) => $q.bind(*b),
            FieldValue::Uuid(u) => $q.bind(*u),
            FieldValue::Date(d) => $q.bind(*d),
            FieldValue::DateTime(dt) => $q.bind(*dt),
            // Lists are expanded into individual parameters before binding
            FieldValue::List(items) => $q.bind(
                items.iter().filter_map(|item| item.as_text().map(str::to_string)).collect::<Vec<String>>(),
            ),
        }
    };
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q FieldValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    bind_field_value!(q, v)
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q FieldValue,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    bind_field_value!(q, v)
}
