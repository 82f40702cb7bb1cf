use serde::{Deserialize, Serialize};

use crate::types::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    /// Case-insensitive substring match
    Contains,
    /// Membership in a list of values; on a collection field, any element matches
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition<F> {
    pub field: F,
    pub operator: FilterOp,
    pub data: FieldValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Boolean predicate tree over an entity's fields.
///
/// `Always` is the neutral element: it constrains nothing and vanishes when
/// combined with `and`.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<F> {
    Always,
    And(Vec<Predicate<F>>),
    Or(Vec<Predicate<F>>),
    Leaf(Condition<F>),
    WithinRadius {
        latitude: F,
        longitude: F,
        center: GeoPoint,
        radius_km: f64,
    },
}

impl<F> Predicate<F> {
    pub fn leaf(field: F, operator: FilterOp, data: impl Into<FieldValue>) -> Self {
        Predicate::Leaf(Condition { field, operator, data: data.into() })
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::Always)
    }

    pub fn and(self, other: Predicate<F>) -> Predicate<F> {
        match (self, other) {
            (Predicate::Always, p) | (p, Predicate::Always) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), p) => {
                left.push(p);
                Predicate::And(left)
            }
            (p, Predicate::And(mut right)) => {
                right.insert(0, p);
                Predicate::And(right)
            }
            (a, b) => Predicate::And(vec![a, b]),
        }
    }

    /// Disjunction of the given predicates. An `Always` member makes the whole
    /// disjunction `Always`; an empty input is also `Always`.
    pub fn any(mut predicates: Vec<Predicate<F>>) -> Predicate<F> {
        if predicates.is_empty() || predicates.iter().any(Predicate::is_always) {
            return Predicate::Always;
        }
        if predicates.len() == 1 {
            return predicates.remove(0);
        }
        Predicate::Or(predicates)
    }
}

/// A built query constraint: the predicate tree plus whether the query must
/// yield distinct top-level rows because it traverses a to-many association.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification<F> {
    pub predicate: Predicate<F>,
    pub distinct: bool,
}

impl<F> Specification<F> {
    pub fn all() -> Self {
        Self { predicate: Predicate::Always, distinct: false }
    }

    pub fn from_predicate(predicate: Predicate<F>) -> Self {
        Self { predicate, distinct: false }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        self.predicate.is_always()
    }

    pub fn and(self, other: Specification<F>) -> Self {
        Self {
            predicate: self.predicate.and(other.predicate),
            distinct: self.distinct || other.distinct,
        }
    }
}

impl<F> Default for Specification<F> {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FieldValue>,
}
