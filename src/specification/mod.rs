//! Specification builder.
//!
//! Each helper covers one logical filter group and returns the neutral
//! specification when its inputs are absent; `all_of` folds the groups with
//! AND, so criteria with no filters at all match every row.

use std::collections::BTreeSet;

use crate::filter::{FilterOp, GeoPoint, Predicate, Specification};
use crate::types::FieldValue;

pub mod family;
pub mod geography;
pub mod user;

pub fn equal<F, T: Into<FieldValue>>(field: F, value: Option<T>) -> Specification<F> {
    match value {
        Some(value) => Specification::from_predicate(Predicate::leaf(field, FilterOp::Eq, value)),
        None => Specification::all(),
    }
}

/// Applies only the bounds actually supplied; both inclusive.
pub fn range<F: Copy, T: Into<FieldValue>>(field: F, from: Option<T>, to: Option<T>) -> Specification<F> {
    let mut predicate = Predicate::Always;
    if let Some(from) = from {
        predicate = predicate.and(Predicate::leaf(field, FilterOp::Gte, from));
    }
    if let Some(to) = to {
        predicate = predicate.and(Predicate::leaf(field, FilterOp::Lte, to));
    }
    Specification::from_predicate(predicate)
}

/// Case-insensitive substring match OR-ed across the given text fields.
pub fn search_term<F: Copy>(term: Option<&str>, fields: &[F]) -> Specification<F> {
    match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => Specification::from_predicate(Predicate::any(
            fields
                .iter()
                .map(|field| Predicate::leaf(*field, FilterOp::Contains, term))
                .collect(),
        )),
        None => Specification::all(),
    }
}

/// Membership in a set of scalar values. An empty set is no constraint.
pub fn one_of<F, T>(field: F, values: &BTreeSet<T>) -> Specification<F>
where
    T: Clone + Into<FieldValue>,
{
    if values.is_empty() {
        return Specification::all();
    }
    let values: Vec<FieldValue> = values.iter().cloned().map(Into::into).collect();
    Specification::from_predicate(Predicate::leaf(field, FilterOp::In, values))
}

/// Membership over a one-to-many association; marks the query distinct so
/// an entity matching several values is returned once.
pub fn member_of<F, T>(field: F, values: &BTreeSet<T>) -> Specification<F>
where
    T: Clone + Into<FieldValue>,
{
    if values.is_empty() {
        return Specification::all();
    }
    one_of(field, values).distinct()
}

pub fn within_radius<F>(latitude: F, longitude: F, circle: Option<(GeoPoint, f64)>) -> Specification<F> {
    match circle {
        Some((center, radius_km)) => Specification::from_predicate(Predicate::WithinRadius {
            latitude,
            longitude,
            center,
            radius_km,
        }),
        None => Specification::all(),
    }
}

pub fn all_of<F>(parts: impl IntoIterator<Item = Specification<F>>) -> Specification<F> {
    parts.into_iter().fold(Specification::all(), Specification::and)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum F {
        Name,
        Email,
        Ward,
        Role,
    }

    #[test]
    fn absent_inputs_are_neutral() {
        let spec = all_of([
            equal::<F, i32>(F::Ward, None),
            range::<F, i32>(F::Ward, None, None),
            search_term(None, &[F::Name, F::Email]),
            search_term(Some("  "), &[F::Name]),
            member_of::<F, String>(F::Role, &BTreeSet::new()),
            within_radius(F::Ward, F::Ward, None),
        ]);
        assert!(spec.is_unconstrained());
        assert!(!spec.distinct);
    }

    #[test]
    fn half_open_range_has_one_bound() {
        let spec = range(F::Ward, Some(3), None);
        assert_eq!(spec.predicate, Predicate::leaf(F::Ward, FilterOp::Gte, 3));
    }

    #[test]
    fn search_term_ors_across_fields() {
        let spec = search_term(Some("john"), &[F::Name, F::Email]);
        assert_eq!(
            spec.predicate,
            Predicate::Or(vec![
                Predicate::leaf(F::Name, FilterOp::Contains, "john"),
                Predicate::leaf(F::Email, FilterOp::Contains, "john"),
            ])
        );
    }

    #[test]
    fn membership_over_association_is_distinct() {
        let roles: BTreeSet<&str> = ["EDITOR", "VIEWER"].into_iter().collect();
        let spec = member_of(F::Role, &roles);
        assert!(spec.distinct);
        assert!(!one_of(F::Role, &roles).distinct);
    }

    #[test]
    fn groups_fold_with_and() {
        let spec = all_of([equal(F::Ward, Some(2)), search_term(Some("x"), &[F::Name])]);
        assert!(matches!(spec.predicate, Predicate::And(ref parts) if parts.len() == 2));
    }
}
