use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::filter::GeoPoint;

/// Every structural violation found in a criteria object, keyed by the wire
/// name of the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub struct ValidationErrors {
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed")?;
        for (index, (field, message)) in self.field_errors.iter().enumerate() {
            let sep = if index == 0 { ": " } else { "; " };
            write!(f, "{}{}: {}", sep, field, message)?;
        }
        Ok(())
    }
}

/// Accumulates violations; the first message recorded for a field wins.
#[derive(Debug, Default)]
pub struct Violations {
    errors: BTreeMap<String, String>,
}

impl Violations {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Both bounds present requires `from <= to`.
    pub fn range<T: PartialOrd>(&mut self, from_name: &str, from: Option<T>, to_name: &str, to: Option<T>) {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                self.add(from_name, format!("{} must be less than or equal to {}", from_name, to_name));
            }
        }
    }

    /// At most one of two overlapping filter modes may be set.
    pub fn exclusive(&mut self, name: &str, is_set: bool, other_name: &str, other_set: bool) {
        if is_set && other_set {
            self.add(name, format!("{} cannot be combined with {}", name, other_name));
        }
    }

    pub fn at_least<T: PartialOrd + fmt::Display + Copy>(&mut self, field: &str, value: Option<T>, min: T) {
        if let Some(value) = value {
            if value < min {
                self.add(field, format!("{} must be at least {}", field, min));
            }
        }
    }

    pub fn between<T: PartialOrd + fmt::Display + Copy>(&mut self, field: &str, value: Option<T>, min: T, max: T) {
        if let Some(value) = value {
            if value < min || value > max {
                self.add(field, format!("{} must be between {} and {}", field, min, max));
            }
        }
    }

    pub fn max_chars(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.add(field, format!("{} must be at most {} characters", field, max));
            }
        }
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { field_errors: self.errors })
        }
    }
}

pub const MAX_SEARCH_TERM_CHARS: usize = 100;
pub const MAX_RADIUS_KM: f64 = 500.0;

/// Geographic point-and-radius filter shared by the located entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFilter {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
}

impl GeoFilter {
    pub fn check(&self, violations: &mut Violations) {
        violations.between("latitude", self.latitude, -90.0, 90.0);
        violations.between("longitude", self.longitude, -180.0, 180.0);

        match (self.latitude, self.longitude) {
            (Some(_), None) => violations.add("longitude", "longitude is required when latitude is given"),
            (None, Some(_)) => violations.add("latitude", "latitude is required when longitude is given"),
            _ => {}
        }

        let has_point = self.latitude.is_some() || self.longitude.is_some();
        match self.radius_km {
            None if has_point => violations.add("radiusKm", "radiusKm is required for a geographic search"),
            Some(_) if !has_point => violations.add("radiusKm", "radiusKm requires latitude and longitude"),
            Some(radius) if radius <= 0.0 || radius > MAX_RADIUS_KM => {
                violations.add("radiusKm", format!("radiusKm must be greater than 0 and at most {}", MAX_RADIUS_KM))
            }
            _ => {}
        }
    }

    /// Center and radius, once both coordinates and the radius are present.
    pub fn circle(&self) -> Option<(GeoPoint, f64)> {
        Some((
            GeoPoint { latitude: self.latitude?, longitude: self.longitude? },
            self.radius_km?,
        ))
    }
}
