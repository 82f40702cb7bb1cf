//! Evaluates predicate trees against loaded entities.
//!
//! Mirrors the SQL lowering so the in-memory store and the database agree:
//! an absent attribute never matches, substring matching ignores case, and a
//! condition on a collection attribute matches when any element does.

use std::cmp::Ordering;

use super::types::{Condition, FilterOp, GeoPoint, Predicate, SortDirection};
use crate::database::models::Entity;
use crate::types::FieldValue;

const EARTH_RADIUS_KM: f64 = 6371.0;

pub fn matches<E: Entity>(entity: &E, predicate: &Predicate<E::Field>) -> bool {
    match predicate {
        Predicate::Always => true,
        Predicate::And(parts) => parts.iter().all(|p| matches(entity, p)),
        Predicate::Or(parts) => parts.iter().any(|p| matches(entity, p)),
        Predicate::Leaf(condition) => matches_condition(entity, condition),
        Predicate::WithinRadius { latitude, longitude, center, radius_km } => {
            let lat = entity.get(*latitude).and_then(|v| v.as_f64());
            let lng = entity.get(*longitude).and_then(|v| v.as_f64());
            match (lat, lng) {
                (Some(lat), Some(lng)) => {
                    haversine_km(*center, GeoPoint { latitude: lat, longitude: lng }) <= *radius_km
                }
                _ => false,
            }
        }
    }
}

fn matches_condition<E: Entity>(entity: &E, condition: &Condition<E::Field>) -> bool {
    match entity.get(condition.field) {
        Some(FieldValue::List(elements)) => elements
            .iter()
            .any(|element| matches_value(element, condition.operator, &condition.data)),
        Some(value) => matches_value(&value, condition.operator, &condition.data),
        None => false,
    }
}

fn matches_value(value: &FieldValue, operator: FilterOp, data: &FieldValue) -> bool {
    match operator {
        FilterOp::Eq => value.compare(data) == Some(Ordering::Equal),
        FilterOp::Gte => matches!(value.compare(data), Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::Lte => matches!(value.compare(data), Some(Ordering::Less | Ordering::Equal)),
        FilterOp::Contains => match (value.as_text(), data.as_text()) {
            (Some(haystack), Some(needle)) => haystack.to_lowercase().contains(&needle.to_lowercase()),
            _ => false,
        },
        FilterOp::In => match data {
            FieldValue::List(candidates) => candidates
                .iter()
                .any(|candidate| value.compare(candidate) == Some(Ordering::Equal)),
            single => value.compare(single) == Some(Ordering::Equal),
        },
    }
}

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().clamp(0.0, 1.0).asin()
}

/// Orders entities the way the SQL adapter does: absent values last in both
/// directions, ties broken by id.
pub fn sort_entities<E: Entity>(items: &mut [E], field: E::Field, direction: SortDirection) {
    items.sort_by(|a, b| {
        let primary = match (a.get(field), b.get(field)) {
            (Some(x), Some(y)) => directed(x.compare(&y).unwrap_or(Ordering::Equal), direction),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        primary.then_with(|| directed(a.id().cmp(&b.id()), direction))
    });
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Family, FamilyField, HouseOwnership, RoleType, User, UserField};
    use chrono::Utc;
    use uuid::Uuid;

    fn user(name: &str, roles: Vec<RoleType>, ward: Option<i32>) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            full_name: name.to_string(),
            full_name_nepali: None,
            phone_number: None,
            roles,
            office_post: None,
            ward_number: ward,
            is_approved: true,
            approved_by: None,
            approved_at: None,
            is_active: true,
            profile_picture: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn family(ward: i32, lat: Option<f64>, lng: Option<f64>) -> Family {
        Family {
            id: Uuid::new_v4(),
            head_of_family: "Ram Bahadur".to_string(),
            head_of_family_nepali: None,
            contact_number: None,
            ward_number: ward,
            tole: None,
            total_members: 4,
            house_ownership: HouseOwnership::Owned,
            latitude: lat,
            longitude: lng,
            photo_url: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn substring_match_ignores_case() {
        let john = user("John Smith", vec![RoleType::Viewer], None);
        let predicate = Predicate::leaf(UserField::FullName, FilterOp::Contains, "john");
        assert!(matches(&john, &predicate));
        let predicate = Predicate::leaf(UserField::FullName, FilterOp::Contains, "JANE");
        assert!(!matches(&john, &predicate));
    }

    #[test]
    fn collection_membership_matches_any_element() {
        let editor = user("A", vec![RoleType::Admin, RoleType::Editor], None);
        let predicate = Predicate::leaf(UserField::Roles, FilterOp::In, vec!["EDITOR", "VIEWER"]);
        assert!(matches(&editor, &predicate));
        let superadmin = user("B", vec![RoleType::Superadmin], None);
        assert!(!matches(&superadmin, &predicate));
    }

    #[test]
    fn absent_attribute_never_matches() {
        let unassigned = user("C", vec![], None);
        let predicate = Predicate::leaf(UserField::WardNumber, FilterOp::Lte, 10);
        assert!(!matches(&unassigned, &predicate));
        assert!(matches(&unassigned, &Predicate::Always));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let f = family(3, None, None);
        let range = Predicate::leaf(FamilyField::WardNumber, FilterOp::Gte, 3)
            .and(Predicate::leaf(FamilyField::WardNumber, FilterOp::Lte, 3));
        assert!(matches(&f, &range));
    }

    #[test]
    fn radius_excludes_far_and_unlocated_rows() {
        let kathmandu = GeoPoint { latitude: 27.7172, longitude: 85.3240 };
        let predicate = Predicate::WithinRadius {
            latitude: FamilyField::Latitude,
            longitude: FamilyField::Longitude,
            center: kathmandu,
            radius_km: 10.0,
        };
        assert!(matches(&family(1, Some(27.70), Some(85.30)), &predicate));
        assert!(!matches(&family(1, Some(28.2096), Some(83.9856)), &predicate));
        assert!(!matches(&family(1, None, Some(85.30)), &predicate));
    }

    #[test]
    fn haversine_known_distance() {
        let kathmandu = GeoPoint { latitude: 27.7172, longitude: 85.3240 };
        let pokhara = GeoPoint { latitude: 28.2096, longitude: 83.9856 };
        let d = haversine_km(kathmandu, pokhara);
        assert!((d - 142.0).abs() < 5.0, "distance was {}", d);
        assert_eq!(haversine_km(kathmandu, kathmandu), 0.0);
    }

    #[test]
    fn sort_places_absent_values_last() {
        let mut users = vec![user("A", vec![], None), user("B", vec![], Some(5)), user("C", vec![], Some(2))];
        sort_entities(&mut users, UserField::WardNumber, SortDirection::Desc);
        assert_eq!(users[0].ward_number, Some(5));
        assert_eq!(users[1].ward_number, Some(2));
        assert_eq!(users[2].ward_number, None);
    }
}
