/// Shared types used across the codebase

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::filter::SortDirection;

/// A typed attribute value read off an entity or carried by a filter condition.
///
/// Entity accessors return `Option<FieldValue>`; `None` means the attribute is
/// absent and is never serialized as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Ordering between two values of compatible kinds. Integers and floats
    /// compare numerically; anything else across kinds is unordered.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;
        match (self, other) {
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Integer(_), Float(_)) | (Float(_), Integer(_)) | (Float(_), Float(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            (Text(a), Text(b)) => Some(a.cmp(b)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            (Date(a), Date(b)) => Some(a.cmp(b)),
            (DateTime(a), DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Pagination and ordering handed to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<F> {
    pub page: u32,
    pub page_size: u32,
    pub sort_field: F,
    pub sort_direction: SortDirection,
}

impl<F> PageRequest<F> {
    pub fn offset(&self) -> u64 {
        self.page as u64 * self.page_size as u64
    }
}

/// One page of results plus the total match count
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new<F>(content: Vec<T>, request: &PageRequest<F>, total_elements: u64) -> Self {
        let size = request.page_size.max(1) as u64;
        let total_pages = total_elements.div_ceil(size);
        Self {
            content,
            page: request.page,
            page_size: request.page_size,
            total_elements,
            total_pages,
            first: request.page == 0,
            last: (request.page as u64 + 1) >= total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_compare_across_kinds() {
        assert_eq!(FieldValue::Integer(3).compare(&FieldValue::Float(2.5)), Some(Ordering::Greater));
        assert_eq!(FieldValue::Text("a".into()).compare(&FieldValue::Integer(1)), None);
    }

    #[test]
    fn page_totals_round_up() {
        let request = PageRequest { page: 1, page_size: 10, sort_field: (), sort_direction: SortDirection::Asc };
        let page = Page::new(vec![1, 2, 3], &request, 23);
        assert_eq!(page.total_pages, 3);
        assert!(!page.first);
        assert!(!page.last);
        assert_eq!(request.offset(), 10);
    }

    #[test]
    fn empty_result_is_first_and_last_page() {
        let request = PageRequest { page: 0, page_size: 20, sort_field: (), sort_direction: SortDirection::Desc };
        let page: Page<u8> = Page::new(vec![], &request, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.first && page.last);
    }
}
