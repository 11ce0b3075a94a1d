//! Filter state store
//!
//! Holds the current filter/sort selections and page position. Setting
//! any field other than the page resets the page to 1; the page itself
//! only moves one step at a time through the coordinator's navigation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Fixed result page size
pub const PAGE_SIZE: u32 = 25;

/// Upper bound of the age filter range
pub const MAX_AGE: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Breed,
    Name,
    Age,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Breed => write!(f, "breed"),
            SortKey::Name => write!(f, "name"),
            SortKey::Age => write!(f, "age"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Current filter/sort/page selections
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub breeds: Vec<String>,
    pub age_min: u32,
    pub age_max: u32,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub zip_codes: Vec<String>,
    pub location_filter_enabled: bool,
    /// 1-based page position
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            breeds: Vec::new(),
            age_min: 0,
            age_max: MAX_AGE,
            sort_key: SortKey::Breed,
            sort_direction: SortDirection::Asc,
            zip_codes: Vec::new(),
            location_filter_enabled: false,
            page: 1,
        }
    }
}

/// Interior-mutability store around [`FilterState`].
///
/// The lock is a plain std mutex and is never held across an await;
/// mutation happens only through the setters below.
pub struct FilterStore {
    inner: Mutex<FilterState>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FilterState::default()),
        }
    }

    pub fn snapshot(&self) -> FilterState {
        self.inner.lock().unwrap().clone()
    }

    /// Apply a mutation to any field except the page. The page resets
    /// to 1 as a side effect, always.
    fn with_page_reset(&self, mutate: impl FnOnce(&mut FilterState)) {
        let mut state = self.inner.lock().unwrap();
        mutate(&mut state);
        state.page = 1;
    }

    pub fn set_breeds(&self, breeds: Vec<String>) {
        self.with_page_reset(|s| s.breeds = breeds);
    }

    /// Set the age range, clamped to the 0 ..= MAX_AGE invariant with
    /// min <= max.
    pub fn set_age_range(&self, min: u32, max: u32) {
        let max = max.min(MAX_AGE);
        let min = min.min(max);
        self.with_page_reset(|s| {
            s.age_min = min;
            s.age_max = max;
        });
    }

    pub fn set_sort_key(&self, key: SortKey) {
        self.with_page_reset(|s| s.sort_key = key);
    }

    pub fn set_sort_direction(&self, direction: SortDirection) {
        self.with_page_reset(|s| s.sort_direction = direction);
    }

    /// Replace (not merge) the zip code set
    pub fn set_zip_codes(&self, zip_codes: Vec<String>) {
        self.with_page_reset(|s| s.zip_codes = zip_codes);
    }

    pub fn set_location_filter(&self, enabled: bool) {
        self.with_page_reset(|s| s.location_filter_enabled = enabled);
    }

    /// Move the page one step, bounded by `[1, max_page]`. The check and
    /// the step happen under one lock, so two overlapping navigation
    /// calls can never double-step past a bound even when both saw a
    /// published snapshot that still allowed the move. Returns whether
    /// the page actually moved.
    pub(crate) fn step_page(&self, forward: bool, max_page: u32) -> bool {
        let mut state = self.inner.lock().unwrap();
        if forward {
            if state.page >= max_page {
                return false;
            }
            state.page += 1;
        } else {
            if state.page <= 1 {
                return false;
            }
            state.page -= 1;
        }
        true
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = FilterState::default();
        assert!(state.breeds.is_empty());
        assert_eq!(state.age_min, 0);
        assert_eq!(state.age_max, 25);
        assert_eq!(state.sort_key, SortKey::Breed);
        assert_eq!(state.sort_direction, SortDirection::Asc);
        assert!(state.zip_codes.is_empty());
        assert!(!state.location_filter_enabled);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_every_filter_setter_resets_page() {
        let checks: Vec<(&str, Box<dyn Fn(&FilterStore)>)> = vec![
            ("breeds", Box::new(|s: &FilterStore| s.set_breeds(vec!["Pug".to_string()]))),
            ("age_range", Box::new(|s: &FilterStore| s.set_age_range(2, 10))),
            ("sort_key", Box::new(|s: &FilterStore| s.set_sort_key(SortKey::Age))),
            (
                "sort_direction",
                Box::new(|s: &FilterStore| s.set_sort_direction(SortDirection::Desc)),
            ),
            (
                "zip_codes",
                Box::new(|s: &FilterStore| s.set_zip_codes(vec!["94103".to_string()])),
            ),
            (
                "location_filter",
                Box::new(|s: &FilterStore| s.set_location_filter(true)),
            ),
        ];

        for (name, setter) in checks {
            let store = FilterStore::new();
            store.step_page(true, 5);
            store.step_page(true, 5);
            assert_eq!(store.snapshot().page, 3);

            setter(&store);
            assert_eq!(store.snapshot().page, 1, "setter {} did not reset page", name);
        }
    }

    #[test]
    fn test_step_page_bounds() {
        let store = FilterStore::new();
        assert!(!store.step_page(false, 2));
        assert!(store.step_page(true, 2));
        assert_eq!(store.snapshot().page, 2);
        // at the last page: a forward step is refused, not clamped
        assert!(!store.step_page(true, 2));
        assert_eq!(store.snapshot().page, 2);
        assert!(store.step_page(false, 2));
        assert_eq!(store.snapshot().page, 1);
    }

    #[test]
    fn test_age_range_clamped() {
        let store = FilterStore::new();
        store.set_age_range(3, 99);
        let state = store.snapshot();
        assert_eq!(state.age_min, 3);
        assert_eq!(state.age_max, 25);

        store.set_age_range(30, 10);
        let state = store.snapshot();
        assert_eq!(state.age_min, 10);
        assert_eq!(state.age_max, 10);
    }

    #[test]
    fn test_zip_codes_replaced_not_merged() {
        let store = FilterStore::new();
        store.set_zip_codes(vec!["10001".to_string(), "10002".to_string()]);
        store.set_zip_codes(vec!["94103".to_string()]);
        assert_eq!(store.snapshot().zip_codes, vec!["94103"]);
    }
}
