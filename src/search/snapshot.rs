//! Published search result state
//!
//! The coordinator publishes one of these after every run. Zero results
//! and "still loading" have identical record/total shapes; the status is
//! the only way to tell them apart, so consumers must check it.

use serde::{Deserialize, Serialize};

use crate::api::Dog;
use crate::error::ApiError;

use super::filters::PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum SearchStatus {
    /// A search run is outstanding
    Pending,
    /// The published records/total reflect the latest filter state
    Success,
    /// The latest run failed; records/total are empty placeholders
    Failed { error: ApiError },
}

/// Current result page plus derived pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub status: SearchStatus,
    /// Records in search-result order
    pub dogs: Vec<Dog>,
    pub total: u64,
    pub page: u32,
    pub max_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl SearchSnapshot {
    /// Transitional snapshots have no freshly observed total; max_page
    /// carries the page so the pair never reads as "page 3 of 1".
    pub fn pending(page: u32) -> Self {
        Self {
            status: SearchStatus::Pending,
            dogs: Vec::new(),
            total: 0,
            page,
            max_page: page.max(1),
            has_next: false,
            has_previous: page > 1,
        }
    }

    /// Derive pagination from the freshly observed total, never from a
    /// previously published one.
    pub fn success(dogs: Vec<Dog>, total: u64, page: u32) -> Self {
        let max_page = (total.div_ceil(u64::from(PAGE_SIZE))).max(1) as u32;
        Self {
            status: SearchStatus::Success,
            dogs,
            total,
            page,
            max_page,
            has_next: total > u64::from(PAGE_SIZE) * u64::from(page),
            has_previous: page > 1,
        }
    }

    pub fn failed(error: ApiError, page: u32) -> Self {
        Self {
            status: SearchStatus::Failed { error },
            dogs: Vec::new(),
            total: 0,
            page,
            max_page: page.max(1),
            has_next: false,
            has_previous: page > 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SearchStatus::Success
    }
}
