//! Search query construction
//!
//! Builds the `GET /dogs/search` parameter list from a filter snapshot.
//! Two wire quirks are load-bearing and preserved deliberately:
//! - page 1 omits the `from` parameter entirely
//! - `zipCodes` is only sent when the location filter is on AND the zip
//!   set is non-empty (the empty case never reaches the wire; the
//!   coordinator short-circuits it)
//! Repeated `zipCodes`/`breeds` parameters are OR-matched by the server.

use super::filters::{FilterState, PAGE_SIZE};

/// Ordered query parameters for one search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pairs: Vec<(String, String)>,
}

impl SearchQuery {
    pub fn from_filters(filters: &FilterState) -> Self {
        let mut pairs: Vec<(String, String)> = vec![
            (
                "sort".to_string(),
                format!("{}:{}", filters.sort_key, filters.sort_direction),
            ),
            ("ageMin".to_string(), filters.age_min.to_string()),
            ("ageMax".to_string(), filters.age_max.to_string()),
        ];

        if filters.location_filter_enabled {
            for zip in &filters.zip_codes {
                pairs.push(("zipCodes".to_string(), zip.clone()));
            }
        }

        if filters.page != 1 {
            let from = (filters.page - 1) * PAGE_SIZE;
            pairs.push(("from".to_string(), from.to_string()));
        }

        for breed in &filters.breeds {
            pairs.push(("breeds".to_string(), breed.clone()));
        }

        Self { pairs }
    }

    /// Parameter pairs in wire order, for `reqwest`'s query serializer
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Render as a query string. Values are not percent-encoded here;
    /// this form is for logs and tests, the HTTP layer encodes.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}
