//! Viewport-to-filter bridge
//!
//! Converts a settled map viewport into the zip code set the filter
//! store consumes. One-directional: it only ever writes into the filter
//! state (through the coordinator, so the page resets and the search
//! re-runs), never reads it.

use std::sync::Arc;

use crate::api::{CatalogApi, GeoBoundingBox, LocationSearchRequest, LOCATION_RESULT_CAP};
use crate::error::ApiError;
use crate::search::SearchCoordinator;

pub struct ViewportBridge {
    api: Arc<dyn CatalogApi>,
    coordinator: Arc<SearchCoordinator>,
}

impl ViewportBridge {
    pub fn new(api: Arc<dyn CatalogApi>, coordinator: Arc<SearchCoordinator>) -> Self {
        Self { api, coordinator }
    }

    /// Resolve the viewport to zip codes and replace the filter store's
    /// zip set wholesale. On failure the prior zip set stays untouched.
    /// Returns how many zip codes the viewport resolved to.
    pub async fn viewport_settled(&self, viewport: GeoBoundingBox) -> Result<usize, ApiError> {
        let request = LocationSearchRequest {
            size: LOCATION_RESULT_CAP,
            geo_bounding_box: viewport,
        };

        let response = match self.api.search_locations(&request).await {
            Ok(response) => response,
            Err(err) => {
                log::warn!("viewport resolution failed, keeping previous zip codes: {}", err);
                return Err(err);
            }
        };

        let zip_codes: Vec<String> = response
            .results
            .into_iter()
            .map(|location| location.zip_code)
            .collect();

        log::debug!(
            "viewport resolved to {} zip codes ({} total in bounds)",
            zip_codes.len(),
            response.total
        );

        let count = zip_codes.len();
        self.coordinator.set_zip_codes(zip_codes);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockCatalogApi;
    use crate::api::{GeoCoordinates, Location, LocationSearchResponse};
    use crate::search::FilterStore;
    use crate::session::SessionManager;

    fn bridge_with(api: Arc<MockCatalogApi>) -> (ViewportBridge, Arc<FilterStore>) {
        let filters = Arc::new(FilterStore::new());
        let session = Arc::new(SessionManager::new(api.clone()));
        let coordinator = Arc::new(SearchCoordinator::new(
            api.clone(),
            filters.clone(),
            session,
        ));
        (ViewportBridge::new(api, coordinator), filters)
    }

    fn viewport() -> GeoBoundingBox {
        GeoBoundingBox {
            top_right: GeoCoordinates { lat: 37.81, lon: -122.36 },
            bottom_left: GeoCoordinates { lat: 37.70, lon: -122.52 },
        }
    }

    fn location(zip: &str) -> Location {
        serde_json::from_str(&format!(r#"{{"zip_code":"{}"}}"#, zip)).unwrap()
    }

    #[tokio::test]
    async fn test_settled_viewport_replaces_zip_codes() {
        let api = Arc::new(MockCatalogApi::new());
        api.location_script.lock().unwrap().push_back(Ok(LocationSearchResponse {
            results: vec![location("94103"), location("94110")],
            total: 2,
        }));

        let (bridge, filters) = bridge_with(api.clone());
        filters.set_zip_codes(vec!["10001".to_string()]);

        let count = bridge.viewport_settled(viewport()).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(filters.snapshot().zip_codes, vec!["94103", "94110"]);

        // the geo query carries the backend cap
        let calls = api.location_calls.lock().unwrap();
        assert_eq!(calls[0].size, LOCATION_RESULT_CAP);
    }

    #[tokio::test]
    async fn test_failed_resolution_keeps_previous_zip_codes() {
        let api = Arc::new(MockCatalogApi::new());
        api.location_script
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Network("timeout".to_string())));

        let (bridge, filters) = bridge_with(api);
        filters.set_zip_codes(vec!["10001".to_string()]);

        assert!(bridge.viewport_settled(viewport()).await.is_err());
        assert_eq!(filters.snapshot().zip_codes, vec!["10001"]);
    }
}
