// Application wiring

use std::sync::Arc;

use crate::api::{ApiConfig, CatalogApi, HttpCatalogClient};
use crate::favorites::{FavoritesStore, Matchmaker};
use crate::geo::ViewportBridge;
use crate::search::{FilterStore, SearchCoordinator};
use crate::session::SessionManager;

/// All stores and coordinators wired around one shared catalog client.
/// This is what an embedding frontend (or the CLI driver) holds.
pub struct App {
    pub api: Arc<dyn CatalogApi>,
    pub session: Arc<SessionManager>,
    pub filters: Arc<FilterStore>,
    pub search: Arc<SearchCoordinator>,
    pub favorites: Arc<FavoritesStore>,
    pub matchmaker: Arc<Matchmaker>,
    pub viewport: Arc<ViewportBridge>,
}

impl App {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_api(Arc::new(HttpCatalogClient::new(config)))
    }

    /// Wire the stores around a caller-provided catalog client
    pub fn with_api(api: Arc<dyn CatalogApi>) -> Self {
        let session = Arc::new(SessionManager::new(api.clone()));
        let filters = Arc::new(FilterStore::new());
        let search = Arc::new(SearchCoordinator::new(
            api.clone(),
            filters.clone(),
            session.clone(),
        ));
        let favorites = Arc::new(FavoritesStore::new());
        let matchmaker = Arc::new(Matchmaker::new(api.clone(), favorites.clone()));
        let viewport = Arc::new(ViewportBridge::new(api.clone(), search.clone()));

        Self {
            api,
            session,
            filters,
            search,
            favorites,
            matchmaker,
            viewport,
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockCatalogApi;

    #[tokio::test]
    async fn test_stores_share_one_client() {
        let api = Arc::new(MockCatalogApi::new());
        let app = App::with_api(api.clone());

        app.session.login("Jane", "jane@example.com").await.unwrap();
        app.search.refresh().await.unwrap();

        assert!(app.session.is_authenticated());
        assert_eq!(api.search_call_count(), 1);
        assert!(app.favorites.is_empty());
    }
}
