//! Search coordinator
//!
//! Composes the filter store and the remote catalog client into a single
//! published result page with derived pagination. Every filter or page
//! change re-runs the search; overlapping runs follow a latest-wins
//! discipline keyed by a generation counter, so a response for a
//! superseded filter state can never overwrite a newer one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{CatalogApi, Dog};
use crate::error::ApiError;
use crate::session::SessionManager;

use super::filters::{FilterState, FilterStore, SortDirection, SortKey};
use super::query::SearchQuery;
use super::snapshot::SearchSnapshot;

/// Publish side of the coordinator, cloned into each background run
#[derive(Clone)]
struct Publisher {
    published: Arc<RwLock<SearchSnapshot>>,
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<SearchSnapshot>>>>,
    /// Identity of the most recently issued run; publishes from older
    /// runs are discarded
    generation: Arc<AtomicU64>,
}

impl Publisher {
    fn new() -> Self {
        Self {
            published: Arc::new(RwLock::new(SearchSnapshot::pending(1))),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Store and fan out a snapshot, unless the run that produced it has
    /// been superseded. The generation check, the write and the fan-out
    /// all happen under the write lock, so a stale publish can never
    /// land after a newer one and subscribers receive snapshots in
    /// generation order. The unbounded send never blocks, so no await
    /// happens while the lock is held.
    async fn publish(&self, generation: u64, snapshot: SearchSnapshot) -> bool {
        let mut guard = self.published.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            perf_trace!("discarding publish from superseded run {}", generation);
            return false;
        }
        *guard = snapshot.clone();

        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        true
    }
}

pub struct SearchCoordinator {
    api: Arc<dyn CatalogApi>,
    filters: Arc<FilterStore>,
    session: Arc<SessionManager>,
    publisher: Publisher,
    /// Token of the run currently in flight; cancelled when superseded
    current_run: Mutex<CancellationToken>,
}

impl SearchCoordinator {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        filters: Arc<FilterStore>,
        session: Arc<SessionManager>,
    ) -> Self {
        Self {
            api,
            filters,
            session,
            publisher: Publisher::new(),
            current_run: Mutex::new(CancellationToken::new()),
        }
    }

    /// Latest published snapshot
    pub async fn current(&self) -> SearchSnapshot {
        self.publisher.published.read().await.clone()
    }

    /// Receive every snapshot published from now on. Closed receivers
    /// are pruned on the next publish.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SearchSnapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.publisher.subscribers.lock().unwrap().push(tx);
        rx
    }

    /// Re-run the search for the current filter state in the background.
    ///
    /// The previous in-flight run (if any) is superseded: its token is
    /// cancelled and anything it still publishes is discarded. Await the
    /// returned handle to observe the run settling; dropping it is fine.
    pub fn refresh(&self) -> JoinHandle<()> {
        let generation = self.publisher.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let token = CancellationToken::new();
        let superseded = {
            let mut guard = self.current_run.lock().unwrap();
            std::mem::replace(&mut *guard, token.clone())
        };
        superseded.cancel();

        let state = self.filters.snapshot();
        let api = self.api.clone();
        let session = self.session.clone();
        let publisher = self.publisher.clone();
        tokio::spawn(async move {
            run_search(api, session, publisher, state, generation, token).await;
        })
    }

    // -------- filter mutations (each one re-runs the search) --------

    pub fn set_breeds(&self, breeds: Vec<String>) -> JoinHandle<()> {
        self.filters.set_breeds(breeds);
        self.refresh()
    }

    pub fn set_age_range(&self, min: u32, max: u32) -> JoinHandle<()> {
        self.filters.set_age_range(min, max);
        self.refresh()
    }

    pub fn set_sort_key(&self, key: SortKey) -> JoinHandle<()> {
        self.filters.set_sort_key(key);
        self.refresh()
    }

    pub fn set_sort_direction(&self, direction: SortDirection) -> JoinHandle<()> {
        self.filters.set_sort_direction(direction);
        self.refresh()
    }

    pub fn set_zip_codes(&self, zip_codes: Vec<String>) -> JoinHandle<()> {
        self.filters.set_zip_codes(zip_codes);
        self.refresh()
    }

    pub fn set_location_filter(&self, enabled: bool) -> JoinHandle<()> {
        self.filters.set_location_filter(enabled);
        self.refresh()
    }

    // -------- page navigation (guarded, one step at a time) --------

    /// Advance one page if the published snapshot says there is one.
    /// Returns `None` when navigation was not possible.
    ///
    /// The published snapshot lags while a navigation's refresh is in
    /// flight, so the step itself is additionally bounded by the last
    /// observed max_page; a second rapid call refuses instead of
    /// stepping past the last valid page.
    pub async fn next_page(&self) -> Option<JoinHandle<()>> {
        let (has_next, max_page) = {
            let published = self.publisher.published.read().await;
            (published.has_next, published.max_page)
        };
        if !has_next || !self.filters.step_page(true, max_page) {
            return None;
        }
        Some(self.refresh())
    }

    /// Step back one page if the published snapshot allows it.
    pub async fn previous_page(&self) -> Option<JoinHandle<()>> {
        let (has_previous, max_page) = {
            let published = self.publisher.published.read().await;
            (published.has_previous, published.max_page)
        };
        if !has_previous || !self.filters.step_page(false, max_page) {
            return None;
        }
        Some(self.refresh())
    }
}

/// One search run: short-circuit or search + hydrate, then publish under
/// the latest-wins rule.
async fn run_search(
    api: Arc<dyn CatalogApi>,
    session: Arc<SessionManager>,
    publisher: Publisher,
    state: FilterState,
    generation: u64,
    cancel: CancellationToken,
) {
    publisher
        .publish(generation, SearchSnapshot::pending(state.page))
        .await;

    // Location filter on with no resolved zip codes means the map
    // viewport hasn't produced anything yet. Modeled as a successful
    // empty page; no request goes out.
    if state.location_filter_enabled && state.zip_codes.is_empty() {
        log::debug!(
            "run {}: location filter on with empty zip set, skipping search",
            generation
        );
        publisher
            .publish(generation, SearchSnapshot::success(Vec::new(), 0, state.page))
            .await;
        return;
    }

    let query = SearchQuery::from_filters(&state);
    perf_debug!("run {}: {}", generation, query.encode());

    let snapshot = match fetch_page(api.as_ref(), &query, &cancel).await {
        Ok(Some((dogs, total))) => SearchSnapshot::success(dogs, total, state.page),
        Ok(None) => {
            // Superseded between search and hydrate; a newer run owns the
            // published state now.
            log::debug!("run {}: superseded in flight, discarding", generation);
            return;
        }
        Err(err) => {
            if err == ApiError::AuthRequired {
                session.mark_unauthenticated();
            }
            log::warn!("run {}: search failed: {}", generation, err);
            SearchSnapshot::failed(err, state.page)
        }
    };

    publisher.publish(generation, snapshot).await;
}

/// Search then hydrate. Hydrate order is unspecified upstream, so
/// records are re-ordered to the search's id order; ids the hydrate
/// call did not return are skipped.
async fn fetch_page(
    api: &dyn CatalogApi,
    query: &SearchQuery,
    cancel: &CancellationToken,
) -> Result<Option<(Vec<Dog>, u64)>, ApiError> {
    let search = api.search_dogs(query).await?;

    if cancel.is_cancelled() {
        return Ok(None);
    }

    let hydrated = api.fetch_dogs(&search.result_ids).await?;

    let mut by_id: HashMap<String, Dog> = hydrated
        .into_iter()
        .map(|dog| (dog.id.clone(), dog))
        .collect();
    let dogs: Vec<Dog> = search
        .result_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();

    if dogs.len() != search.result_ids.len() {
        log::debug!(
            "hydrate returned {} of {} requested records",
            dogs.len(),
            search.result_ids.len()
        );
    }

    Ok(Some((dogs, search.total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockCatalogApi;
    use crate::search::snapshot::SearchStatus;
    use std::time::Duration;

    fn coordinator(api: Arc<MockCatalogApi>) -> Arc<SearchCoordinator> {
        let session = Arc::new(SessionManager::new(api.clone()));
        Arc::new(SearchCoordinator::new(
            api,
            Arc::new(FilterStore::new()),
            session,
        ))
    }

    #[tokio::test]
    async fn test_search_publishes_hydrated_page() {
        let api = Arc::new(MockCatalogApi::new());
        let dogs = vec![
            MockCatalogApi::dog("a", "Ava", "Pug", 3, "94103"),
            MockCatalogApi::dog("b", "Bo", "Beagle", 5, "94110"),
        ];
        api.script_page(&dogs, 2);

        let coord = coordinator(api.clone());
        coord.refresh().await.unwrap();

        let snap = coord.current().await;
        assert!(snap.is_success());
        assert_eq!(snap.total, 2);
        assert_eq!(snap.page, 1);
        assert!(!snap.has_next);
        assert!(!snap.has_previous);
        // hydrate answered in reversed order; published order follows the
        // search's id order regardless
        assert_eq!(snap.dogs, dogs);
    }

    #[tokio::test]
    async fn test_empty_zip_set_with_location_filter_skips_search() {
        let api = Arc::new(MockCatalogApi::new());
        let coord = coordinator(api.clone());

        coord.set_location_filter(true).await.unwrap();

        let snap = coord.current().await;
        assert!(snap.is_success());
        assert_eq!(snap.total, 0);
        assert!(snap.dogs.is_empty());
        assert_eq!(api.search_call_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_response_does_not_overwrite_newer_state() {
        let api = Arc::new(MockCatalogApi::new());
        let slow = vec![MockCatalogApi::dog("old", "Old", "Pug", 4, "10001")];
        let fast = vec![MockCatalogApi::dog("new", "New", "Beagle", 2, "10002")];
        // R1 completes after R2 despite being issued first
        api.script_page_delayed(&slow, 1, Duration::from_millis(80));
        api.script_page_delayed(&fast, 1, Duration::ZERO);

        let coord = coordinator(api.clone());
        let first = coord.refresh();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = coord.set_breeds(vec!["Beagle".to_string()]);

        second.await.unwrap();
        first.await.unwrap();

        let snap = coord.current().await;
        assert!(snap.is_success());
        assert_eq!(snap.dogs, fast, "superseded response overwrote the newer one");
    }

    #[tokio::test]
    async fn test_failure_surfaces_as_error_status() {
        let api = Arc::new(MockCatalogApi::new());
        api.script_search_error(ApiError::Network("connection reset".to_string()));

        let coord = coordinator(api.clone());
        coord.refresh().await.unwrap();

        let snap = coord.current().await;
        match snap.status {
            SearchStatus::Failed { error } => {
                assert_eq!(error, ApiError::Network("connection reset".to_string()));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_401_marks_session_unauthenticated() {
        let api = Arc::new(MockCatalogApi::new());
        api.script_search_error(ApiError::AuthRequired);

        let session = Arc::new(SessionManager::new(api.clone()));
        session.login("Jane", "jane@example.com").await.unwrap();
        assert!(session.is_authenticated());

        let coord = Arc::new(SearchCoordinator::new(
            api,
            Arc::new(FilterStore::new()),
            session.clone(),
        ));
        coord.refresh().await.unwrap();

        assert!(!session.is_authenticated());
        assert!(matches!(
            coord.current().await.status,
            SearchStatus::Failed { error: ApiError::AuthRequired }
        ));
    }

    #[tokio::test]
    async fn test_page_navigation_guarded_by_derived_flags() {
        let api = Arc::new(MockCatalogApi::new());
        let page_one = vec![MockCatalogApi::dog("a", "Ava", "Pug", 3, "94103")];
        let page_two = vec![MockCatalogApi::dog("z", "Zed", "Akita", 7, "94104")];
        api.script_page(&page_one, 26);
        api.script_page(&page_two, 26);

        let coord = coordinator(api.clone());

        // nothing published yet: pending snapshot blocks navigation
        assert!(coord.next_page().await.is_none());

        coord.refresh().await.unwrap();
        assert!(coord.current().await.has_next);

        coord.next_page().await.expect("has_next").await.unwrap();
        let snap = coord.current().await;
        assert_eq!(snap.page, 2);
        assert!(!snap.has_next);
        assert!(snap.has_previous);
        // page 2 sends from=25
        let calls = api.search_calls.lock().unwrap();
        assert!(calls[1].encode().contains("from=25"));
    }

    #[tokio::test]
    async fn test_rapid_navigation_cannot_overshoot_last_page() {
        let api = Arc::new(MockCatalogApi::new());
        // two valid pages in total
        api.script_page(&[], 26);
        api.script_page_delayed(&[], 26, Duration::from_millis(40));

        let coord = coordinator(api.clone());
        coord.refresh().await.unwrap();

        let first = coord.next_page().await.expect("page two exists");
        // the navigation's refresh has not published yet, so the
        // snapshot still says has_next; the bounded step must refuse
        let second = coord.next_page().await;
        assert!(second.is_none(), "page overshot past the last valid page");

        first.await.unwrap();
        let snap = coord.current().await;
        assert_eq!(snap.page, 2);
        assert!(!snap.has_next);
        assert_eq!(api.search_call_count(), 2);
    }

    #[tokio::test]
    async fn test_rapid_navigation_cannot_step_below_page_one() {
        let api = Arc::new(MockCatalogApi::new());
        api.script_page(&[], 26);
        api.script_page(&[], 26);
        api.script_page_delayed(&[], 26, Duration::from_millis(40));

        let coord = coordinator(api.clone());
        coord.refresh().await.unwrap();
        coord.next_page().await.expect("page two exists").await.unwrap();

        let back = coord.previous_page().await.expect("page one exists");
        assert!(coord.previous_page().await.is_none());

        back.await.unwrap();
        assert_eq!(coord.current().await.page, 1);
    }

    #[tokio::test]
    async fn test_filter_change_resets_to_page_one() {
        let api = Arc::new(MockCatalogApi::new());
        api.script_page(&[], 60);
        api.script_page(&[], 60);
        api.script_page(&[], 10);

        let coord = coordinator(api.clone());
        coord.refresh().await.unwrap();
        coord.next_page().await.expect("has_next").await.unwrap();
        assert_eq!(coord.current().await.page, 2);

        coord.set_breeds(vec!["Pug".to_string()]).await.unwrap();
        let snap = coord.current().await;
        assert_eq!(snap.page, 1);
        // the re-issued query must not carry an offset
        let calls = api.search_calls.lock().unwrap();
        assert!(!calls[2].encode().contains("from="));
    }

    #[tokio::test]
    async fn test_hydrate_missing_ids_are_skipped() {
        let api = Arc::new(MockCatalogApi::new());
        let known = MockCatalogApi::dog("a", "Ava", "Pug", 3, "94103");
        // search returns two ids but only one hydrates
        {
            let mut pool = api.hydrate_pool.lock().unwrap();
            pool.insert("a".to_string(), known.clone());
        }
        api.search_script.lock().unwrap().push_back(crate::api::testing::ScriptedSearch {
            delay: Duration::ZERO,
            result: Ok(crate::api::SearchResponse {
                result_ids: vec!["a".to_string(), "ghost".to_string()],
                total: 2,
            }),
        });

        let coord = coordinator(api.clone());
        coord.refresh().await.unwrap();

        let snap = coord.current().await;
        assert!(snap.is_success());
        assert_eq!(snap.dogs, vec![known]);
        assert_eq!(snap.total, 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_pending_then_settled() {
        let api = Arc::new(MockCatalogApi::new());
        api.script_page(&[], 0);

        let coord = coordinator(api);
        let mut rx = coord.subscribe();

        coord.refresh().await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.status, SearchStatus::Pending);
        let second = rx.recv().await.unwrap();
        assert!(second.is_success());
        assert_eq!(second.total, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_subscribers_final_snapshot_is_from_newest_run() {
        let api = Arc::new(MockCatalogApi::new());
        let slow = vec![MockCatalogApi::dog("old", "Old", "Pug", 4, "10001")];
        let fast = vec![MockCatalogApi::dog("new", "New", "Beagle", 2, "10002")];
        api.script_page_delayed(&slow, 1, Duration::from_millis(80));
        api.script_page_delayed(&fast, 1, Duration::ZERO);

        let coord = coordinator(api);
        let mut rx = coord.subscribe();

        let first = coord.refresh();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = coord.set_breeds(vec!["Beagle".to_string()]);
        second.await.unwrap();
        first.await.unwrap();

        // the channel must end on the newest run's result; a superseded
        // run's snapshot arriving after it would leave subscribers stale
        let mut last = None;
        while let Ok(snap) = rx.try_recv() {
            last = Some(snap);
        }
        let last = last.expect("at least one snapshot was fanned out");
        assert!(last.is_success());
        assert_eq!(last.dogs, fast);
    }
}
