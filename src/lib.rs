// pawfetch - client-side search and match engine for a shelter dog
// adoption catalog
//
// The heavy lifting is the search coordinator: it composes the filter
// state store and the remote catalog client into a continuously updated
// result page with derived pagination, under a latest-wins discipline
// for overlapping requests. Favorites/matchmaking and the map-viewport
// bridge sit beside it, all sharing one session-cookie HTTP client.

// Request-timing log macros - exported for use by other modules
#[macro_use]
pub mod macros;

pub mod api;
pub mod error;
pub mod favorites;
pub mod geo;
pub mod search;
pub mod session;
pub mod state;

pub use api::{ApiConfig, CatalogApi, Dog, GeoBoundingBox, GeoCoordinates, HttpCatalogClient};
pub use error::ApiError;
pub use favorites::{FavoritesStore, Matchmaker};
pub use geo::ViewportBridge;
pub use search::{
    FilterState, FilterStore, SearchCoordinator, SearchSnapshot, SearchStatus, SortDirection,
    SortKey, PAGE_SIZE,
};
pub use session::SessionManager;
pub use state::App;
