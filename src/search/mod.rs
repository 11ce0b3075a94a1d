// Search state: filters, query construction, coordinator, published snapshot

pub mod coordinator;
pub mod filters;
pub mod query;
pub mod snapshot;

pub use coordinator::SearchCoordinator;
pub use filters::{FilterState, FilterStore, SortDirection, SortKey, MAX_AGE, PAGE_SIZE};
pub use query::SearchQuery;
pub use snapshot::{SearchSnapshot, SearchStatus};
