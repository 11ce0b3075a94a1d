// Remote catalog service access

pub mod client;
pub mod types;

pub use client::{ApiConfig, CatalogApi, HttpCatalogClient, LOCATION_RESULT_CAP};
pub use types::{
    Dog, GeoBoundingBox, GeoCoordinates, Location, LocationSearchRequest,
    LocationSearchResponse, LoginRequest, MatchResponse, SearchResponse,
};
