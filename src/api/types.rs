//! Wire types for the shelter dog catalog service
//!
//! Field names follow the upstream JSON exactly (the service uses a mix
//! of camelCase and snake_case; renames are applied where the two
//! disagree with Rust naming).

use serde::{Deserialize, Serialize};

/// A dog record from the catalog. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    /// Opaque unique identifier
    pub id: String,
    /// Image URI
    pub img: String,
    pub name: String,
    pub age: u32,
    pub zip_code: String,
    pub breed: String,
}

/// Response of `GET /dogs/search`: ordered identifiers plus total count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "resultIds")]
    pub result_ids: Vec<String>,
    pub total: u64,
}

/// Response of `POST /dogs/match`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(rename = "match")]
    pub match_id: String,
}

/// Geographic point as the locations endpoint spells it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Bounding box for `POST /locations/search`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    pub top_right: GeoCoordinates,
    pub bottom_left: GeoCoordinates,
}

/// Request body for `POST /locations/search`
#[derive(Debug, Clone, Serialize)]
pub struct LocationSearchRequest {
    pub size: u32,
    #[serde(rename = "geoBoundingBox")]
    pub geo_bounding_box: GeoBoundingBox,
}

/// A postal-code location record. Only `zip_code` is consumed; the rest
/// is kept tolerant so upstream additions don't break decoding.
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub zip_code: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Response of `POST /locations/search`
#[derive(Debug, Clone, Deserialize)]
pub struct LocationSearchResponse {
    pub results: Vec<Location>,
    pub total: u64,
}

/// Request body for `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub name: String,
    pub email: String,
}
