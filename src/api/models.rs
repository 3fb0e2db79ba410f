use serde::{Deserialize, Serialize};

use crate::ads::Advertisement;
use crate::advice::models::{GeoPoint, Source};
use crate::profile::Profile;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct AskAdviceRequest {
    pub text: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AskAdviceResponse {
    pub text: String,
    pub sources: Vec<Source>,
    /// Catalog re-ranked against the current profile so a sidebar can
    /// refresh without a second round trip.
    pub ads: Vec<Advertisement>,
}

#[derive(Debug, Serialize)]
pub struct SaveProfileResponse {
    pub profile: Profile,
    pub age_valid: bool,
    pub weight_valid: bool,
}

#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_offset")]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

fn default_offset() -> usize {
    0
}

/// A location only exists when both coordinates were supplied; absence is a
/// normal state, not an error.
pub fn geo_from(lat: Option<f64>, lng: Option<f64>) -> Option<GeoPoint> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        _ => None,
    }
}
