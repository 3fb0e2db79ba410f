use serde::{Deserialize, Serialize};
use tracing::info;

use crate::profile::Profile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: String,
    pub title: String,
    pub body: String,
    pub category: String,
    #[serde(default)]
    pub target_breeds: Vec<String>,
    #[serde(default)]
    pub target_conditions: Vec<String>,
}

const CATALOG_JSON: &str = include_str!("../../data/ads.json");

/// The sponsored catalog is static: parsed once at startup, read-only after.
pub fn load_catalog() -> Result<Vec<Advertisement>, serde_json::Error> {
    let catalog: Vec<Advertisement> = serde_json::from_str(CATALOG_JSON)?;
    info!("Loaded ad catalog with {} entries", catalog.len());
    Ok(catalog)
}

/// Relevance of one ad against the profile. Breed hits are worth 2,
/// condition hits 3; an ad matching nothing scores 0.
///
/// The match direction is asymmetric: the catalog target token must be a
/// substring of the profile text ("Labrador" matches breed
/// "Labrador Retriever"), not the other way around. Empty profile fields
/// never match anything.
pub fn score(ad: &Advertisement, profile: &Profile) -> i32 {
    let mut total = 0;

    let breed = profile.breed.trim().to_lowercase();
    if !breed.is_empty()
        && ad
            .target_breeds
            .iter()
            .any(|t| breed.contains(&t.to_lowercase()))
    {
        total += 2;
    }

    let conditions = profile.conditions.trim().to_lowercase();
    if !conditions.is_empty()
        && ad
            .target_conditions
            .iter()
            .any(|t| conditions.contains(&t.to_lowercase()))
    {
        total += 3;
    }

    total
}

/// Pure ranking over the catalog: same elements back, descending score.
/// `sort_by` is stable, so ties keep their catalog order. Recomputed from
/// scratch whenever the profile changes.
pub fn rank(catalog: &[Advertisement], profile: &Profile) -> Vec<Advertisement> {
    let mut ranked: Vec<Advertisement> = catalog.to_vec();
    ranked.sort_by(|a, b| score(b, profile).cmp(&score(a, profile)));
    ranked
}
