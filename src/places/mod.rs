use serde::{Deserialize, Serialize};

use crate::advice::models::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub category: String,
    pub location: GeoPoint,
}

/// Fixed offsets in degrees relative to the user's position. These are
/// canned overlay points, not the result of any real directory lookup.
const OFFSETS: &[(&str, &str, f64, f64)] = &[
    ("Happy Tails Veterinary Clinic", "vet", 0.004, 0.002),
    ("Riverside Dog Park", "park", -0.003, 0.005),
    ("The Clip Joint Grooming", "groomer", 0.002, -0.004),
    ("Pawsitively Pets Supply", "store", -0.005, -0.002),
    ("Canine Commons Daycare", "daycare", 0.006, -0.001),
];

/// Points of interest around the supplied position for the map overlay.
pub fn nearby_places(center: GeoPoint) -> Vec<Place> {
    OFFSETS
        .iter()
        .map(|(name, category, dlat, dlng)| Place {
            name: name.to_string(),
            category: category.to_string(),
            location: GeoPoint {
                lat: center.lat + dlat,
                lng: center.lng + dlng,
            },
        })
        .collect()
}
