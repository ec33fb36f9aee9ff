//! Geographic point value type, matching the store's native geo-point
//! representation.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair as stored in document fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}
