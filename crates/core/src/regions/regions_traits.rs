//! Analysis-backend boundary trait for regions.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::errors::Result;
use crate::store::GeoPoint;

/// Trait wrapping the geospatial analysis backend's computation for
/// user-drawn polygons. The backend's callback-style API is adapted to a
/// future at this seam; core logic stays callback-free.
#[async_trait]
pub trait GeoAnalysis: Send + Sync {
    /// Counts damage points inside `polygon`.
    async fn damage_inside(&self, polygon: &[GeoPoint]) -> Result<i64>;
}

/// Mock analysis for testing - returns a fixed damage count and records
/// how often it was consulted.
#[derive(Default)]
pub struct MockGeoAnalysis {
    damage: i64,
    calls: AtomicUsize,
}

impl MockGeoAnalysis {
    pub fn new(damage: i64) -> Self {
        Self {
            damage,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times the backend was consulted.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoAnalysis for MockGeoAnalysis {
    async fn damage_inside(&self, _polygon: &[GeoPoint]) -> Result<i64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.damage)
    }
}
