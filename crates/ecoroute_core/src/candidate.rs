use serde::{Deserialize, Serialize};

use crate::geopoint::GeoPoint;

/// One raw route option as returned by the routing provider.
///
/// Immutable once fetched. The `index` is its stable identity within the
/// batch that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub index: usize,
    pub label: String,

    /// Total distance in meters
    pub distance_m: f64,

    /// Provider-estimated travel time in seconds
    pub duration_s: f64,

    pub geometry: Vec<GeoPoint>,
}

impl RouteCandidate {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_s / 60.0
    }

    /// The geometry point closest to the middle of the polyline, used as
    /// the representative location for point lookups along the route.
    pub fn midpoint(&self) -> Option<&GeoPoint> {
        self.geometry.get(self.geometry.len() / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        let candidate = RouteCandidate {
            index: 0,
            label: "driving".to_owned(),
            distance_m: 10_000.0,
            duration_s: 600.0,
            geometry: vec![],
        };

        assert_eq!(candidate.distance_km(), 10.0);
        assert_eq!(candidate.duration_min(), 10.0);
        assert!(candidate.midpoint().is_none());
    }
}
