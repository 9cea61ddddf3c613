use ecoroute_core::{candidate::RouteCandidate, geopoint::GeoPoint};

/// A via point perpendicular to the midpoint of the origin-destination
/// axis. Routing through it forces the provider off the corridor it
/// already returned, yielding physically distinct alternatives. A negative
/// `offset_scale` deviates to the other side.
pub fn deviation_point(origin: &GeoPoint, dest: &GeoPoint, offset_scale: f64) -> GeoPoint {
    let mid_lon = (origin.lon() + dest.lon()) / 2.0;
    let mid_lat = (origin.lat() + dest.lat()) / 2.0;

    let dx = dest.lat() - origin.lat();
    let dy = dest.lon() - origin.lon();

    // Perpendicular in degree space, rough but sufficient for a via hint
    let mut perp_lon = dx;
    let mut perp_lat = -dy;

    let magnitude = (perp_lon * perp_lon + perp_lat * perp_lat).sqrt();
    if magnitude == 0.0 {
        return GeoPoint::new(mid_lon + offset_scale, mid_lat + offset_scale);
    }
    perp_lon /= magnitude;
    perp_lat /= magnitude;

    GeoPoint::new(
        mid_lon + perp_lon * offset_scale,
        mid_lat + perp_lat * offset_scale,
    )
}

/// Deviation magnitude scaled to the trip length in degree space.
pub fn deviation_scale(origin: &GeoPoint, dest: &GeoPoint) -> f64 {
    let dx = origin.lon() - dest.lon();
    let dy = origin.lat() - dest.lat();
    let approx = (dx * dx + dy * dy).sqrt();

    (approx * 0.2).max(0.02)
}

/// Last-resort candidate when the routing provider is unreachable: the
/// great-circle line with a 20% road-factor markup at an assumed 60 km/h.
pub fn straight_line_candidate(origin: &GeoPoint, dest: &GeoPoint) -> RouteCandidate {
    let crow_km = origin.haversine_km(dest);
    let road_km = crow_km * 1.2;

    RouteCandidate {
        index: 0,
        label: "fallback".to_owned(),
        distance_m: road_km * 1000.0,
        duration_s: (road_km / 60.0) * 3600.0,
        geometry: vec![*origin, *dest],
    }
}
