use crate::geopoint::GeoPoint;

/// Coarse identity proxy for a route geometry: point count plus first,
/// last and middle points. Two candidates with equal signatures are
/// treated as the same physical road, without comparing full polylines.
///
/// This is a deliberately approximate policy. Swap this type out if full
/// polyline equality ever becomes necessary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrySignature {
    point_count: usize,
    first: GeoPoint,
    last: GeoPoint,
    midpoint: GeoPoint,
}

impl GeometrySignature {
    pub fn of(geometry: &[GeoPoint]) -> Option<Self> {
        let first = *geometry.first()?;
        let last = *geometry.last()?;
        let midpoint = geometry[geometry.len() / 2];

        Some(GeometrySignature {
            point_count: geometry.len(),
            first,
            last,
            midpoint,
        })
    }
}

impl Eq for GeometrySignature {}

impl std::hash::Hash for GeometrySignature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.point_count);
        self.first.hash(state);
        self.last.hash(state);
        self.midpoint.hash(state);
    }
}
