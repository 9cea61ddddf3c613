use ecoroute_core::geopoint::GeoPoint;

/// Parses a "LAT,LON" pair as commonly written by users into the
/// (longitude, latitude) order used internally.
pub fn parse_geopoint(value: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{value}'"))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{lat}'"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{lon}'"))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {lat} out of range"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude {lon} out of range"));
    }

    Ok(GeoPoint::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_lon_order() {
        let point = parse_geopoint("40.7128, -74.0060").unwrap();
        assert_eq!(point.lat(), 40.7128);
        assert_eq!(point.lon(), -74.0060);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(parse_geopoint("91.0,0.0").is_err());
        assert!(parse_geopoint("0.0,181.0").is_err());
        assert!(parse_geopoint("not-a-point").is_err());
    }
}
