//! Great-circle distance on a spherical Earth.

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two (lat, lon) points in degrees.
///
/// Used to decide whether a geo-scoped demand modifier reaches a station.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1) = (lat1.to_radians(), lon1.to_radians());
    let (lat2, lon2) = (lat2.to_radians(), lon2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::haversine_km;

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(haversine_km(12.97, 77.59, 12.97, 77.59), 0.0);
    }

    #[test]
    fn known_city_pair_distance() {
        // Bangalore -> Chennai is roughly 290 km.
        let d = haversine_km(12.9716, 77.5946, 13.0827, 80.2707);
        assert!((d - 290.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn symmetric() {
        let a = haversine_km(12.9, 77.6, 13.1, 80.3);
        let b = haversine_km(13.1, 80.3, 12.9, 77.6);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn short_distance_matches_flat_approximation() {
        // ~1.11 km per 0.01 degree of latitude.
        let d = haversine_km(12.97, 77.59, 12.98, 77.59);
        assert!((d - 1.112).abs() < 0.01, "got {d}");
    }
}
