//! Great-circle proximity between the device and calibrated points

use crate::core::{CalibrationPair, GpsCoordinate, PointOfInterest, EARTH_RADIUS_M, PROXIMITY_THRESHOLD_M};

/// Haversine great-circle distance on a sphere of `radius_m` (meters)
pub fn haversine_distance(a: &GpsCoordinate, b: &GpsCoordinate, radius_m: f64) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    radius_m * c
}

/// Finds the calibrated point the device is standing at, if any.
///
/// A linear scan over the catalog: venues have tens of pins, not thousands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityMatcher {
    threshold_m: f64,
    earth_radius_m: f64,
}

impl Default for ProximityMatcher {
    fn default() -> Self {
        Self {
            threshold_m: PROXIMITY_THRESHOLD_M,
            earth_radius_m: EARTH_RADIUS_M,
        }
    }
}

impl ProximityMatcher {
    pub fn new(threshold_m: f64, earth_radius_m: f64) -> Self {
        Self {
            threshold_m,
            earth_radius_m,
        }
    }

    pub fn threshold_m(&self) -> f64 {
        self.threshold_m
    }

    pub fn distance(&self, a: &GpsCoordinate, b: &GpsCoordinate) -> f64 {
        haversine_distance(a, b, self.earth_radius_m)
    }

    /// First point (catalog order) whose calibrated coordinate is within the threshold
    pub fn find_nearby<'a>(
        &self,
        gps: Option<&GpsCoordinate>,
        calibrations: &[CalibrationPair],
        points: &'a [PointOfInterest],
    ) -> Option<&'a PointOfInterest> {
        let gps = gps?;
        if calibrations.is_empty() {
            return None;
        }

        points.iter().find(|point| {
            calibrations
                .iter()
                .find(|pair| pair.point_id == point.id)
                .is_some_and(|pair| self.distance(gps, &pair.gps) <= self.threshold_m)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Category;

    /// Coordinate `meters` due north of `origin` on the haversine sphere
    fn north_of(origin: &GpsCoordinate, meters: f64) -> GpsCoordinate {
        let d_lat = (meters / EARTH_RADIUS_M).to_degrees();
        GpsCoordinate::new(origin.latitude + d_lat, origin.longitude)
    }

    fn catalog() -> Vec<PointOfInterest> {
        vec![
            PointOfInterest::new("stage", 40.0, 50.0, Category::Event, "Main Stage", ""),
            PointOfInterest::new("cafe", 88.0, 30.0, Category::Cafe, "Maid Cafe", ""),
        ]
    }

    #[test]
    fn test_haversine_known_distances() {
        let a = GpsCoordinate::new(12.99, 77.59);
        assert_eq!(haversine_distance(&a, &a, EARTH_RADIUS_M), 0.0);

        let b = north_of(&a, 100.0);
        assert!((haversine_distance(&a, &b, EARTH_RADIUS_M) - 100.0).abs() < 1e-6);

        // one degree of longitude on the equator
        let d = haversine_distance(
            &GpsCoordinate::new(0.0, 0.0),
            &GpsCoordinate::new(0.0, 1.0),
            EARTH_RADIUS_M,
        );
        assert!((d - 111_194.93).abs() < 0.1);
    }

    #[test]
    fn test_threshold_boundary() {
        let matcher = ProximityMatcher::default();
        let anchor = GpsCoordinate::new(12.99, 77.59);
        let calibrations = vec![CalibrationPair::new("stage", anchor)];
        let points = catalog();

        let inside = north_of(&anchor, 14.99);
        let edge = north_of(&anchor, 15.0);
        let outside = north_of(&anchor, 15.01);

        // the threshold itself still counts as nearby
        assert!((matcher.distance(&anchor, &edge) - 15.0).abs() < 1e-6);
        assert_eq!(
            matcher.find_nearby(Some(&edge), &calibrations, &points).map(|p| p.id.as_str()),
            Some("stage")
        );

        assert_eq!(
            matcher.find_nearby(Some(&inside), &calibrations, &points).map(|p| p.id.as_str()),
            Some("stage")
        );
        assert!(matcher.find_nearby(Some(&outside), &calibrations, &points).is_none());
    }

    #[test]
    fn test_no_gps_or_no_calibrations() {
        let matcher = ProximityMatcher::default();
        let anchor = GpsCoordinate::new(12.99, 77.59);
        let points = catalog();

        assert!(matcher.find_nearby(Some(&anchor), &[], &points).is_none());
        assert!(matcher
            .find_nearby(None, &[CalibrationPair::new("stage", anchor)], &points)
            .is_none());
    }

    #[test]
    fn test_first_match_in_catalog_order() {
        let matcher = ProximityMatcher::default();
        let here = GpsCoordinate::new(12.99, 77.59);
        // cafe calibrated first, but stage comes first in the catalog
        let calibrations = vec![
            CalibrationPair::new("cafe", north_of(&here, 2.0)),
            CalibrationPair::new("stage", north_of(&here, 10.0)),
        ];

        let points = catalog();
        let found = matcher.find_nearby(Some(&here), &calibrations, &points);
        assert_eq!(found.map(|p| p.id.as_str()), Some("stage"));
    }

    #[test]
    fn test_uncalibrated_points_never_match() {
        let matcher = ProximityMatcher::default();
        let here = GpsCoordinate::new(12.99, 77.59);
        let calibrations = vec![CalibrationPair::new("unknown", here)];
        assert!(matcher.find_nearby(Some(&here), &calibrations, &catalog()).is_none());
    }
}
