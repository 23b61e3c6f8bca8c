//! Fixed linear GPS normalization for venues without a usable calibration

use serde::{Deserialize, Serialize};

use crate::core::{
    GpsCoordinate, MapPosition, DEFAULT_CENTER_LATITUDE, DEFAULT_CENTER_LONGITUDE, DEFAULT_LAT_DELTA,
    DEFAULT_LON_DELTA, MAP_MAX_PERCENT,
};

/// Approximate geographic footprint of the venue image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VenueBounds {
    /// Reference centre of the map image
    pub center: GpsCoordinate,
    /// Latitude span covered by the image height (degrees)
    pub lat_delta: f64,
    /// Longitude span covered by the image width (degrees)
    pub lon_delta: f64,
}

impl Default for VenueBounds {
    fn default() -> Self {
        Self {
            center: GpsCoordinate::new(DEFAULT_CENTER_LATITUDE, DEFAULT_CENTER_LONGITUDE),
            lat_delta: DEFAULT_LAT_DELTA,
            lon_delta: DEFAULT_LON_DELTA,
        }
    }
}

impl VenueBounds {
    pub fn new(center: GpsCoordinate, lat_delta: f64, lon_delta: f64) -> Self {
        Self {
            center,
            lat_delta,
            lon_delta,
        }
    }

    /// Western edge of the footprint
    pub fn min_longitude(&self) -> f64 {
        self.center.longitude - self.lon_delta / 2.0
    }

    /// Southern edge of the footprint
    pub fn min_latitude(&self) -> f64 {
        self.center.latitude - self.lat_delta / 2.0
    }

    /// Normalize a coordinate into map percentages without clamping.
    ///
    /// Latitude grows northwards while map y grows downwards, so y is inverted.
    pub fn project(&self, gps: &GpsCoordinate) -> MapPosition {
        let x = (gps.longitude - self.min_longitude()) / self.lon_delta * MAP_MAX_PERCENT;
        let y = MAP_MAX_PERCENT - (gps.latitude - self.min_latitude()) / self.lat_delta * MAP_MAX_PERCENT;
        MapPosition::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_middle() {
        let bounds = VenueBounds::default();
        let p = bounds.project(&bounds.center);
        assert!((p.x - 50.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_north_west_corner_is_top_left() {
        let bounds = VenueBounds::default();
        let corner = GpsCoordinate::new(12.995, 77.585);
        let p = bounds.project(&corner);
        assert!(p.x.abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        assert!(p.clamped().is_on_map());
    }

    #[test]
    fn test_outside_footprint_projects_off_map() {
        let bounds = VenueBounds::default();
        let far = GpsCoordinate::new(13.5, 78.0);
        let p = bounds.project(&far);
        assert!(!p.is_on_map());
        assert!(p.x > 100.0);
        assert!(p.y < 0.0);
    }
}
