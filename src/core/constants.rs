//! Physical constants and venue defaults

/// Mean Earth radius used by the spherical haversine model (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance at which the device counts as standing at a calibrated point (meters)
pub const PROXIMITY_THRESHOLD_M: f64 = 15.0;

/// Determinant magnitude below which three calibration points are treated as collinear
pub const DEGENERACY_EPSILON: f64 = 1e-10;

/// Number of calibration pairs an affine fit needs
pub const MIN_CALIBRATION_POINTS: usize = 3;

/// Lower bound of the normalized map plane (percent)
pub const MAP_MIN_PERCENT: f64 = 0.0;

/// Upper bound of the normalized map plane (percent)
pub const MAP_MAX_PERCENT: f64 = 100.0;

/// Default venue reference centre latitude (degrees)
pub const DEFAULT_CENTER_LATITUDE: f64 = 12.99;

/// Default venue reference centre longitude (degrees)
pub const DEFAULT_CENTER_LONGITUDE: f64 = 77.59;

/// Default venue footprint in latitude (degrees, roughly 1 km)
pub const DEFAULT_LAT_DELTA: f64 = 0.01;

/// Default venue footprint in longitude (degrees)
pub const DEFAULT_LON_DELTA: f64 = 0.01;

/// Persistence key under which calibration pairs are stored
pub const CALIBRATION_STORAGE_KEY: &str = "venue_gps_calibrations";
