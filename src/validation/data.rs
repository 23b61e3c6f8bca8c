//! Range and consistency checks for coordinates and venue catalogs

use std::collections::HashSet;

use crate::core::{GpsCoordinate, PointOfInterest, MAP_MAX_PERCENT, MAP_MIN_PERCENT};
use crate::validation::error::{Result, VenueMapError};

/// WGS-84 coordinate checks
pub struct CoordinateValidator;

impl CoordinateValidator {
    /// Validate WGS84 geodetic coordinates
    pub fn validate_wgs84(coordinate: &GpsCoordinate) -> Result<()> {
        if !coordinate.is_finite() {
            return Err(VenueMapError::InvalidCoordinate {
                reason: format!("non-finite coordinate ({})", coordinate),
            });
        }
        if !(-90.0..=90.0).contains(&coordinate.latitude) {
            return Err(VenueMapError::InvalidCoordinate {
                reason: format!("latitude {} outside [-90, 90]", coordinate.latitude),
            });
        }
        if !(-180.0..=180.0).contains(&coordinate.longitude) {
            return Err(VenueMapError::InvalidCoordinate {
                reason: format!("longitude {} outside [-180, 180]", coordinate.longitude),
            });
        }
        Ok(())
    }
}

/// Catalog consistency checks
pub struct CatalogValidator;

impl CatalogValidator {
    /// Check ids are unique, labels present and pins on the map.
    ///
    /// Returns every problem found rather than stopping at the first.
    pub fn validate(points: &[PointOfInterest]) -> std::result::Result<(), Vec<String>> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();

        for point in points {
            if point.id.trim().is_empty() {
                problems.push("point with empty id".to_string());
            } else if !seen.insert(point.id.as_str()) {
                problems.push(format!("duplicate point id '{}'", point.id));
            }
            if point.label.trim().is_empty() {
                problems.push(format!("point '{}' has an empty label", point.id));
            }
            for (axis, value) in [("x", point.x), ("y", point.y)] {
                if !(MAP_MIN_PERCENT..=MAP_MAX_PERCENT).contains(&value) {
                    problems.push(format!(
                        "point '{}' {} = {} outside [{}, {}]",
                        point.id, axis, value, MAP_MIN_PERCENT, MAP_MAX_PERCENT
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}
