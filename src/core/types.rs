//! Core data types for the venue map

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::constants::{MAP_MAX_PERCENT, MAP_MIN_PERCENT};

/// WGS-84 geodetic coordinate reported by the device (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl fmt::Display for GpsCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat={:.6}, lon={:.6}", self.latitude, self.longitude)
    }
}

/// Position on the map plane, in percent of the rendered image (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPosition {
    pub x: f64,
    pub y: f64,
}

impl MapPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes onto the visible map.
    ///
    /// NaN components collapse to the lower bound so callers always get a
    /// drawable position.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_percent(self.x),
            y: clamp_percent(self.y),
        }
    }

    pub fn is_on_map(&self) -> bool {
        (MAP_MIN_PERCENT..=MAP_MAX_PERCENT).contains(&self.x)
            && (MAP_MIN_PERCENT..=MAP_MAX_PERCENT).contains(&self.y)
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        MAP_MIN_PERCENT
    } else {
        value.clamp(MAP_MIN_PERCENT, MAP_MAX_PERCENT)
    }
}

/// Point-of-interest categories used for pin colours and filter chips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Cafe,
    Booth,
    Event,
    Workshop,
    Shop,
    Info,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Cafe,
        Category::Booth,
        Category::Event,
        Category::Workshop,
        Category::Shop,
        Category::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Cafe => "cafe",
            Category::Booth => "booth",
            Category::Event => "event",
            Category::Workshop => "workshop",
            Category::Shop => "shop",
            Category::Info => "info",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry for a pin on the venue map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// Unique identifier, referenced by calibration pairs
    pub id: String,
    /// Horizontal position in percent of image width
    pub x: f64,
    /// Vertical position in percent of image height
    pub y: f64,
    #[serde(rename = "type")]
    pub category: Category,
    pub label: String,
    pub details: String,
}

impl PointOfInterest {
    pub fn new(id: &str, x: f64, y: f64, category: Category, label: &str, details: &str) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            category,
            label: label.to_string(),
            details: details.to_string(),
        }
    }

    pub fn position(&self) -> MapPosition {
        MapPosition::new(self.x, self.y)
    }
}

/// Recorded correspondence between a real-world GPS reading and a catalog point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPair {
    #[serde(rename = "pinId", alias = "pointId")]
    pub point_id: String,
    pub gps: GpsCoordinate,
}

impl CalibrationPair {
    pub fn new(point_id: &str, gps: GpsCoordinate) -> Self {
        Self {
            point_id: point_id.to_string(),
            gps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_keeps_positions_on_map() {
        let p = MapPosition::new(-12.0, 140.0).clamped();
        assert_eq!(p, MapPosition::new(0.0, 100.0));
        assert!(p.is_on_map());

        let nan = MapPosition::new(f64::NAN, 50.0).clamped();
        assert_eq!(nan.x, 0.0);
        assert_eq!(nan.y, 50.0);
    }

    #[test]
    fn test_calibration_pair_wire_format() {
        let pair = CalibrationPair::new("stage", GpsCoordinate::new(12.99, 77.59));
        let json = serde_json::to_string(&pair).unwrap();
        assert!(json.contains("\"pinId\":\"stage\""));
        assert!(json.contains("\"latitude\":12.99"));

        let parsed: CalibrationPair =
            serde_json::from_str(r#"{"pointId":"gate","gps":{"latitude":1.0,"longitude":2.0}}"#).unwrap();
        assert_eq!(parsed.point_id, "gate");
        assert_eq!(parsed.gps, GpsCoordinate::new(1.0, 2.0));
    }

    #[test]
    fn test_category_serde_is_lowercase() {
        let json = serde_json::to_string(&Category::Workshop).unwrap();
        assert_eq!(json, "\"workshop\"");
        for category in Category::ALL {
            assert_eq!(category.to_string(), category.as_str());
        }
    }
}
