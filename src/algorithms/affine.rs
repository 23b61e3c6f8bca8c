//! Closed-form affine fit from three GPS/map correspondences
//!
//! The transform maps `(lat, lon)` onto map percentages:
//!
//! ```text
//! x = xc0 * lat + xc1 * lon + xc2
//! y = yc0 * lat + yc1 * lon + yc2
//! ```
//!
//! Coefficients are solved with Cramer's rule on the 3x3 system built from
//! `(lat, lon, 1)` rows. Coordinates are shifted to the first control point
//! before solving; this leaves the determinant unchanged but keeps the
//! arithmetic in the metre-scale range where venue calibrations live.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::core::{GpsCoordinate, MapPosition, MIN_CALIBRATION_POINTS};
use crate::validation::error::{Result, VenueMapError};

/// A calibration pair resolved against the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    pub point_id: String,
    pub gps: GpsCoordinate,
    pub map: MapPosition,
}

/// Which three control points feed the affine fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripletSelection {
    /// First three resolvable pairs in store order
    #[default]
    FirstThree,
    /// Triple spanning the largest triangle in lat/lon space; earliest wins ties
    MaxArea,
}

/// Affine GPS-to-map transform fitted from three control points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    /// Shift applied to inputs before the centred coefficients
    origin: GpsCoordinate,
    /// Coefficients in centred coordinates
    x_centred: Vector3<f64>,
    y_centred: Vector3<f64>,
    /// Determinant of the `(lat, lon, 1)` system
    determinant: f64,
}

impl AffineTransform {
    /// Fit from exactly three control points.
    ///
    /// Fails with `DegenerateCalibration` when `|D| < epsilon`.
    pub fn fit(points: [&ControlPoint; 3], epsilon: f64) -> Result<Self> {
        let origin = points[0].gps;
        let system = centred_system(&points, origin);
        let determinant = system.determinant();

        if !determinant.is_finite() || determinant.abs() < epsilon {
            return Err(VenueMapError::DegenerateCalibration { determinant });
        }

        let xs = Vector3::new(points[0].map.x, points[1].map.x, points[2].map.x);
        let ys = Vector3::new(points[0].map.y, points[1].map.y, points[2].map.y);

        Ok(Self {
            origin,
            x_centred: cramer(&system, determinant, &xs),
            y_centred: cramer(&system, determinant, &ys),
            determinant,
        })
    }

    /// Pick three control points per `selection` and fit them
    pub fn fit_from(points: &[ControlPoint], selection: TripletSelection, epsilon: f64) -> Result<Self> {
        if points.len() < MIN_CALIBRATION_POINTS {
            return Err(VenueMapError::InsufficientCalibration {
                available: points.len(),
                required: MIN_CALIBRATION_POINTS,
            });
        }

        let triple = match selection {
            TripletSelection::FirstThree => [&points[0], &points[1], &points[2]],
            TripletSelection::MaxArea => max_area_triple(points),
        };
        Self::fit(triple, epsilon)
    }

    /// Evaluate at a GPS coordinate (unclamped)
    pub fn apply(&self, gps: &GpsCoordinate) -> MapPosition {
        let row = Vector3::new(
            gps.latitude - self.origin.latitude,
            gps.longitude - self.origin.longitude,
            1.0,
        );
        MapPosition::new(self.x_centred.dot(&row), self.y_centred.dot(&row))
    }

    /// `[xc0, xc1, xc2]` in raw latitude/longitude terms
    pub fn x_coefficients(&self) -> [f64; 3] {
        self.uncentre(&self.x_centred)
    }

    /// `[yc0, yc1, yc2]` in raw latitude/longitude terms
    pub fn y_coefficients(&self) -> [f64; 3] {
        self.uncentre(&self.y_centred)
    }

    pub fn determinant(&self) -> f64 {
        self.determinant
    }

    fn uncentre(&self, c: &Vector3<f64>) -> [f64; 3] {
        [
            c[0],
            c[1],
            c[2] - c[0] * self.origin.latitude - c[1] * self.origin.longitude,
        ]
    }
}

fn centred_system(points: &[&ControlPoint; 3], origin: GpsCoordinate) -> Matrix3<f64> {
    Matrix3::from_fn(|r, c| match c {
        0 => points[r].gps.latitude - origin.latitude,
        1 => points[r].gps.longitude - origin.longitude,
        _ => 1.0,
    })
}

/// Solve `system * k = rhs` column by column with Cramer's rule
fn cramer(system: &Matrix3<f64>, determinant: f64, rhs: &Vector3<f64>) -> Vector3<f64> {
    Vector3::from_fn(|i, _| {
        let mut replaced = *system;
        replaced.set_column(i, rhs);
        replaced.determinant() / determinant
    })
}

fn max_area_triple(points: &[ControlPoint]) -> [&ControlPoint; 3] {
    let mut best = [&points[0], &points[1], &points[2]];
    let mut best_det = f64::NEG_INFINITY;

    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            for k in (j + 1)..points.len() {
                let triple = [&points[i], &points[j], &points[k]];
                let det = centred_system(&triple, points[i].gps).determinant().abs();
                if det > best_det {
                    best_det = det;
                    best = triple;
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DEGENERACY_EPSILON;

    fn control(id: &str, lat: f64, lon: f64, x: f64, y: f64) -> ControlPoint {
        ControlPoint {
            point_id: id.to_string(),
            gps: GpsCoordinate::new(lat, lon),
            map: MapPosition::new(x, y),
        }
    }

    fn reference_triangle() -> Vec<ControlPoint> {
        vec![
            control("a", 10.000, 20.000, 10.0, 10.0),
            control("b", 10.001, 20.000, 10.0, 90.0),
            control("c", 10.0005, 20.002, 90.0, 50.0),
        ]
    }

    #[test]
    fn test_fit_interpolates_control_points() {
        let points = reference_triangle();
        let transform = AffineTransform::fit_from(&points, TripletSelection::FirstThree, DEGENERACY_EPSILON).unwrap();

        for point in &points {
            let mapped = transform.apply(&point.gps);
            assert!((mapped.x - point.map.x).abs() < 1e-6, "{}: x {}", point.point_id, mapped.x);
            assert!((mapped.y - point.map.y).abs() < 1e-6, "{}: y {}", point.point_id, mapped.y);
        }
    }

    #[test]
    fn test_raw_coefficients_match_centred_evaluation() {
        let transform =
            AffineTransform::fit_from(&reference_triangle(), TripletSelection::FirstThree, DEGENERACY_EPSILON).unwrap();
        let xc = transform.x_coefficients();
        let yc = transform.y_coefficients();

        // x depends only on longitude, y only on latitude for this triangle
        assert!(xc[0].abs() < 1e-3);
        assert!((xc[1] - 40_000.0).abs() < 1e-3);
        assert!((yc[0] - 80_000.0).abs() < 1e-3);
        assert!(yc[1].abs() < 1e-3);

        let gps = GpsCoordinate::new(10.0005, 20.001);
        let raw_x = xc[0] * gps.latitude + xc[1] * gps.longitude + xc[2];
        assert!((raw_x - transform.apply(&gps).x).abs() < 1e-4);
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let points = vec![
            control("a", 10.0, 20.000, 10.0, 10.0),
            control("b", 10.0, 20.001, 50.0, 10.0),
            control("c", 10.0, 20.002, 90.0, 10.0),
        ];
        let result = AffineTransform::fit_from(&points, TripletSelection::FirstThree, DEGENERACY_EPSILON);
        assert!(matches!(result, Err(VenueMapError::DegenerateCalibration { .. })));
    }

    #[test]
    fn test_two_points_are_insufficient() {
        let points = &reference_triangle()[..2];
        let result = AffineTransform::fit_from(points, TripletSelection::FirstThree, DEGENERACY_EPSILON);
        assert_eq!(
            result,
            Err(VenueMapError::InsufficientCalibration { available: 2, required: 3 })
        );
    }

    #[test]
    fn test_max_area_skips_collinear_prefix() {
        let mut points = vec![
            control("a", 10.0, 20.000, 10.0, 10.0),
            control("b", 10.0, 20.001, 50.0, 10.0),
            control("c", 10.0, 20.002, 90.0, 10.0),
        ];
        points.push(control("d", 10.001, 20.001, 50.0, 90.0));

        assert!(AffineTransform::fit_from(&points, TripletSelection::FirstThree, DEGENERACY_EPSILON).is_err());

        let transform = AffineTransform::fit_from(&points, TripletSelection::MaxArea, DEGENERACY_EPSILON).unwrap();
        let mapped = transform.apply(&points[3].gps);
        assert!((mapped.x - 50.0).abs() < 1e-6);
        assert!((mapped.y - 90.0).abs() < 1e-6);
    }
}
