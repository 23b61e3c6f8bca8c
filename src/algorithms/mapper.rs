//! GPS-to-map coordinate mapper
//!
//! Chooses between the calibrated affine transform and the fixed venue
//! footprint. Fit failures are never surfaced: the mapper logs them and
//! falls back, then clamps whatever it produced onto the map.

use tracing::debug;

use crate::algorithms::affine::{AffineTransform, ControlPoint, TripletSelection};
use crate::algorithms::fallback::VenueBounds;
use crate::core::{CalibrationPair, GpsCoordinate, MapPosition, VenueCatalog, DEGENERACY_EPSILON};
use crate::validation::error::{Result, VenueMapError};

/// Why the fixed transform was used
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FallbackReason {
    /// Fewer than three calibration pairs resolved against the catalog
    InsufficientCalibration { available: usize },
    /// The selected triple was (nearly) collinear
    DegenerateCalibration { determinant: f64 },
    /// The fit produced a non-finite position for this sample
    NonFiniteFit,
}

/// Which transform produced a mapped position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MappingMethod {
    Calibrated { points: usize },
    Fallback { reason: FallbackReason },
}

/// Mapped position together with the path that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingResult {
    pub position: MapPosition,
    pub method: MappingMethod,
}

impl MappingResult {
    pub fn is_calibrated(&self) -> bool {
        matches!(self.method, MappingMethod::Calibrated { .. })
    }
}

/// Pure mapper from GPS samples to normalized map positions
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    bounds: VenueBounds,
    degeneracy_epsilon: f64,
    selection: TripletSelection,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self {
            bounds: VenueBounds::default(),
            degeneracy_epsilon: DEGENERACY_EPSILON,
            selection: TripletSelection::FirstThree,
        }
    }
}

impl CoordinateMapper {
    pub fn new(bounds: VenueBounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    pub fn with_selection(mut self, selection: TripletSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_degeneracy_epsilon(mut self, epsilon: f64) -> Self {
        self.degeneracy_epsilon = epsilon;
        self
    }

    pub fn bounds(&self) -> &VenueBounds {
        &self.bounds
    }

    pub fn selection(&self) -> TripletSelection {
        self.selection
    }

    /// Pair calibrations with their catalog positions, dropping unknown ids
    pub fn resolve(calibrations: &[CalibrationPair], catalog: &VenueCatalog) -> Vec<ControlPoint> {
        calibrations
            .iter()
            .filter_map(|pair| {
                catalog.get(&pair.point_id).map(|point| ControlPoint {
                    point_id: pair.point_id.clone(),
                    gps: pair.gps,
                    map: point.position(),
                })
            })
            .collect()
    }

    /// Fit the affine transform for the current calibration set
    pub fn fit(&self, calibrations: &[CalibrationPair], catalog: &VenueCatalog) -> Result<AffineTransform> {
        let points = Self::resolve(calibrations, catalog);
        AffineTransform::fit_from(&points, self.selection, self.degeneracy_epsilon)
    }

    /// Map a sample onto the map plane, always within `[0, 100]²`
    pub fn map(&self, gps: &GpsCoordinate, calibrations: &[CalibrationPair], catalog: &VenueCatalog) -> MapPosition {
        self.map_detailed(gps, calibrations, catalog).position
    }

    /// Like [`map`](Self::map), also reporting which transform was used
    pub fn map_detailed(
        &self,
        gps: &GpsCoordinate,
        calibrations: &[CalibrationPair],
        catalog: &VenueCatalog,
    ) -> MappingResult {
        let points = Self::resolve(calibrations, catalog);
        let reason = match AffineTransform::fit_from(&points, self.selection, self.degeneracy_epsilon) {
            Ok(transform) => {
                let position = transform.apply(gps);
                if position.x.is_finite() && position.y.is_finite() {
                    return MappingResult {
                        position: position.clamped(),
                        method: MappingMethod::Calibrated { points: points.len() },
                    };
                }
                FallbackReason::NonFiniteFit
            }
            Err(VenueMapError::InsufficientCalibration { available, .. }) => {
                FallbackReason::InsufficientCalibration { available }
            }
            Err(VenueMapError::DegenerateCalibration { determinant }) => {
                debug!(determinant, "calibration points are collinear, using venue footprint");
                FallbackReason::DegenerateCalibration { determinant }
            }
            Err(other) => {
                debug!(error = %other, "calibration fit failed, using venue footprint");
                FallbackReason::NonFiniteFit
            }
        };

        MappingResult {
            position: self.map_fallback(gps),
            method: MappingMethod::Fallback { reason },
        }
    }

    /// Fixed venue-footprint transform, clamped
    pub fn map_fallback(&self, gps: &GpsCoordinate) -> MapPosition {
        self.bounds.project(gps).clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Category, PointOfInterest};

    fn triangle_catalog() -> VenueCatalog {
        VenueCatalog::new(vec![
            PointOfInterest::new("a", 10.0, 10.0, Category::Info, "A", ""),
            PointOfInterest::new("b", 10.0, 90.0, Category::Info, "B", ""),
            PointOfInterest::new("c", 90.0, 50.0, Category::Info, "C", ""),
            PointOfInterest::new("d", 50.0, 50.0, Category::Info, "D", ""),
        ])
        .unwrap()
    }

    fn triangle_pairs() -> Vec<CalibrationPair> {
        vec![
            CalibrationPair::new("a", GpsCoordinate::new(10.000, 20.000)),
            CalibrationPair::new("b", GpsCoordinate::new(10.001, 20.000)),
            CalibrationPair::new("c", GpsCoordinate::new(10.0005, 20.002)),
        ]
    }

    fn expected_fallback(gps: &GpsCoordinate) -> MapPosition {
        let x = ((gps.longitude - (77.59 - 0.01 / 2.0)) / 0.01) * 100.0;
        let y = 100.0 - ((gps.latitude - (12.99 - 0.01 / 2.0)) / 0.01) * 100.0;
        MapPosition::new(x.clamp(0.0, 100.0), y.clamp(0.0, 100.0))
    }

    #[test]
    fn test_no_calibration_uses_fallback_formula() {
        let mapper = CoordinateMapper::default();
        let catalog = triangle_catalog();

        for gps in [
            GpsCoordinate::new(12.99, 77.59),
            GpsCoordinate::new(12.992, 77.587),
            GpsCoordinate::new(12.9, 77.7),
            GpsCoordinate::new(-33.0, 151.0),
        ] {
            let result = mapper.map_detailed(&gps, &[], &catalog);
            let expected = expected_fallback(&gps);
            assert!((result.position.x - expected.x).abs() < 1e-9);
            assert!((result.position.y - expected.y).abs() < 1e-9);
            assert_eq!(
                result.method,
                MappingMethod::Fallback {
                    reason: FallbackReason::InsufficientCalibration { available: 0 }
                }
            );
        }
    }

    #[test]
    fn test_calibrated_map_reproduces_fit_points() {
        let mapper = CoordinateMapper::default();
        let catalog = triangle_catalog();
        let pairs = triangle_pairs();

        for pair in &pairs {
            let result = mapper.map_detailed(&pair.gps, &pairs, &catalog);
            let expected = catalog.get(&pair.point_id).unwrap().position();
            assert!(result.is_calibrated());
            assert!((result.position.x - expected.x).abs() < 1e-6);
            assert!((result.position.y - expected.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_interior_sample_lands_inside_triangle() {
        let mapper = CoordinateMapper::default();
        let p = mapper.map(&GpsCoordinate::new(10.0005, 20.001), &triangle_pairs(), &triangle_catalog());

        assert!(p.x > 10.0 && p.x < 90.0, "x = {}", p.x);
        assert!(p.y > 10.0 && p.y < 90.0, "y = {}", p.y);
        assert!((p.x - 50.0).abs() < 1e-6);
        assert!((p.y - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_extrapolation_is_clamped() {
        let mapper = CoordinateMapper::default();
        let p = mapper.map(&GpsCoordinate::new(10.01, 19.99), &triangle_pairs(), &triangle_catalog());
        assert!(p.is_on_map());
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 100.0);
    }

    #[test]
    fn test_collinear_calibration_falls_back() {
        let mapper = CoordinateMapper::default();
        let pairs = vec![
            CalibrationPair::new("a", GpsCoordinate::new(12.99, 77.588)),
            CalibrationPair::new("b", GpsCoordinate::new(12.99, 77.590)),
            CalibrationPair::new("c", GpsCoordinate::new(12.99, 77.592)),
        ];
        let gps = GpsCoordinate::new(12.991, 77.589);

        let result = mapper.map_detailed(&gps, &pairs, &triangle_catalog());
        assert!(matches!(
            result.method,
            MappingMethod::Fallback {
                reason: FallbackReason::DegenerateCalibration { .. }
            }
        ));
        assert_eq!(result.position, expected_fallback(&gps));
    }

    #[test]
    fn test_unknown_point_ids_are_discarded() {
        let mapper = CoordinateMapper::default();
        let mut pairs = triangle_pairs();
        pairs.insert(0, CalibrationPair::new("ghost", GpsCoordinate::new(0.0, 0.0)));

        let resolved = CoordinateMapper::resolve(&pairs, &triangle_catalog());
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].point_id, "a");

        let result = mapper.map_detailed(&pairs[1].gps, &pairs, &triangle_catalog());
        assert_eq!(result.method, MappingMethod::Calibrated { points: 3 });

        pairs.truncate(3);
        let result = mapper.map_detailed(&pairs[1].gps, &pairs, &triangle_catalog());
        assert_eq!(
            result.method,
            MappingMethod::Fallback {
                reason: FallbackReason::InsufficientCalibration { available: 2 }
            }
        );
    }

    #[test]
    fn test_output_always_on_map() {
        let mapper = CoordinateMapper::default();
        let catalog = triangle_catalog();
        let pairs = triangle_pairs();
        let samples = [
            GpsCoordinate::new(90.0, 180.0),
            GpsCoordinate::new(-90.0, -180.0),
            GpsCoordinate::new(1e300, -1e300),
            GpsCoordinate::new(10.0, 20.0),
            GpsCoordinate::new(0.0, 0.0),
        ];

        for gps in samples {
            assert!(mapper.map(&gps, &pairs, &catalog).is_on_map(), "{:?}", gps);
            assert!(mapper.map(&gps, &[], &catalog).is_on_map(), "{:?}", gps);
        }
    }
}
