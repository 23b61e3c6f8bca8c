//! Error taxonomy for the venue map core

use thiserror::Error;

use crate::provider::GeoError;
use crate::utils::config::ConfigError;

/// Errors raised by the venue map core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VenueMapError {
    /// No location provider on this device
    #[error("geolocation provider unsupported")]
    ProviderUnsupported,
    /// Location access was refused
    #[error("location permission denied")]
    PermissionDenied,
    /// Provider could not produce a position
    #[error("position unavailable")]
    PositionUnavailable,
    /// No sample within the allowed time
    #[error("location request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    /// Calibration points are collinear or nearly so
    #[error("calibration points are degenerate (determinant {determinant:e})")]
    DegenerateCalibration { determinant: f64 },
    /// Fewer usable calibration points than an affine fit needs
    #[error("insufficient calibration: {available} usable points, {required} required")]
    InsufficientCalibration { available: usize, required: usize },
    /// Stored calibration payload could not be decoded
    #[error("stored calibration data is corrupt: {reason}")]
    PersistenceCorrupt { reason: String },
    /// Stored calibration payload could not be written
    #[error("failed to persist calibration data: {reason}")]
    PersistenceWrite { reason: String },
    /// Point id is not part of the venue catalog
    #[error("unknown point of interest '{point_id}'")]
    UnknownPoint { point_id: String },
    /// Calibration attempted outside admin mode
    #[error("admin mode required")]
    AdminModeRequired,
    /// Coordinate failed range validation
    #[error("invalid coordinate: {reason}")]
    InvalidCoordinate { reason: String },
    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for venue map operations
pub type Result<T> = std::result::Result<T, VenueMapError>;

impl From<GeoError> for VenueMapError {
    fn from(error: GeoError) -> Self {
        match error {
            GeoError::Unsupported => VenueMapError::ProviderUnsupported,
            GeoError::PermissionDenied => VenueMapError::PermissionDenied,
            GeoError::PositionUnavailable => VenueMapError::PositionUnavailable,
            GeoError::Timeout { timeout_ms } => VenueMapError::Timeout { timeout_ms },
        }
    }
}

impl VenueMapError {
    /// Acquisition failures coming from the location provider
    pub fn is_acquisition_error(&self) -> bool {
        matches!(
            self,
            VenueMapError::ProviderUnsupported
                | VenueMapError::PermissionDenied
                | VenueMapError::PositionUnavailable
                | VenueMapError::Timeout { .. }
        )
    }

    /// Failures absorbed by the fallback transform and never shown to users
    pub fn is_calibration_fit_error(&self) -> bool {
        matches!(
            self,
            VenueMapError::DegenerateCalibration { .. } | VenueMapError::InsufficientCalibration { .. }
        )
    }
}
