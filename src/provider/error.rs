//! Location acquisition error types

use thiserror::Error;

/// Failure reported by (or about) the device location provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum GeoError {
    /// No location provider is present on this device
    #[error("geolocation not supported")]
    Unsupported,
    /// The user or platform refused location access
    #[error("location permission denied")]
    PermissionDenied,
    /// The provider could not determine a position
    #[error("location unavailable")]
    PositionUnavailable,
    /// No sample arrived within the allowed time
    #[error("location timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Result type for provider operations
pub type GeoResult<T> = Result<T, GeoError>;

/// How a caller should react to an acquisition failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Keep the last known position and wait for the next sample
    KeepLastKnown,
    /// Ask the user to grant location access, then retry manually
    UserIntervention,
    /// Nothing to retry against on this device
    Fail,
}

impl GeoError {
    /// Get the recommended recovery strategy for this error
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            GeoError::Unsupported => RecoveryStrategy::Fail,
            GeoError::PermissionDenied => RecoveryStrategy::UserIntervention,
            GeoError::PositionUnavailable | GeoError::Timeout { .. } => RecoveryStrategy::KeepLastKnown,
        }
    }

    /// Check if a later request could succeed without user action
    pub fn is_recoverable(&self) -> bool {
        matches!(self.recovery_strategy(), RecoveryStrategy::KeepLastKnown)
    }

    /// Short machine-friendly reason, stable across releases
    pub fn reason(&self) -> &'static str {
        match self {
            GeoError::Unsupported => "unsupported",
            GeoError::PermissionDenied => "permission-denied",
            GeoError::PositionUnavailable => "position-unavailable",
            GeoError::Timeout { .. } => "timeout",
        }
    }
}
