use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::algorithms::{CoordinateMapper, ProximityMatcher, TripletSelection, VenueBounds};
use crate::core::{
    GpsCoordinate, CALIBRATION_STORAGE_KEY, DEFAULT_CENTER_LATITUDE, DEFAULT_CENTER_LONGITUDE, DEFAULT_LAT_DELTA,
    DEFAULT_LON_DELTA, DEGENERACY_EPSILON, EARTH_RADIUS_M, PROXIMITY_THRESHOLD_M,
};
use crate::provider::ProviderOptions;

/// Complete configuration of the venue map core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueMapConfig {
    /// Geographic footprint used by the fallback transform
    pub bounds: BoundsConfig,
    /// Affine fit settings
    pub mapping: MappingConfig,
    /// Nearby-point detection settings
    pub proximity: ProximityConfig,
    /// Options for continuous position tracking
    pub tracking: ProviderOptions,
    /// Options for calibration and locate-me requests
    pub calibration: ProviderOptions,
    /// Admin mode unlock gesture
    pub admin: AdminConfig,
    /// Calibration persistence
    pub storage: StorageConfig,
}

impl Default for VenueMapConfig {
    fn default() -> Self {
        Self {
            bounds: BoundsConfig::default(),
            mapping: MappingConfig::default(),
            proximity: ProximityConfig::default(),
            tracking: ProviderOptions::tracking(),
            calibration: ProviderOptions::calibration(),
            admin: AdminConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Venue footprint: reference centre and spans in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub lat_delta: f64,
    pub lon_delta: f64,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            center_latitude: DEFAULT_CENTER_LATITUDE,
            center_longitude: DEFAULT_CENTER_LONGITUDE,
            lat_delta: DEFAULT_LAT_DELTA,
            lon_delta: DEFAULT_LON_DELTA,
        }
    }
}

impl BoundsConfig {
    pub fn to_bounds(&self) -> VenueBounds {
        VenueBounds::new(
            GpsCoordinate::new(self.center_latitude, self.center_longitude),
            self.lat_delta,
            self.lon_delta,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Determinant magnitude under which a calibration triple is degenerate
    pub degeneracy_epsilon: f64,
    pub triplet_selection: TripletSelection,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            degeneracy_epsilon: DEGENERACY_EPSILON,
            triplet_selection: TripletSelection::FirstThree,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub threshold_m: f64,
    pub earth_radius_m: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold_m: PROXIMITY_THRESHOLD_M,
            earth_radius_m: EARTH_RADIUS_M,
        }
    }
}

/// Tap gesture that unlocks admin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub required_taps: u32,
    /// A gap longer than this restarts the count (milliseconds)
    pub tap_window_ms: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            required_taps: 5,
            tap_window_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key the calibration list is stored under
    pub key: String,
    /// Directory of the file-backed store; in-memory when unset
    pub directory: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: CALIBRATION_STORAGE_KEY.to_string(),
            directory: None,
        }
    }
}

impl VenueMapConfig {
    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.bounds.to_bounds())
            .with_selection(self.mapping.triplet_selection)
            .with_degeneracy_epsilon(self.mapping.degeneracy_epsilon)
    }

    pub fn proximity_matcher(&self) -> ProximityMatcher {
        ProximityMatcher::new(self.proximity.threshold_m, self.proximity.earth_radius_m)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("configuration I/O error: {message}")]
    Io { message: String },
    #[error("configuration format error: {message}")]
    Serialization { message: String },
}

/// Configuration validation result
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn into_result(self) -> Result<(), ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Loads, validates and saves [`VenueMapConfig`]
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: VenueMapConfig,
    config_file_path: Option<PathBuf>,
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a configuration manager with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &VenueMapConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn update_config(&mut self, config: VenueMapConfig) -> Result<(), ConfigError> {
        Self::validate(&config).into_result()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from JSON file; missing sections take defaults
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            message: format!("failed to read config file '{}': {}", path.display(), e),
        })?;

        let config: VenueMapConfig = serde_json::from_str(&content).map_err(|e| ConfigError::Serialization {
            message: format!("failed to parse config file '{}': {}", path.display(), e),
        })?;

        let validation = Self::validate(&config);
        for warning in &validation.warnings {
            tracing::warn!(path = %path.display(), "{}", warning);
        }
        validation.into_result()?;

        self.config = config;
        self.config_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::Serialization {
            message: format!("failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| ConfigError::Io {
            message: format!("failed to write config file '{}': {}", path.display(), e),
        })?;

        self.config_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::Io {
                message: "no file path set for saving configuration".to_string(),
            }),
        }
    }

    /// Check if configuration has been modified since last save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Validate every section, collecting all errors and warnings
    pub fn validate(config: &VenueMapConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let bounds = &config.bounds;
        if !(-90.0..=90.0).contains(&bounds.center_latitude) {
            errors.push(invalid("bounds.center_latitude", bounds.center_latitude, "must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&bounds.center_longitude) {
            errors.push(invalid("bounds.center_longitude", bounds.center_longitude, "must be within [-180, 180]"));
        }
        for (name, delta) in [("bounds.lat_delta", bounds.lat_delta), ("bounds.lon_delta", bounds.lon_delta)] {
            if !(delta.is_finite() && delta > 0.0) {
                errors.push(invalid(name, delta, "must be a positive number of degrees"));
            } else if delta > 1.0 {
                warnings.push(format!("{} = {} spans more than a degree; is this really one venue?", name, delta));
            }
        }

        let epsilon = config.mapping.degeneracy_epsilon;
        if !(epsilon.is_finite() && epsilon >= 0.0) {
            errors.push(invalid("mapping.degeneracy_epsilon", epsilon, "must be a non-negative number"));
        }

        let proximity = &config.proximity;
        if !(proximity.threshold_m.is_finite() && proximity.threshold_m > 0.0) {
            errors.push(invalid("proximity.threshold_m", proximity.threshold_m, "must be positive"));
        } else if proximity.threshold_m > 100.0 {
            warnings.push("proximity threshold above 100 m will match neighbouring pins".to_string());
        }
        if !(proximity.earth_radius_m.is_finite() && proximity.earth_radius_m > 0.0) {
            errors.push(invalid("proximity.earth_radius_m", proximity.earth_radius_m, "must be positive"));
        }

        for (section, options) in [("tracking", &config.tracking), ("calibration", &config.calibration)] {
            if options.timeout_ms == 0 {
                errors.push(invalid(&format!("{}.timeout_ms", section), options.timeout_ms, "must be non-zero"));
            }
        }
        if config.calibration.max_sample_age_ms != 0 {
            errors.push(invalid(
                "calibration.max_sample_age_ms",
                config.calibration.max_sample_age_ms,
                "calibration needs a fresh sample",
            ));
        }
        if !config.calibration.high_accuracy {
            warnings.push("calibration without high accuracy will record coarse fixes".to_string());
        }

        if config.admin.required_taps == 0 {
            errors.push(invalid("admin.required_taps", config.admin.required_taps, "must be at least 1"));
        }

        if config.storage.key.trim().is_empty() {
            errors.push(invalid("storage.key", "''", "must not be empty"));
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

fn invalid<V: ToString>(parameter: &str, value: V, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
