//! Calibration workflow: record the device's current position for a point
//!
//! Each run asks the provider for one fresh, high-accuracy fix and stores it
//! as the point's calibration pair, replacing any earlier one. Acquisition
//! failures are returned to the caller and leave the store untouched; there
//! is no automatic retry.

use std::sync::Arc;
use tracing::{info, warn};

use crate::core::CalibrationPair;
use crate::provider::{request_sample, GeoSampleProvider, ProviderOptions};
use crate::storage::CalibrationStore;
use crate::validation::data::CoordinateValidator;
use crate::validation::error::Result;

pub struct CalibrationWorkflow {
    provider: Arc<dyn GeoSampleProvider>,
    options: ProviderOptions,
}

impl std::fmt::Debug for CalibrationWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalibrationWorkflow")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CalibrationWorkflow {
    /// Cached fixes are never accepted, whatever `options` asks for
    pub fn new(provider: Arc<dyn GeoSampleProvider>, options: ProviderOptions) -> Self {
        Self {
            provider,
            options: ProviderOptions {
                high_accuracy: true,
                max_sample_age_ms: 0,
                ..options
            },
        }
    }

    pub fn options(&self) -> ProviderOptions {
        self.options
    }

    /// Acquire a fresh fix and record it for `point_id`
    pub fn calibrate(&self, point_id: &str, store: &mut CalibrationStore) -> Result<CalibrationPair> {
        let gps = request_sample(self.provider.as_ref(), self.options).map_err(|error| {
            warn!(point_id, reason = error.reason(), "calibration fix failed");
            error
        })?;
        CoordinateValidator::validate_wgs84(&gps)?;

        store.put(point_id, gps)?;
        info!(point_id, %gps, total = store.len(), "point calibrated");
        Ok(CalibrationPair::new(point_id, gps))
    }
}
