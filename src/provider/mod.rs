//! Device location provider abstraction
//!
//! The core never talks to platform location APIs directly. It consumes a
//! [`GeoSampleProvider`]: a source of asynchronous, possibly failing
//! latitude/longitude samples, either one-shot or as a continuous watch.

pub mod error;
pub mod mock;

pub use error::{GeoError, GeoResult, RecoveryStrategy};
pub use mock::{MockGeoProvider, OnceResponse};

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use crate::core::GpsCoordinate;

/// Callback for each delivered sample of a watch
pub type SampleCallback = Box<dyn FnMut(GpsCoordinate) + Send>;

/// Callback for each failed sample of a watch
pub type ErrorCallback = Box<dyn FnMut(GeoError) + Send>;

/// Callback for the single sample of a one-shot request
pub type OnceSampleCallback = Box<dyn FnOnce(GpsCoordinate) + Send>;

/// Callback for the failure of a one-shot request
pub type OnceErrorCallback = Box<dyn FnOnce(GeoError) + Send>;

/// Acquisition options understood by providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOptions {
    /// Ask for the most accurate fix the device can give
    pub high_accuracy: bool,
    /// Oldest cached sample the caller will accept (milliseconds, 0 = fresh only)
    pub max_sample_age_ms: u64,
    /// Time allowed for a sample to arrive (milliseconds)
    pub timeout_ms: u64,
}

impl ProviderOptions {
    /// Routine position tracking: battery friendly, tolerates 30 s old fixes
    pub fn tracking() -> Self {
        Self {
            high_accuracy: false,
            max_sample_age_ms: 30_000,
            timeout_ms: 10_000,
        }
    }

    /// Calibration and locate-me: fresh high-accuracy fix only
    pub fn calibration() -> Self {
        Self {
            high_accuracy: true,
            max_sample_age_ms: 0,
            timeout_ms: 10_000,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn max_sample_age(&self) -> Duration {
        Duration::from_millis(self.max_sample_age_ms)
    }
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self::tracking()
    }
}

/// Provider-issued identifier of a continuous watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    pub fn new(id: u64) -> Self {
        WatchId(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Source of device location samples.
///
/// Implementations may deliver callbacks synchronously or from their own
/// thread. A released watch must not deliver further callbacks.
pub trait GeoSampleProvider: Send + Sync {
    /// Whether the device exposes a location provider at all
    fn is_available(&self) -> bool;

    /// Start a continuous watch
    fn subscribe(
        &self,
        on_sample: SampleCallback,
        on_error: ErrorCallback,
        options: ProviderOptions,
    ) -> GeoResult<WatchId>;

    /// Stop a watch; unknown or already released ids are ignored
    fn unsubscribe(&self, id: WatchId);

    /// Request one sample; exactly one of the callbacks fires at most once
    fn request_once(&self, on_sample: OnceSampleCallback, on_error: OnceErrorCallback, options: ProviderOptions);
}

/// Issue a one-shot request and wait for its answer.
///
/// Suspends the caller for at most `options.timeout`; a provider that never
/// answers resolves to [`GeoError::Timeout`]. A provider that drops both
/// callbacks without calling either resolves to `PositionUnavailable`.
pub fn request_sample(provider: &dyn GeoSampleProvider, options: ProviderOptions) -> GeoResult<GpsCoordinate> {
    if !provider.is_available() {
        return Err(GeoError::Unsupported);
    }

    let (tx, rx) = mpsc::channel::<GeoResult<GpsCoordinate>>();
    let error_tx = tx.clone();
    provider.request_once(
        Box::new(move |coordinate| {
            let _ = tx.send(Ok(coordinate));
        }),
        Box::new(move |error| {
            let _ = error_tx.send(Err(error));
        }),
        options,
    );

    match rx.recv_timeout(options.timeout()) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(GeoError::Timeout {
            timeout_ms: options.timeout_ms,
        }),
        Err(RecvTimeoutError::Disconnected) => Err(GeoError::PositionUnavailable),
    }
}
