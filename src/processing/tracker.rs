//! Continuous position tracking state machine
//!
//! ```text
//! Idle -> Subscribed -> { Emitting, Errored }
//! ```
//!
//! A failed sample moves the tracker to `Errored` but keeps the last good
//! coordinate: stale-but-present beats nothing for a venue map.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::GpsCoordinate;
use crate::provider::{GeoError, GeoSampleProvider, ProviderOptions, WatchId};

/// Observable state of a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// No subscription
    Idle,
    /// Subscribed, nothing delivered yet
    Subscribed,
    /// Last delivery was a sample
    Emitting,
    /// Last delivery was a failure, or the provider is missing
    Errored(GeoError),
}

/// Copy of the tracker's shared state at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingSnapshot {
    pub state: TrackingState,
    pub latest: Option<GpsCoordinate>,
    pub samples_received: u64,
    pub errors_received: u64,
}

#[derive(Debug)]
struct Shared {
    /// Bumped on every (un)subscribe; callbacks from older generations are dropped
    generation: u64,
    state: TrackingState,
    latest: Option<GpsCoordinate>,
    samples_received: u64,
    errors_received: u64,
}

/// Owns one continuous watch on a [`GeoSampleProvider`].
///
/// `unsubscribe` releases the watch exactly once no matter how often it is
/// called, and dropping the tracker releases it too.
pub struct PositionTracker {
    provider: Arc<dyn GeoSampleProvider>,
    options: ProviderOptions,
    watch: Option<WatchId>,
    shared: Arc<Mutex<Shared>>,
}

impl std::fmt::Debug for PositionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionTracker")
            .field("options", &self.options)
            .field("watch", &self.watch)
            .field("shared", &*self.shared.lock())
            .finish()
    }
}

impl PositionTracker {
    pub fn new(provider: Arc<dyn GeoSampleProvider>, options: ProviderOptions) -> Self {
        Self {
            provider,
            options,
            watch: None,
            shared: Arc::new(Mutex::new(Shared {
                generation: 0,
                state: TrackingState::Idle,
                latest: None,
                samples_received: 0,
                errors_received: 0,
            })),
        }
    }

    /// Start watching the provider.
    ///
    /// Does nothing when already subscribed. A missing provider leaves the
    /// tracker in `Errored(Unsupported)` until the next subscribe.
    pub fn subscribe(&mut self) -> TrackingState {
        if self.watch.is_some() {
            return self.state();
        }

        let generation = {
            let mut shared = self.shared.lock();
            shared.generation += 1;
            shared.state = TrackingState::Idle;
            shared.generation
        };

        if !self.provider.is_available() {
            return self.fail_subscription(generation, GeoError::Unsupported);
        }

        let on_sample = {
            let shared = Arc::clone(&self.shared);
            Box::new(move |coordinate: GpsCoordinate| {
                let mut shared = shared.lock();
                if shared.generation != generation {
                    return;
                }
                shared.latest = Some(coordinate);
                shared.samples_received += 1;
                shared.state = TrackingState::Emitting;
            })
        };
        let on_error = {
            let shared = Arc::clone(&self.shared);
            Box::new(move |error: GeoError| {
                let mut shared = shared.lock();
                if shared.generation != generation {
                    return;
                }
                shared.errors_received += 1;
                shared.state = TrackingState::Errored(error);
                debug!(reason = error.reason(), "position sample failed");
            })
        };

        match self.provider.subscribe(on_sample, on_error, self.options) {
            Ok(id) => {
                self.watch = Some(id);
                let mut shared = self.shared.lock();
                // a synchronous provider may already have delivered
                if shared.state == TrackingState::Idle {
                    shared.state = TrackingState::Subscribed;
                }
                debug!(watch = id.id(), "position tracking subscribed");
                shared.state
            }
            Err(error) => self.fail_subscription(generation, error),
        }
    }

    fn fail_subscription(&mut self, generation: u64, error: GeoError) -> TrackingState {
        warn!(reason = error.reason(), "position tracking unavailable");
        let mut shared = self.shared.lock();
        if shared.generation == generation {
            shared.state = TrackingState::Errored(error);
        }
        shared.state
    }

    /// Release the watch. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        {
            let mut shared = self.shared.lock();
            shared.generation += 1;
            shared.state = TrackingState::Idle;
        }
        if let Some(id) = self.watch.take() {
            self.provider.unsubscribe(id);
            debug!(watch = id.id(), "position tracking released");
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.watch.is_some()
    }

    pub fn state(&self) -> TrackingState {
        self.shared.lock().state
    }

    /// Last good coordinate, kept across errors
    pub fn latest(&self) -> Option<GpsCoordinate> {
        self.shared.lock().latest
    }

    /// A live (non-errored) position is being delivered
    pub fn is_live(&self) -> bool {
        self.state() == TrackingState::Emitting
    }

    /// Most recent failure reason, if the tracker is errored
    pub fn last_error(&self) -> Option<GeoError> {
        match self.state() {
            TrackingState::Errored(error) => Some(error),
            _ => None,
        }
    }

    /// Record a coordinate obtained out-of-band (e.g. a one-shot request)
    pub fn record(&self, coordinate: GpsCoordinate) {
        self.shared.lock().latest = Some(coordinate);
    }

    pub fn snapshot(&self) -> TrackingSnapshot {
        let shared = self.shared.lock();
        TrackingSnapshot {
            state: shared.state,
            latest: shared.latest,
            samples_received: shared.samples_received,
            errors_received: shared.errors_received,
        }
    }

    pub fn options(&self) -> ProviderOptions {
        self.options
    }
}

impl Drop for PositionTracker {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
