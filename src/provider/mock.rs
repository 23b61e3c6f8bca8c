//! Mock location provider for testing and development

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::core::GpsCoordinate;
use crate::provider::{
    ErrorCallback, GeoError, GeoResult, GeoSampleProvider, OnceErrorCallback, OnceSampleCallback, ProviderOptions,
    SampleCallback, WatchId,
};

/// Scripted answer to the next one-shot request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OnceResponse {
    Sample(GpsCoordinate),
    Fail(GeoError),
    /// Never answer; the caller's timeout has to fire
    Silent,
}

struct Watcher {
    on_sample: SampleCallback,
    on_error: ErrorCallback,
    options: ProviderOptions,
}

#[derive(Default)]
struct MockState {
    available: bool,
    next_id: u64,
    watchers: HashMap<WatchId, Watcher>,
    once_responses: VecDeque<OnceResponse>,
    once_requests: Vec<ProviderOptions>,
    releases: HashMap<WatchId, u32>,
    /// Callbacks of silent requests, kept alive so the channel stays open
    parked: Vec<(OnceSampleCallback, OnceErrorCallback)>,
}

/// Mock provider; clones share the same state.
///
/// Watch callbacks run synchronously on the thread calling
/// [`emit_sample`](Self::emit_sample) / [`emit_error`](Self::emit_error).
#[derive(Clone)]
pub struct MockGeoProvider {
    state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockGeoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockGeoProvider")
            .field("available", &state.available)
            .field("active_watches", &state.watchers.len())
            .field("queued_responses", &state.once_responses.len())
            .finish()
    }
}

impl Default for MockGeoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGeoProvider {
    /// Create an available mock provider
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                available: true,
                ..MockState::default()
            })),
        }
    }

    /// Create a provider that reports no location support
    pub fn unavailable() -> Self {
        let provider = Self::new();
        provider.state.lock().available = false;
        provider
    }

    /// Queue the answer for the next one-shot request
    pub fn push_once_response(&self, response: OnceResponse) {
        self.state.lock().once_responses.push_back(response);
    }

    /// Deliver a sample to every active watch
    pub fn emit_sample(&self, coordinate: GpsCoordinate) {
        let mut state = self.state.lock();
        for watcher in state.watchers.values_mut() {
            (watcher.on_sample)(coordinate);
        }
    }

    /// Deliver an error to every active watch
    pub fn emit_error(&self, error: GeoError) {
        let mut state = self.state.lock();
        for watcher in state.watchers.values_mut() {
            (watcher.on_error)(error);
        }
    }

    pub fn active_watch_count(&self) -> usize {
        self.state.lock().watchers.len()
    }

    /// Options of the active watch with this id
    pub fn watch_options(&self, id: WatchId) -> Option<ProviderOptions> {
        self.state.lock().watchers.get(&id).map(|w| w.options)
    }

    /// How many times `unsubscribe` released this watch
    pub fn release_count(&self, id: WatchId) -> u32 {
        self.state.lock().releases.get(&id).copied().unwrap_or(0)
    }

    /// Options of every one-shot request received so far
    pub fn once_requests(&self) -> Vec<ProviderOptions> {
        self.state.lock().once_requests.clone()
    }
}

impl GeoSampleProvider for MockGeoProvider {
    fn is_available(&self) -> bool {
        self.state.lock().available
    }

    fn subscribe(
        &self,
        on_sample: SampleCallback,
        on_error: ErrorCallback,
        options: ProviderOptions,
    ) -> GeoResult<WatchId> {
        let mut state = self.state.lock();
        if !state.available {
            return Err(GeoError::Unsupported);
        }
        state.next_id += 1;
        let id = WatchId::new(state.next_id);
        state.watchers.insert(
            id,
            Watcher {
                on_sample,
                on_error,
                options,
            },
        );
        Ok(id)
    }

    fn unsubscribe(&self, id: WatchId) {
        let mut state = self.state.lock();
        if state.watchers.remove(&id).is_some() {
            *state.releases.entry(id).or_insert(0) += 1;
        }
    }

    fn request_once(&self, on_sample: OnceSampleCallback, on_error: OnceErrorCallback, options: ProviderOptions) {
        let response = {
            let mut state = self.state.lock();
            state.once_requests.push(options);
            if !state.available {
                Some(OnceResponse::Fail(GeoError::Unsupported))
            } else {
                state.once_responses.pop_front()
            }
        };

        match response {
            Some(OnceResponse::Sample(coordinate)) => on_sample(coordinate),
            Some(OnceResponse::Fail(error)) => on_error(error),
            Some(OnceResponse::Silent) => self.state.lock().parked.push((on_sample, on_error)),
            None => on_error(GeoError::PositionUnavailable),
        }
    }
}
