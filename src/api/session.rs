//! Venue map session: the pieces wired together for one running map

use std::sync::Arc;
use tracing::{debug, warn};

use crate::algorithms::{CoordinateMapper, MappingResult, ProximityMatcher};
use crate::api::admin::AdminModeGate;
use crate::api::calibration::CalibrationWorkflow;
use crate::core::{CalibrationPair, GpsCoordinate, MapPosition, PointOfInterest, VenueCatalog};
use crate::processing::{PositionTracker, TrackingState};
use crate::provider::{request_sample, GeoSampleProvider, ProviderOptions};
use crate::storage::{CalibrationStore, FileStore, KeyValueStore, MemoryStore};
use crate::utils::config::VenueMapConfig;
use crate::validation::error::{Result, VenueMapError};

/// One venue map: catalog, calibrations, live tracking and admin mode.
///
/// Calibration state lives in the session's own store; nothing is global.
pub struct VenueMap {
    catalog: VenueCatalog,
    store: CalibrationStore,
    mapper: CoordinateMapper,
    matcher: ProximityMatcher,
    tracker: PositionTracker,
    workflow: CalibrationWorkflow,
    admin: AdminModeGate,
    provider: Arc<dyn GeoSampleProvider>,
    locate_options: ProviderOptions,
}

impl std::fmt::Debug for VenueMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VenueMap")
            .field("points", &self.catalog.len())
            .field("calibrations", &self.store.len())
            .field("tracking", &self.tracker.state())
            .field("admin", &self.admin.is_enabled())
            .finish()
    }
}

impl VenueMap {
    /// Build a session persisting calibrations into `backend`
    pub fn new(
        config: &VenueMapConfig,
        catalog: VenueCatalog,
        provider: Arc<dyn GeoSampleProvider>,
        backend: Box<dyn KeyValueStore>,
    ) -> Self {
        Self {
            catalog,
            store: CalibrationStore::open_with_key(backend, &config.storage.key),
            mapper: config.mapper(),
            matcher: config.proximity_matcher(),
            tracker: PositionTracker::new(Arc::clone(&provider), config.tracking),
            workflow: CalibrationWorkflow::new(Arc::clone(&provider), config.calibration),
            admin: AdminModeGate::new(config.admin),
            provider,
            locate_options: config.calibration,
        }
    }

    /// Build a session with the backend named by `config.storage`
    pub fn from_config(config: &VenueMapConfig, catalog: VenueCatalog, provider: Arc<dyn GeoSampleProvider>) -> Self {
        let backend: Box<dyn KeyValueStore> = match &config.storage.directory {
            Some(directory) => Box::new(FileStore::new(directory)),
            None => Box::new(MemoryStore::new()),
        };
        Self::new(config, catalog, provider, backend)
    }

    pub fn catalog(&self) -> &VenueCatalog {
        &self.catalog
    }

    pub fn calibrations(&self) -> &[CalibrationPair] {
        self.store.get()
    }

    pub fn store(&self) -> &CalibrationStore {
        &self.store
    }

    pub fn start_tracking(&mut self) -> TrackingState {
        self.tracker.subscribe()
    }

    pub fn stop_tracking(&mut self) {
        self.tracker.unsubscribe();
    }

    pub fn tracking_state(&self) -> TrackingState {
        self.tracker.state()
    }

    /// Last known device coordinate, possibly stale
    pub fn current_location(&self) -> Option<GpsCoordinate> {
        self.tracker.latest()
    }

    /// Map an arbitrary coordinate with the current calibration set
    pub fn map(&self, gps: &GpsCoordinate) -> MapPosition {
        self.mapper.map(gps, self.store.get(), &self.catalog)
    }

    /// Where to draw the "you are here" marker
    pub fn user_position(&self) -> Option<MapPosition> {
        self.user_position_detailed().map(|r| r.position)
    }

    pub fn user_position_detailed(&self) -> Option<MappingResult> {
        let gps = self.tracker.latest()?;
        Some(self.mapper.map_detailed(&gps, self.store.get(), &self.catalog))
    }

    /// Calibrated point the device is standing at, while tracking is live
    pub fn nearby_point(&self) -> Option<&PointOfInterest> {
        let gps = self.tracker.latest().filter(|_| self.tracker.is_live());
        self.matcher
            .find_nearby(gps.as_ref(), self.store.get(), self.catalog.points())
    }

    /// One-shot fresh fix, mapped; the map centres on the result
    pub fn locate_me(&mut self) -> Result<MapPosition> {
        let gps = request_sample(self.provider.as_ref(), self.locate_options).map_err(|error| {
            warn!(reason = error.reason(), "locate-me failed");
            VenueMapError::from(error)
        })?;
        self.tracker.record(gps);
        let result = self.mapper.map_detailed(&gps, self.store.get(), &self.catalog);
        debug!(%gps, x = result.position.x, y = result.position.y, calibrated = result.is_calibrated(), "located");
        Ok(result.position)
    }

    /// Register a tap on the admin unlock target
    pub fn register_admin_tap(&mut self, now_ms: u64) -> bool {
        self.admin.register_tap(now_ms)
    }

    pub fn exit_admin_mode(&mut self) {
        self.admin.exit();
    }

    pub fn is_admin_mode(&self) -> bool {
        self.admin.is_enabled()
    }

    /// Record the current position as `point_id`'s calibration (admin only)
    pub fn calibrate(&mut self, point_id: &str) -> Result<CalibrationPair> {
        if !self.admin.is_enabled() {
            return Err(VenueMapError::AdminModeRequired);
        }
        if !self.catalog.contains(point_id) {
            return Err(VenueMapError::UnknownPoint {
                point_id: point_id.to_string(),
            });
        }
        self.workflow.calibrate(point_id, &mut self.store)
    }
}
