//! Venue Map Positioning Core
//!
//! Places a device's GPS position on a static venue map image. Admin users
//! calibrate by pairing live GPS fixes with known map pins; three or more
//! pairs give an affine GPS-to-map transform, otherwise a fixed linear
//! normalization around the venue centre is used.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod provider;
pub mod storage;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use core::{CalibrationPair, Category, GpsCoordinate, MapPosition, PointOfInterest, VenueCatalog};
pub use algorithms::{
    haversine_distance, AffineTransform, ControlPoint, CoordinateMapper, MappingMethod, MappingResult,
    ProximityMatcher, TripletSelection, VenueBounds,
};
pub use processing::{PositionTracker, TrackingState};
pub use provider::{request_sample, GeoError, GeoSampleProvider, MockGeoProvider, OnceResponse, ProviderOptions};
pub use storage::{CalibrationStore, FileStore, KeyValueStore, MemoryStore};
pub use validation::{Result, VenueMapError};
pub use utils::{init_logging, ConfigurationManager, VenueMapConfig};
pub use api::{AdminModeGate, CalibrationWorkflow, VenueMap};
