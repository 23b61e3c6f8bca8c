//! Calibration persistence

pub mod backend;
pub mod calibration;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use calibration::CalibrationStore;
