//! Public entry points of the venue map core
//!
//! [`VenueMap`] wires the catalog, calibration store, mapper, proximity
//! matcher and position tracker together. The calibration workflow and the
//! admin gate are usable on their own as well.

pub mod admin;
pub mod calibration;
pub mod session;

pub use admin::AdminModeGate;
pub use calibration::CalibrationWorkflow;
pub use session::VenueMap;
