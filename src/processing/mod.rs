//! Continuous position tracking

pub mod tracker;

pub use tracker::{PositionTracker, TrackingSnapshot, TrackingState};
