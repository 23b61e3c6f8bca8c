//! Core types and constants for the venue map positioning core

pub mod types;
pub mod constants;
pub mod catalog;

pub use types::*;
pub use constants::*;
pub use catalog::VenueCatalog;
