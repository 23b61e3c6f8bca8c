//! Data validation and error taxonomy

pub mod data;
pub mod error;

pub use data::{CatalogValidator, CoordinateValidator};
pub use error::{Result, VenueMapError};
