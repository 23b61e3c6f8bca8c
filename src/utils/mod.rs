//! Configuration and logging utilities

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigurationManager, VenueMapConfig};
pub use logging::init_logging;
