//! Logging setup for the venue map binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! binary's job. The filter is read from `RUST_LOG` and falls back to the
//! level passed in.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber. Returns `false` if one was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .is_ok()
}

/// Default log level when `RUST_LOG` is unset
pub fn default_filter() -> &'static str {
    "info"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        // the first call may lose the race with another test's subscriber
        let _ = init_logging(default_filter());
        assert!(!init_logging(default_filter()));
    }
}
