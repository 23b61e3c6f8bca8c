//! Admin mode unlock gesture

use crate::utils::config::AdminConfig;

/// Counts taps on the unlock target; enough taps in quick succession enable
/// admin (calibration) mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminModeGate {
    required_taps: u32,
    tap_window_ms: u64,
    tap_count: u32,
    last_tap_ms: Option<u64>,
    enabled: bool,
}

impl Default for AdminModeGate {
    fn default() -> Self {
        Self::new(AdminConfig::default())
    }
}

impl AdminModeGate {
    pub fn new(config: AdminConfig) -> Self {
        Self {
            required_taps: config.required_taps.max(1),
            tap_window_ms: config.tap_window_ms,
            tap_count: 0,
            last_tap_ms: None,
            enabled: false,
        }
    }

    /// Register a tap at `now_ms`; returns whether admin mode is now on.
    ///
    /// A tap arriving more than the window after the previous one starts a
    /// new count.
    pub fn register_tap(&mut self, now_ms: u64) -> bool {
        let in_window = self
            .last_tap_ms
            .is_some_and(|last| now_ms.saturating_sub(last) <= self.tap_window_ms);

        self.tap_count = if in_window { self.tap_count + 1 } else { 1 };
        self.last_tap_ms = Some(now_ms);

        if self.tap_count >= self.required_taps {
            self.enabled = true;
            self.tap_count = 0;
        }
        self.enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Leave admin mode
    pub fn exit(&mut self) {
        self.enabled = false;
        self.tap_count = 0;
    }

    pub fn tap_count(&self) -> u32 {
        self.tap_count
    }
}
