//! Tuning constants for capture, layout, and retry behavior.
//!
//! The timing and threshold values here are empirically tuned against real
//! grid widgets. They are carried as configuration rather than re-derived;
//! change them only with a reproduction case in hand.

use serde::Deserialize;

/// Idle window after the last keystroke before a non-composing capture
/// resolves with its plain buffer (the ASCII fast path).
pub const ASCII_IDLE_MS: u32 = 180;

/// Bounded wait for the grid's real editor input to appear after editing
/// is requested.
pub const EDITOR_WAIT_MS: u32 = 1000;

/// Window after a lone paste signal before the paste-exit pending flag
/// clears itself.
pub const PASTE_RESET_MS: u32 = 250;

/// Delay between repeated stop-editing attempts after a paste.
pub const PASTE_RETRY_MS: u32 = 24;

/// Stop-editing attempts per paste cycle before giving up silently.
pub const PASTE_MAX_ATTEMPTS: u8 = 6;

/// Debounce window for container resize activity.
pub const RESIZE_DEBOUNCE_MS: u32 = 160;

/// Sub-pixel size changes below this are ignored, which breaks feedback
/// loops caused by our own layout writes.
pub const RESIZE_EPSILON_PX: f32 = 0.5;

/// Lower bound for any column width.
pub const MIN_COL_WIDTH: f32 = 50.0;

/// Upper bound for automatically sized columns. Manual widths may exceed it.
pub const MAX_COL_WIDTH: f32 = 600.0;

/// Minimum-fill target as a fraction of container width.
pub const MIN_FILL_RATIO: f32 = 0.9;

/// Convergence tolerance for iterative width redistribution.
pub const FILL_TOLERANCE_PX: f32 = 0.5;

/// The short settle delays the enter coordinator runs before invoking the
/// external add-row callback (immediate tick, then a second tick).
pub const ENTER_SETTLE_MS: [u32; 2] = [0, 10];

/// Runtime configuration for an interaction controller.
///
/// Defaults reproduce the tuned constants above. Hosts may override
/// individual fields via the JS-side config object.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub ascii_idle_ms: u32,
    pub editor_wait_ms: u32,
    pub paste_reset_ms: u32,
    pub paste_retry_ms: u32,
    pub paste_max_attempts: u8,
    pub resize_debounce_ms: u32,
    pub resize_epsilon_px: f32,
    pub min_col_width: f32,
    pub max_col_width: f32,
    pub min_fill_ratio: f32,
    pub fill_tolerance_px: f32,
    /// Log verbosity, injected at construction instead of a process-wide
    /// debug flag. Serialized as the usual level names.
    #[serde(with = "level_filter_serde")]
    pub verbosity: log::LevelFilter,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            ascii_idle_ms: ASCII_IDLE_MS,
            editor_wait_ms: EDITOR_WAIT_MS,
            paste_reset_ms: PASTE_RESET_MS,
            paste_retry_ms: PASTE_RETRY_MS,
            paste_max_attempts: PASTE_MAX_ATTEMPTS,
            resize_debounce_ms: RESIZE_DEBOUNCE_MS,
            resize_epsilon_px: RESIZE_EPSILON_PX,
            min_col_width: MIN_COL_WIDTH,
            max_col_width: MAX_COL_WIDTH,
            min_fill_ratio: MIN_FILL_RATIO,
            fill_tolerance_px: FILL_TOLERANCE_PX,
            verbosity: log::LevelFilter::Warn,
        }
    }
}

mod level_filter_serde {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<log::LevelFilter, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(match name.to_ascii_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Warn,
        })
    }
}
