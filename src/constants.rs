//! Project-wide constants used across multiple modules.
//!
//! Defaults for the configurable tunables live here so the config layer and
//! the tests agree on them.

/// Interval between progress bar refreshes while playing
pub const PROGRESS_INTERVAL_MS: u64 = 500;

/// Interval between visualization sampler ticks
pub const VISUALIZATION_INTERVAL_MS: u64 = 30;

/// Horizontal distance between two amplitude bars, in panel units
pub const DEFAULT_STRIDE: u32 = 2;

/// Byte amplitude ceiling for 8-bit-scale samples
pub const MAX_AMPLITUDE: i32 = 128;

/// The only container the picker offers
pub const SUPPORTED_AUDIO_EXTENSIONS: &[&str] = &["wav"];

/// Log destination; the terminal itself belongs to the UI
pub const DEFAULT_LOG_FILE: &str = "/tmp/bounce-player.log";

/// Upper bound on how long the event loop waits for input
pub const INPUT_POLL_MS: u64 = 50;
