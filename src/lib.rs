//! Bounce Player: a WAV player with a bouncing amplitude trace.
//!
//! The core modules are UI-free and drive playback through the `Clip` seam;
//! the terminal front end and the rodio backend live behind the `player`
//! feature.

pub mod clip;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod progress;
pub mod sampler;
pub mod timer;
pub mod transport;

#[cfg(feature = "player")]
pub mod player;
