//! Error taxonomy for the player.
//!
//! Every failure is reported back to the action that triggered it. The event
//! loop logs it and shows it in the status line; none of these end the process.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// The file could not be read or is not a supported WAV stream.
    #[error("cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// The playback primitive refused to open or start a clip.
    #[error("playback engine error: {0}")]
    PlaybackEngine(String),

    #[error("no audio file loaded")]
    NoBufferLoaded,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PlayerError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
