//! The seam between the transport and the platform playback primitive.
//!
//! A `Clip` is one opened, playable instance of a track. Clips run their
//! sample output on the backend's own thread and only talk back through
//! `PlayerEvent`s posted to the UI thread's channel.

use crate::decoder::Track;
use crate::error::Result;

/// Identifies one opened clip so late notifications from a replaced clip can
/// be told apart from the current one.
pub type ClipId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The clip ran out of frames while not looping.
    EndOfClip { clip_id: ClipId },
}

pub trait Clip {
    fn id(&self) -> ClipId;

    /// Start or resume output from the current frame position.
    fn start(&mut self) -> Result<()>;

    /// Stop output, keeping the frame position for a later `start`.
    fn stop(&mut self);

    /// Wrap to frame 0 at the end instead of finishing. Takes effect
    /// immediately on a running clip.
    fn set_looping(&mut self, looping: bool);

    fn frame_position(&self) -> u64;

    fn frame_length(&self) -> u64;

    fn frame_rate(&self) -> u32;
}

pub trait AudioBackend {
    type Clip: Clip;

    /// Open a stopped clip positioned at frame 0.
    fn open(&mut self, track: &Track, clip_id: ClipId) -> Result<Self::Clip>;
}
