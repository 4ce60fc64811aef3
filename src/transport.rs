//! Playback transport: the Stopped / Playing / Paused state machine.
//!
//! The controller owns the loaded track and the currently open clip, and keeps
//! the visualization sampler and the progress timer in lockstep with the
//! transport. It runs entirely on the event loop thread; the clip's own
//! output thread only reaches it through `PlayerEvent`s.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::clip::{AudioBackend, Clip, ClipId, PlayerEvent};
use crate::config::Config;
use crate::decoder::{self, DecodedAudio, Track};
use crate::error::{PlayerError, Result};
use crate::progress::ProgressReport;
use crate::sampler::{PanelSize, VisualizationSampler};
use crate::timer::IntervalTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// What changed during a poll or event and needs repainting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Redraw {
    pub progress: bool,
    pub visualization: bool,
}

impl Redraw {
    pub fn any(&self) -> bool {
        self.progress || self.visualization
    }
}

/// What happened to playback after a track swap.
#[must_use]
#[derive(Debug)]
pub enum Autoplay {
    /// The player was stopped and stays stopped.
    NotRequested,
    Started,
    /// The new track is loaded but could not be started.
    Failed(PlayerError),
}

pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    track: Option<Track>,
    clip: Option<B::Clip>,
    next_clip_id: ClipId,
    state: PlaybackState,
    looping: bool,
    sampler: VisualizationSampler,
    progress_timer: IntervalTimer,
    progress: ProgressReport,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(backend: B, config: &Config) -> Self {
        Self {
            backend,
            track: None,
            clip: None,
            next_clip_id: 1,
            state: PlaybackState::Stopped,
            looping: false,
            sampler: VisualizationSampler::new(
                config.visualization_interval(),
                config.stride,
                config.max_amplitude,
            ),
            progress_timer: IntervalTimer::new(config.progress_interval()),
            progress: ProgressReport::default(),
        }
    }

    /// Decode `path` and make it the current track. On a decode failure
    /// nothing changes.
    pub fn load(&mut self, path: &Path, now: Instant) -> Result<Autoplay> {
        let decoded = decoder::decode(path)?;
        Ok(self.load_decoded(decoded, now))
    }

    /// Replace the current track. A player that was playing or paused starts
    /// the new track right away; a stopped one stays stopped. The swap itself
    /// cannot fail, so a refused restart is reported in the returned
    /// `Autoplay` with the new track already in place.
    pub fn load_decoded(&mut self, decoded: DecodedAudio, now: Instant) -> Autoplay {
        let was_active = self.state != PlaybackState::Stopped;

        self.close_clip();
        self.progress_timer.stop();
        self.state = PlaybackState::Stopped;

        let DecodedAudio { track, buffer } = decoded;
        self.progress = ProgressReport::compute(0, track.frame_length(), track.format.frame_rate);
        log::info!(
            "Loaded {} ({} frames at {} Hz)",
            track.path.display(),
            track.frame_length(),
            track.format.frame_rate
        );
        self.track = Some(track);
        self.sampler.set_audio_data(buffer);

        if !was_active {
            return Autoplay::NotRequested;
        }
        match self.play(now) {
            Ok(()) => Autoplay::Started,
            Err(e) => Autoplay::Failed(e),
        }
    }

    /// Start the current track from the beginning, replacing any open clip.
    pub fn play(&mut self, now: Instant) -> Result<()> {
        if self.track.is_none() {
            return Err(PlayerError::NoBufferLoaded);
        }

        self.close_clip();
        self.progress_timer.stop();
        self.state = PlaybackState::Stopped;

        let clip_id = self.next_clip_id;
        self.next_clip_id += 1;

        let track = self.track.as_ref().ok_or(PlayerError::NoBufferLoaded)?;
        let mut clip = self.backend.open(track, clip_id)?;
        clip.set_looping(self.looping);
        clip.start()?;
        self.clip = Some(clip);

        self.sampler.reset_cursor();
        self.sampler.start(now)?;
        self.progress_timer.start(now);
        self.state = PlaybackState::Playing;
        self.refresh_progress();

        log::info!("Playing clip {clip_id} (loop {})", on_off(self.looping));
        Ok(())
    }

    /// Pause when playing, resume when paused. Does nothing when stopped.
    pub fn pause(&mut self, now: Instant) -> Result<()> {
        match self.state {
            PlaybackState::Playing => {
                if let Some(clip) = &mut self.clip {
                    clip.stop();
                }
                self.sampler.stop();
                self.progress_timer.stop();
                self.state = PlaybackState::Paused;
                self.refresh_progress();
                log::info!("Paused at {}", self.progress.elapsed);
            }
            PlaybackState::Paused => {
                let clip = self
                    .clip
                    .as_mut()
                    .ok_or_else(|| PlayerError::PlaybackEngine("no open clip to resume".into()))?;
                clip.set_looping(self.looping);
                clip.start()?;
                self.sampler.start(now)?;
                self.progress_timer.start(now);
                self.state = PlaybackState::Playing;
                self.refresh_progress();
                log::info!("Resumed at {}", self.progress.elapsed);
            }
            PlaybackState::Stopped => {
                if self.track.is_none() {
                    return Err(PlayerError::NoBufferLoaded);
                }
                log::debug!("Pause ignored while stopped");
            }
        }
        Ok(())
    }

    pub fn toggle_loop(&mut self) {
        self.looping = !self.looping;
        if let Some(clip) = &mut self.clip {
            clip.set_looping(self.looping);
        }
        log::info!("Loop {}", on_off(self.looping));
    }

    pub fn handle_event(&mut self, event: PlayerEvent) -> Redraw {
        match event {
            PlayerEvent::EndOfClip { clip_id } => self.on_end_of_clip(clip_id),
        }
    }

    fn on_end_of_clip(&mut self, clip_id: ClipId) -> Redraw {
        let current = self.clip.as_ref().map(|clip| clip.id());
        if current != Some(clip_id) {
            log::debug!("Ignoring end of replaced clip {clip_id}");
            return Redraw::default();
        }
        // Paused counts too: a clip can drain its last samples just before
        // the pause reaches it
        if self.state == PlaybackState::Stopped {
            return Redraw::default();
        }

        self.sampler.stop();
        self.progress_timer.stop();
        self.state = PlaybackState::Stopped;
        self.refresh_progress();
        log::info!("Clip {clip_id} reached the end");

        Redraw {
            progress: true,
            visualization: true,
        }
    }

    /// Run whichever timers are due.
    pub fn poll(&mut self, now: Instant) -> Redraw {
        let mut redraw = Redraw::default();
        if self.state == PlaybackState::Playing && self.progress_timer.fire(now) {
            self.refresh_progress();
            redraw.progress = true;
        }
        if self.sampler.poll(now) {
            redraw.visualization = true;
        }
        redraw
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        match (
            self.progress_timer.time_until_due(now),
            self.sampler.time_until_due(now),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn set_panel(&mut self, panel: PanelSize) {
        self.sampler.set_panel(panel);
    }

    fn refresh_progress(&mut self) {
        if let Some(clip) = &self.clip {
            self.progress = ProgressReport::compute(
                clip.frame_position(),
                clip.frame_length(),
                clip.frame_rate(),
            );
        }
    }

    fn close_clip(&mut self) {
        if let Some(mut clip) = self.clip.take() {
            clip.stop();
            log::debug!("Closed clip {}", clip.id());
        }
        self.sampler.stop();
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn clip(&self) -> Option<&B::Clip> {
        self.clip.as_ref()
    }

    pub fn sampler(&self) -> &VisualizationSampler {
        &self.sampler
    }

    pub fn progress(&self) -> &ProgressReport {
        &self.progress
    }

    pub fn progress_ticking(&self) -> bool {
        self.progress_timer.is_running()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}
