//! rodio-backed clips.
//!
//! Each clip is a paused `Sink` fed by a `ClipSource` that replays the decoded
//! track. The source runs on rodio's output thread; it publishes the frame
//! position through an atomic counter, reads the loop flag from an atomic,
//! and posts `EndOfClip` to the event loop when it runs dry.

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
    mpsc,
};
use std::time::Duration;

use crate::clip::{AudioBackend, Clip, ClipId, PlayerEvent};
use crate::decoder::Track;
use crate::error::{PlayerError, Result};

/// Opens clips on the default output device. The device is opened on first
/// use and retried on every `open` until it succeeds, so the player can start
/// without one.
pub struct RodioBackend {
    stream: Option<OutputStream>,
    events: mpsc::Sender<PlayerEvent>,
}

impl RodioBackend {
    pub fn new(events: mpsc::Sender<PlayerEvent>) -> Self {
        let mut backend = Self {
            stream: None,
            events,
        };
        if let Err(e) = backend.output() {
            log::warn!("{e}");
        }
        backend
    }

    pub fn has_output(&self) -> bool {
        self.stream.is_some()
    }

    fn output(&mut self) -> Result<&OutputStream> {
        if self.stream.is_none() {
            let stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| PlayerError::PlaybackEngine(format!("no audio output: {e}")))?;
            log::info!("Opened default audio output");
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| PlayerError::PlaybackEngine("no audio output".into()))
    }
}

impl AudioBackend for RodioBackend {
    type Clip = RodioClip;

    fn open(&mut self, track: &Track, clip_id: ClipId) -> Result<RodioClip> {
        let sink = Sink::connect_new(self.output()?.mixer());
        sink.pause();

        let shared = Arc::new(ClipShared::default());
        let source = ClipSource::new(track, clip_id, Arc::clone(&shared), self.events.clone());
        sink.append(source);

        log::debug!(
            "Opened clip {clip_id}: {} Hz, {} channels",
            track.format.frame_rate,
            track.format.channels
        );

        Ok(RodioClip {
            id: clip_id,
            sink,
            shared,
            frame_length: track.frame_length(),
            frame_rate: track.format.frame_rate,
        })
    }
}

#[derive(Default)]
struct ClipShared {
    frames_played: AtomicU64,
    looping: AtomicBool,
}

pub struct RodioClip {
    id: ClipId,
    sink: Sink,
    shared: Arc<ClipShared>,
    frame_length: u64,
    frame_rate: u32,
}

impl Clip for RodioClip {
    fn id(&self) -> ClipId {
        self.id
    }

    fn start(&mut self) -> Result<()> {
        if self.sink.empty() {
            return Err(PlayerError::PlaybackEngine(format!(
                "clip {} has already finished",
                self.id
            )));
        }
        self.sink.play();
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.pause();
    }

    fn set_looping(&mut self, looping: bool) {
        self.shared.looping.store(looping, Ordering::Relaxed);
    }

    fn frame_position(&self) -> u64 {
        self.shared.frames_played.load(Ordering::Relaxed)
    }

    fn frame_length(&self) -> u64 {
        self.frame_length
    }

    fn frame_rate(&self) -> u32 {
        self.frame_rate
    }
}

struct ClipSource {
    clip_id: ClipId,
    samples: Arc<[f32]>,
    channels: u16,
    sample_rate: u32,
    position: usize,
    shared: Arc<ClipShared>,
    events: mpsc::Sender<PlayerEvent>,
    finished: bool,
}

impl ClipSource {
    fn new(
        track: &Track,
        clip_id: ClipId,
        shared: Arc<ClipShared>,
        events: mpsc::Sender<PlayerEvent>,
    ) -> Self {
        Self {
            clip_id,
            samples: track.samples(),
            channels: track.format.channels.max(1),
            sample_rate: track.format.frame_rate,
            position: 0,
            shared,
            events,
            finished: false,
        }
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            // The receiver is gone only when the player is shutting down
            let _ = self.events.send(PlayerEvent::EndOfClip {
                clip_id: self.clip_id,
            });
        }
    }
}

impl Iterator for ClipSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if self.position >= self.samples.len() {
            if self.shared.looping.load(Ordering::Relaxed) && !self.samples.is_empty() {
                self.position = 0;
                self.shared.frames_played.store(0, Ordering::Relaxed);
            } else {
                self.finish();
                return None;
            }
        }

        let sample = self.samples[self.position];
        self.position += 1;

        let channels = self.channels as usize;
        if self.position % channels == 0 {
            self.shared
                .frames_played
                .store((self.position / channels) as u64, Ordering::Relaxed);
        }

        Some(sample)
    }
}

impl Source for ClipSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        if self.shared.looping.load(Ordering::Relaxed) {
            return None;
        }
        let frames = self.samples.len() as f64 / self.channels as f64;
        Some(Duration::from_secs_f64(frames / self.sample_rate.max(1) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::AudioFormat;
    use hound::SampleFormat;
    use std::path::PathBuf;

    fn is_ci_environment() -> bool {
        std::env::var("CI").is_ok() || std::env::var("GITHUB_ACTIONS").is_ok()
    }

    fn stereo_track(frames: usize) -> Track {
        let format = AudioFormat {
            channels: 2,
            frame_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let samples = (0..frames * 2).map(|i| i as f32 / 100.0).collect();
        Track::new(PathBuf::from("test.wav"), format, samples)
    }

    fn source_for(track: &Track) -> (ClipSource, Arc<ClipShared>, mpsc::Receiver<PlayerEvent>) {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(ClipShared::default());
        (ClipSource::new(track, 7, Arc::clone(&shared), tx), shared, rx)
    }

    #[test]
    fn test_source_counts_whole_frames() {
        let track = stereo_track(4);
        let (mut source, shared, _rx) = source_for(&track);

        source.next();
        assert_eq!(shared.frames_played.load(Ordering::Relaxed), 0);
        source.next();
        assert_eq!(shared.frames_played.load(Ordering::Relaxed), 1);
        source.next();
        source.next();
        assert_eq!(shared.frames_played.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_source_signals_end_once() {
        let track = stereo_track(2);
        let (source, _shared, rx) = source_for(&track);

        let played: Vec<f32> = source.collect();
        assert_eq!(played.len(), 4);
        assert_eq!(rx.try_recv(), Ok(PlayerEvent::EndOfClip { clip_id: 7 }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_source_wraps_when_looping() {
        let track = stereo_track(2);
        let (mut source, shared, rx) = source_for(&track);
        shared.looping.store(true, Ordering::Relaxed);

        for _ in 0..4 {
            source.next();
        }
        assert_eq!(shared.frames_played.load(Ordering::Relaxed), 2);

        // Next sample starts over at frame 0
        assert_eq!(source.next(), Some(0.0));
        assert_eq!(shared.frames_played.load(Ordering::Relaxed), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_loop_disabled_mid_playback_finishes() {
        let track = stereo_track(2);
        let (mut source, shared, rx) = source_for(&track);
        shared.looping.store(true, Ordering::Relaxed);
        for _ in 0..6 {
            source.next();
        }

        shared.looping.store(false, Ordering::Relaxed);
        let rest: Vec<f32> = source.by_ref().collect();
        assert_eq!(rest.len(), 2);
        assert_eq!(rx.try_recv(), Ok(PlayerEvent::EndOfClip { clip_id: 7 }));
    }

    #[test]
    fn test_source_duration() {
        let track = stereo_track(8000);
        let (source, _shared, _rx) = source_for(&track);
        assert_eq!(source.total_duration(), Some(Duration::from_secs(1)));
        assert_eq!(source.channels(), 2);
        assert_eq!(source.sample_rate(), 8000);
    }

    #[test]
    fn test_open_clip_starts_paused() {
        if is_ci_environment() {
            eprintln!("Skipping audio test in CI environment");
            return;
        }
        let (tx, _rx) = mpsc::channel();
        let mut backend = RodioBackend::new(tx);
        if !backend.has_output() {
            eprintln!("No audio device available");
            return;
        }

        let mut clip = backend.open(&stereo_track(8000), 1).unwrap();
        assert!(clip.sink.is_paused());
        assert_eq!(clip.frame_length(), 8000);
        assert_eq!(clip.frame_rate(), 8000);

        clip.start().unwrap();
        assert!(!clip.sink.is_paused());
        clip.stop();
        assert!(clip.sink.is_paused());
    }

    #[test]
    fn test_missing_device_fails_open_not_construction() {
        if is_ci_environment() {
            eprintln!("Skipping audio test in CI environment");
            return;
        }
        let (tx, _rx) = mpsc::channel();
        let mut backend = RodioBackend::new(tx);
        if backend.has_output() {
            return;
        }

        let result = backend.open(&stereo_track(10), 1);
        assert!(matches!(result, Err(PlayerError::PlaybackEngine(_))));
        assert!(!backend.has_output());
    }
}
