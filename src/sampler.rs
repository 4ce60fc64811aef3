//! Bouncing amplitude visualization.
//!
//! The sampler walks the raw bytes of the loaded file with a cursor that
//! sweeps forward to the end of the buffer, then backward to the start, and so
//! on. Every tick it reads one byte per bar across the panel and turns it into
//! a bar height. The walk is decorative: it is not tied to the playback
//! position and drifts away from what is audible over time.

use std::time::{Duration, Instant};

use crate::decoder::AudioBuffer;
use crate::error::{PlayerError, Result};
use crate::timer::IntervalTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Running,
}

/// Size of the drawing surface in panel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelSize {
    pub width: u32,
    pub height: u32,
}

impl PanelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Offset into the buffer plus the way it is currently travelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCursor {
    offset: i64,
    direction: Direction,
}

impl Default for ScanCursor {
    fn default() -> Self {
        Self {
            offset: 0,
            direction: Direction::Forward,
        }
    }
}

impl ScanCursor {
    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn read_index(&self, len: usize) -> usize {
        self.offset.clamp(0, len as i64 - 1) as usize
    }

    fn advance(&mut self, step: usize) {
        self.offset += step as i64 * self.direction.sign();
    }

    /// Pull the cursor back inside `[0, len)`, turning it around at either end.
    fn bounce(&mut self, len: usize) {
        if self.offset < 0 {
            self.offset = 0;
            self.direction = Direction::Forward;
        } else if self.offset >= len as i64 {
            self.offset = len as i64 - 1;
            self.direction = Direction::Backward;
        }
    }
}

/// A vertical bar in screen coordinates, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub x: u32,
    pub y_from: u32,
    pub y_to: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmplitudeTrace {
    values: Vec<u32>,
}

impl AmplitudeTrace {
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bar `i` runs from `(i * stride, height)` up to `(i * stride, height - trace[i])`.
    pub fn segments(&self, stride: u32, panel_height: u32) -> Vec<Segment> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &magnitude)| Segment {
                x: i as u32 * stride,
                y_from: panel_height,
                y_to: panel_height.saturating_sub(magnitude),
            })
            .collect()
    }
}

pub struct VisualizationSampler {
    buffer: Option<AudioBuffer>,
    cursor: ScanCursor,
    trace: AmplitudeTrace,
    state: SamplerState,
    frame_step: usize,
    panel: PanelSize,
    stride: u32,
    max_amplitude: i32,
    timer: IntervalTimer,
}

impl VisualizationSampler {
    pub fn new(interval: Duration, stride: u32, max_amplitude: i32) -> Self {
        Self {
            buffer: None,
            cursor: ScanCursor::default(),
            trace: AmplitudeTrace::default(),
            state: SamplerState::Idle,
            frame_step: 0,
            panel: PanelSize::default(),
            stride: stride.max(1),
            max_amplitude: max_amplitude.max(1),
            timer: IntervalTimer::new(interval),
        }
    }

    /// Swap in the bytes of a newly loaded file. Stops the sampler and puts
    /// the cursor back at the start.
    pub fn set_audio_data(&mut self, buffer: AudioBuffer) {
        self.stop();
        self.buffer = Some(buffer);
        self.trace = AmplitudeTrace::default();
        self.reset_cursor();
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = ScanCursor::default();
    }

    pub fn set_panel(&mut self, panel: PanelSize) {
        self.panel = panel;
    }

    pub fn start(&mut self, now: Instant) -> Result<()> {
        let len = match &self.buffer {
            Some(buffer) if !buffer.is_empty() => buffer.len(),
            _ => return Err(PlayerError::NoBufferLoaded),
        };

        self.frame_step = len / self.panel.width.max(1) as usize;
        self.state = SamplerState::Running;
        self.timer.start(now);

        log::debug!(
            "Visualization started: {} bytes, frame step {}, panel {}x{}",
            len,
            self.frame_step,
            self.panel.width,
            self.panel.height
        );
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.state == SamplerState::Running {
            log::debug!("Visualization stopped at offset {}", self.cursor.offset);
        }
        self.state = SamplerState::Idle;
        self.timer.stop();
    }

    /// Run a tick if one is due. Returns true when the trace changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.state == SamplerState::Running && self.timer.fire(now) {
            self.tick();
            true
        } else {
            false
        }
    }

    pub fn tick(&mut self) {
        if self.state != SamplerState::Running {
            return;
        }
        let Some(buffer) = &self.buffer else {
            return;
        };
        let len = buffer.len();
        if len == 0 {
            return;
        }

        self.trace.values.clear();

        let height = self.panel.height as i64;
        let ceiling = 2 * self.max_amplitude as i64;
        let mut x = 0;
        while x < self.panel.width {
            let byte = buffer.as_slice()[self.cursor.read_index(len)] as i64;
            let magnitude = byte.abs() * height / ceiling;
            self.trace.values.push(magnitude as u32);
            self.cursor.advance(self.frame_step);
            x += self.stride;
        }

        self.cursor.bounce(len);
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if self.state == SamplerState::Running {
            self.timer.time_until_due(now)
        } else {
            None
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SamplerState::Running
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn cursor(&self) -> ScanCursor {
        self.cursor
    }

    pub fn trace(&self) -> &AmplitudeTrace {
        &self.trace
    }

    pub fn frame_step(&self) -> usize {
        self.frame_step
    }

    pub fn panel(&self) -> PanelSize {
        self.panel
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler_with(bytes: Vec<i8>, panel: PanelSize, stride: u32) -> VisualizationSampler {
        let mut sampler = VisualizationSampler::new(Duration::from_millis(30), stride, 128);
        sampler.set_panel(panel);
        sampler.set_audio_data(AudioBuffer::from(bytes));
        sampler
    }

    #[test]
    fn test_start_without_buffer() {
        let mut sampler = VisualizationSampler::new(Duration::from_millis(30), 5, 128);
        let result = sampler.start(Instant::now());
        assert!(matches!(result, Err(PlayerError::NoBufferLoaded)));
        assert_eq!(sampler.state(), SamplerState::Idle);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut sampler = sampler_with(vec![1; 100], PanelSize::new(10, 10), 5);
        sampler.start(Instant::now()).unwrap();
        sampler.stop();
        sampler.stop();
        assert_eq!(sampler.state(), SamplerState::Idle);
    }

    #[test]
    fn test_frame_step_fixed_at_start() {
        let mut sampler = sampler_with(vec![0; 1000], PanelSize::new(100, 20), 5);
        sampler.start(Instant::now()).unwrap();
        assert_eq!(sampler.frame_step(), 10);

        sampler.set_panel(PanelSize::new(50, 20));
        sampler.tick();
        assert_eq!(sampler.frame_step(), 10);
        assert_eq!(sampler.trace().len(), 10);
    }

    #[test]
    fn test_magnitude_scaling() {
        // height 256, ceiling 256: magnitude equals |byte|
        let mut sampler = sampler_with(vec![-128, 64, -1, 0], PanelSize::new(4, 256), 1);
        sampler.start(Instant::now()).unwrap();
        sampler.tick();
        assert_eq!(sampler.trace().values(), &[128, 64, 1, 0]);
    }

    #[test]
    fn test_magnitude_uses_integer_division() {
        let mut sampler = sampler_with(vec![100; 10], PanelSize::new(1, 100), 5);
        sampler.start(Instant::now()).unwrap();
        sampler.tick();
        // 100 * 100 / 256 = 39
        assert_eq!(sampler.trace().values(), &[39]);
    }

    #[test]
    fn test_trace_is_rebuilt_each_tick() {
        let mut sampler = sampler_with(vec![10; 1000], PanelSize::new(100, 50), 5);
        sampler.start(Instant::now()).unwrap();
        sampler.tick();
        assert_eq!(sampler.trace().len(), 20);
        sampler.tick();
        assert_eq!(sampler.trace().len(), 20);
    }

    #[test]
    fn test_trace_length_rounds_up() {
        let mut sampler = sampler_with(vec![10; 1000], PanelSize::new(11, 50), 5);
        sampler.start(Instant::now()).unwrap();
        sampler.tick();
        // x = 0, 5, 10
        assert_eq!(sampler.trace().len(), 3);
    }

    #[test]
    fn test_cursor_bounces_at_end() {
        // 20 bytes, width 4, stride 1: step 5, four reads per tick
        let bytes: Vec<i8> = (0..20).collect();
        let mut sampler = sampler_with(bytes, PanelSize::new(4, 256), 1);
        sampler.start(Instant::now()).unwrap();

        sampler.tick();
        assert_eq!(sampler.trace().values(), &[0, 5, 10, 15]);
        assert_eq!(sampler.cursor().offset(), 19);
        assert_eq!(sampler.cursor().direction(), Direction::Backward);

        sampler.tick();
        assert_eq!(sampler.trace().values(), &[19, 14, 9, 4]);
        assert_eq!(sampler.cursor().offset(), 0);
        assert_eq!(sampler.cursor().direction(), Direction::Forward);
    }

    #[test]
    fn test_reads_are_clamped_mid_tick() {
        // 10 bytes started at width 2: step 5. Widened to 4 bars at stride 1,
        // the walk runs past the end before the tick finishes
        let bytes: Vec<i8> = (0..10).collect();
        let mut sampler = sampler_with(bytes, PanelSize::new(2, 256), 1);
        sampler.start(Instant::now()).unwrap();
        sampler.set_panel(PanelSize::new(4, 256));
        sampler.tick();
        assert_eq!(sampler.trace().values(), &[0, 5, 9, 9]);
        assert_eq!(sampler.cursor().offset(), 9);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let bytes: Vec<i8> = (0..97).map(|i| (i % 50) as i8).collect();
        let mut sampler = sampler_with(bytes, PanelSize::new(13, 40), 3);
        sampler.start(Instant::now()).unwrap();

        for _ in 0..500 {
            sampler.tick();
            let offset = sampler.cursor().offset();
            assert!((0..97).contains(&offset), "offset {offset} out of bounds");
        }
    }

    #[test]
    fn test_buffer_shorter_than_panel() {
        let mut sampler = sampler_with(vec![50, 60], PanelSize::new(10, 256), 1);
        sampler.start(Instant::now()).unwrap();
        assert_eq!(sampler.frame_step(), 0);
        sampler.tick();
        assert_eq!(sampler.trace().values(), &[50; 10]);
        assert_eq!(sampler.cursor().offset(), 0);
    }

    #[test]
    fn test_idle_sampler_does_not_tick() {
        let mut sampler = sampler_with(vec![10; 100], PanelSize::new(10, 10), 1);
        sampler.tick();
        assert!(sampler.trace().is_empty());
    }

    #[test]
    fn test_poll_follows_timer() {
        let start = Instant::now();
        let mut sampler = sampler_with(vec![10; 100], PanelSize::new(10, 10), 1);
        sampler.start(start).unwrap();

        assert!(!sampler.poll(start + Duration::from_millis(10)));
        assert!(sampler.poll(start + Duration::from_millis(30)));
        assert_eq!(sampler.trace().len(), 10);

        sampler.stop();
        assert!(!sampler.poll(start + Duration::from_secs(1)));
        assert!(sampler.time_until_due(start).is_none());
    }

    #[test]
    fn test_set_audio_data_resets_cursor() {
        let mut sampler = sampler_with(vec![1; 100], PanelSize::new(10, 10), 1);
        sampler.start(Instant::now()).unwrap();
        sampler.tick();
        assert_ne!(sampler.cursor().offset(), 0);

        sampler.set_audio_data(AudioBuffer::from(vec![2; 50]));
        assert_eq!(sampler.cursor(), ScanCursor::default());
        assert_eq!(sampler.state(), SamplerState::Idle);
        assert!(sampler.trace().is_empty());
    }

    #[test]
    fn test_segments_follow_rendering_contract() {
        let mut sampler = sampler_with(vec![-128, 64], PanelSize::new(2, 256), 1);
        sampler.start(Instant::now()).unwrap();
        sampler.tick();

        let segments = sampler.trace().segments(5, 256);
        assert_eq!(
            segments,
            vec![
                Segment {
                    x: 0,
                    y_from: 256,
                    y_to: 128
                },
                Segment {
                    x: 5,
                    y_from: 256,
                    y_to: 192
                },
            ]
        );
    }
}
