//! Playback progress reporting: percentage and `elapsed / total` time label.

/// Format whole seconds as `M:SS`.
pub fn format_clock(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Format a frame position as `M:SS` of elapsed whole seconds.
pub fn format_time(frame_position: u64, frame_rate: u32) -> String {
    if frame_rate == 0 {
        return format_clock(0);
    }
    format_clock(frame_position / frame_rate as u64)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    /// Whole percent in [0, 100]
    pub percent: u16,
    pub elapsed: String,
    pub total: String,
}

impl Default for ProgressReport {
    fn default() -> Self {
        Self {
            percent: 0,
            elapsed: format_clock(0),
            total: format_clock(0),
        }
    }
}

impl ProgressReport {
    pub fn compute(frame_position: u64, frame_length: u64, frame_rate: u32) -> Self {
        let percent = if frame_length == 0 {
            0
        } else {
            ((frame_position as f64 / frame_length as f64 * 100.0) as u16).min(100)
        };

        Self {
            percent,
            elapsed: format_time(frame_position, frame_rate),
            total: format_time(frame_length, frame_rate),
        }
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.elapsed, self.total)
    }
}
