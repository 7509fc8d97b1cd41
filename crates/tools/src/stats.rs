use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

/// Rolling frame-time statistics over the last `window` frames.
#[derive(Debug, Clone, Serialize)]
pub struct FrameStats {
    window: usize,
    samples: VecDeque<f64>,
    total_frames: u64,
}

impl FrameStats {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            samples: VecDeque::with_capacity(window),
            total_frames: 0,
        }
    }

    /// Record the duration of one frame.
    pub fn record(&mut self, frame_time: Duration) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(frame_time.as_secs_f64() * 1000.0);
        self.total_frames += 1;
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Most recent frame time in milliseconds.
    pub fn last_ms(&self) -> f64 {
        self.samples.back().copied().unwrap_or(0.0)
    }

    /// Mean frame time over the window in milliseconds.
    pub fn average_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Frames per second implied by the mean frame time.
    pub fn fps(&self) -> f64 {
        let avg = self.average_ms();
        if avg > 0.0 { 1000.0 / avg } else { 0.0 }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(60)
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.1} fps ({:.2} ms avg, {:.2} ms last)",
            self.fps(),
            self.average_ms(),
            self.last_ms()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_are_zero() {
        let stats = FrameStats::default();
        assert_eq!(stats.last_ms(), 0.0);
        assert_eq!(stats.average_ms(), 0.0);
        assert_eq!(stats.fps(), 0.0);
    }

    #[test]
    fn average_and_fps() {
        let mut stats = FrameStats::new(4);
        for _ in 0..4 {
            stats.record(Duration::from_millis(20));
        }
        assert!((stats.average_ms() - 20.0).abs() < 1e-9);
        assert!((stats.fps() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn window_drops_old_samples() {
        let mut stats = FrameStats::new(2);
        stats.record(Duration::from_millis(100));
        stats.record(Duration::from_millis(10));
        stats.record(Duration::from_millis(10));
        assert!((stats.average_ms() - 10.0).abs() < 1e-9);
        assert!((stats.last_ms() - 10.0).abs() < 1e-9);
        assert_eq!(stats.total_frames(), 3);
    }
}
