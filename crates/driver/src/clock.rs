use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

/// Source of frame callbacks.
///
/// `next_frame` blocks until the next frame is due and returns the time
/// elapsed since the previous one, or `None` once no more frames will come.
pub trait FrameClock {
    fn next_frame(&mut self) -> Option<Duration>;

    /// Stop after `frames` more frames.
    fn take_frames(self, frames: u64) -> LimitedClock<Self>
    where
        Self: Sized,
    {
        LimitedClock {
            inner: self,
            remaining: frames,
        }
    }
}

/// Sleeps to keep a fixed cadence (60 Hz by default).
#[derive(Debug, Clone)]
pub struct FixedIntervalClock {
    interval: Duration,
    last: Option<Instant>,
}

impl FixedIntervalClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn from_hz(hz: f64) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / hz.max(f64::EPSILON)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedIntervalClock {
    fn default() -> Self {
        Self::from_hz(60.0)
    }
}

impl FrameClock for FixedIntervalClock {
    fn next_frame(&mut self) -> Option<Duration> {
        let Some(last) = self.last else {
            // First frame fires immediately.
            self.last = Some(Instant::now());
            return Some(Duration::ZERO);
        };
        let due = last + self.interval;
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
        let now = Instant::now();
        self.last = Some(now);
        Some(now.saturating_duration_since(last))
    }
}

/// Fires every frame immediately, reporting a constant delta. Used for headless runs.
#[derive(Debug, Clone, Copy)]
pub struct ImmediateClock {
    dt: Duration,
}

impl ImmediateClock {
    pub fn new(dt: Duration) -> Self {
        Self { dt }
    }
}

impl Default for ImmediateClock {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(1.0 / 60.0))
    }
}

impl FrameClock for ImmediateClock {
    fn next_frame(&mut self) -> Option<Duration> {
        Some(self.dt)
    }
}

/// One frame per message received; ends when every sender is dropped.
#[derive(Debug)]
pub struct ChannelClock {
    rx: Receiver<()>,
    last: Instant,
}

impl ChannelClock {
    pub fn new(rx: Receiver<()>) -> Self {
        Self {
            rx,
            last: Instant::now(),
        }
    }
}

impl FrameClock for ChannelClock {
    fn next_frame(&mut self) -> Option<Duration> {
        self.rx.recv().ok()?;
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        Some(dt)
    }
}

/// Wraps another clock and ends after a fixed number of frames.
#[derive(Debug, Clone)]
pub struct LimitedClock<C> {
    inner: C,
    remaining: u64,
}

impl<C> LimitedClock<C> {
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl<C: FrameClock> FrameClock for LimitedClock<C> {
    fn next_frame(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.inner.next_frame()
    }
}
