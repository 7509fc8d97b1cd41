//! Frame Driver: one simulation-render cycle per frame.
//!
//! Each frame steps the world, reads the tracked body's pose, maps it to screen
//! space, updates the tracked drawable and redraws the debug layer.
//!
//! # Invariants
//! - A frame runs to completion before the next one starts; no reentrancy.
//! - Shape rotation is always the negated simulation rotation.
//! - All loop state lives in an explicit `FrameContext`; there are no globals.

mod clock;
mod demo;
mod driver;

pub use clock::{ChannelClock, FixedIntervalClock, FrameClock, ImmediateClock, LimitedClock};
pub use demo::{DemoConfig, build_demo};
pub use driver::{
    DriverConfig, FailurePolicy, FrameContext, FrameDriver, FrameReport, RunSummary, StopHandle,
};

use rigidframe_kernel::KernelError;
use rigidframe_render::RenderError;

/// Errors that abort a single frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("physics: {0}")]
    Kernel(#[from] KernelError),
    #[error("render: {0}")]
    Render(#[from] RenderError),
}
