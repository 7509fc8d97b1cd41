use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec2;
use rigidframe_common::ScreenTransform;
use rigidframe_kernel::{BodyHandle, Simulation};
use rigidframe_render::{DecodeOptions, Scene, ShapeId, decode_debug_batch, draw_debug_segments};
use serde::Serialize;

use crate::FrameError;
use crate::clock::FrameClock;

/// What happens when a frame fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the error, count it and carry on with the next frame.
    #[default]
    LogAndContinue,
    /// Stop the loop and return the error.
    Halt,
}

/// Tunables for the frame driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Redraw the debug layer from the world's debug geometry every frame.
    pub debug_render: bool,
    pub decode: DecodeOptions,
    pub policy: FailurePolicy,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            debug_render: true,
            decode: DecodeOptions::default(),
            policy: FailurePolicy::default(),
        }
    }
}

/// Everything one frame touches: the world, the tracked body and its drawable,
/// the scene and the meters-to-pixels mapping.
#[derive(Debug)]
pub struct FrameContext<S> {
    pub world: S,
    pub body: BodyHandle,
    pub shape: ShapeId,
    pub scene: Scene,
    pub transform: ScreenTransform,
}

/// Result of one successful frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    /// Body translation in meters.
    pub translation: Vec2,
    /// Body rotation in radians (simulation convention).
    pub rotation: f32,
    /// Where the drawable was placed, in pixels.
    pub screen_position: Vec2,
    pub debug_segments: usize,
}

/// Totals for a finished [`FrameDriver::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub failures: u64,
}

/// Cloneable flag that asks a running loop to stop after the current frame.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives the simulation-to-render cycle.
pub struct FrameDriver<S> {
    ctx: FrameContext<S>,
    config: DriverConfig,
    stop: StopHandle,
    frames: u64,
    failures: u64,
}

impl<S: Simulation> FrameDriver<S> {
    pub fn new(ctx: FrameContext<S>, config: DriverConfig) -> Self {
        Self {
            ctx,
            config,
            stop: StopHandle::new(),
            frames: 0,
            failures: 0,
        }
    }

    pub fn context(&self) -> &FrameContext<S> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut FrameContext<S> {
        &mut self.ctx
    }

    pub fn scene(&self) -> &Scene {
        &self.ctx.scene
    }

    pub fn world(&self) -> &S {
        &self.ctx.world
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn set_debug_render(&mut self, enabled: bool) {
        self.config.debug_render = enabled;
        if !enabled {
            self.ctx.scene.debug_layer_mut().clear();
        }
    }

    /// Handle for stopping [`FrameDriver::run`] from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Frames attempted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames that failed and were skipped.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Run one frame: step, read the pose, place the drawable, redraw debug lines.
    pub fn tick(&mut self) -> Result<FrameReport, FrameError> {
        let frame = self.frames;
        self.frames += 1;
        let _span = tracing::debug_span!("frame", frame).entered();

        self.ctx.world.step()?;

        let pose = self.ctx.world.body_pose(self.ctx.body)?;
        tracing::debug!(
            "rigid-body position: {:.3}, {:.3}",
            pose.translation.x,
            pose.translation.y
        );

        // Simulation rotates counter-clockwise with y up; the screen has y down.
        self.ctx.scene.set_rotation(self.ctx.shape, -pose.rotation)?;
        let screen = self.ctx.transform.to_screen(pose.translation);
        self.ctx
            .scene
            .set_position(self.ctx.shape, screen.x, screen.y)?;

        let debug_segments = if self.config.debug_render {
            self.redraw_debug()?
        } else {
            0
        };

        Ok(FrameReport {
            frame,
            translation: pose.translation,
            rotation: pose.rotation,
            screen_position: screen,
            debug_segments,
        })
    }

    /// Run one frame and apply the failure policy.
    ///
    /// Returns `Ok(None)` for a frame that failed under
    /// [`FailurePolicy::LogAndContinue`].
    pub fn advance(&mut self) -> Result<Option<FrameReport>, FrameError> {
        match self.tick() {
            Ok(report) => Ok(Some(report)),
            Err(e) => match self.config.policy {
                FailurePolicy::Halt => {
                    tracing::error!("frame {} failed, halting: {e}", self.frames - 1);
                    Err(e)
                }
                FailurePolicy::LogAndContinue => {
                    self.failures += 1;
                    tracing::warn!("frame {} failed, skipping: {e}", self.frames - 1);
                    Ok(None)
                }
            },
        }
    }

    /// Clear the debug layer and redraw it from the world's current debug batch.
    /// Returns the number of segments drawn.
    pub fn redraw_debug(&mut self) -> Result<usize, FrameError> {
        let batch = self.ctx.world.debug_render_batch();
        let segments = decode_debug_batch(&batch, self.config.decode)?;
        draw_debug_segments(
            self.ctx.scene.debug_layer_mut(),
            &segments,
            &self.ctx.transform,
        );
        Ok(segments.len())
    }

    /// Drive frames from `clock` until a stop is requested or the clock runs out.
    pub fn run<C: FrameClock>(&mut self, clock: &mut C) -> Result<RunSummary, FrameError> {
        let start_frames = self.frames;
        let start_failures = self.failures;
        tracing::info!("frame loop started");

        while !self.stop.is_stop_requested() {
            let Some(dt) = clock.next_frame() else {
                tracing::debug!("frame clock closed");
                break;
            };
            tracing::trace!(dt_ms = dt.as_secs_f64() * 1000.0, "frame due");
            self.advance()?;
        }

        let summary = RunSummary {
            frames: self.frames - start_frames,
            failures: self.failures - start_failures,
        };
        tracing::info!(
            "frame loop finished: {} frames, {} failures",
            summary.frames,
            summary.failures
        );
        Ok(summary)
    }
}
