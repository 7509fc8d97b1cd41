//! World Kernel: authoritative physics state, simulation stepping, debug geometry.
//!
//! # Invariants
//! - The kernel owns every rigid body and collider; callers hold handles only.
//! - Simulation space is meters, y-up, counter-clockwise positive rotation.
//! - Debug batches carry two 2D points and two RGBA colors per line segment.

pub mod debug;
pub mod world;

pub use debug::DebugBatch;
pub use world::{
    BodyDesc, BodyHandle, BodyKind, BodyPose, ColliderId, KernelError, ShapeDesc, Simulation,
    World,
};
