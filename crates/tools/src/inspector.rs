use glam::Vec2;
use rigidframe_kernel::{BodyHandle, Simulation, World};
use serde::Serialize;

/// World inspector for developer tooling.
///
/// Read-only queries against the physics world for debugging and overlays.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        WorldSummary {
            tick: world.tick(),
            body_count: world.body_count(),
            collider_count: world.collider_count(),
            gravity: world.gravity().to_array(),
            timestep: world.timestep(),
        }
    }

    /// Pose and velocity of one body, if it exists.
    pub fn inspect_body(world: &World, body: BodyHandle) -> Option<BodyInfo> {
        let pose = world.body_pose(body).ok()?;
        let velocity = world.linear_velocity(body).unwrap_or(Vec2::ZERO);
        Some(BodyInfo {
            translation: pose.translation.to_array(),
            rotation: pose.rotation,
            linear_velocity: velocity.to_array(),
        })
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSummary {
    pub tick: u64,
    pub body_count: usize,
    pub collider_count: usize,
    pub gravity: [f32; 2],
    /// Seconds per step.
    pub timestep: f32,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: tick={} bodies={} colliders={} gravity=({:.2}, {:.2}) dt={:.4}s",
            self.tick,
            self.body_count,
            self.collider_count,
            self.gravity[0],
            self.gravity[1],
            self.timestep
        )
    }
}

/// Detailed info about a single rigid body.
#[derive(Debug, Clone, Serialize)]
pub struct BodyInfo {
    pub translation: [f32; 2],
    pub rotation: f32,
    pub linear_velocity: [f32; 2],
}

impl std::fmt::Display for BodyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Body pos=({:.3}, {:.3}) rot={:.3} vel=({:.3}, {:.3})",
            self.translation[0],
            self.translation[1],
            self.rotation,
            self.linear_velocity[0],
            self.linear_velocity[1],
        )
    }
}
