use glam::Vec2;
use rapier2d::prelude::*;

use crate::debug::{BatchBackend, DebugBatch};

/// Errors from world queries and stepping.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("rigid body {0:?} not found")]
    UnknownBody(BodyHandle),
    #[error("collider {0:?} not found")]
    UnknownCollider(ColliderId),
    #[error("simulation diverged at tick {tick}: rigid body {body:?} has a non-finite pose")]
    NonFiniteState { tick: u64, body: BodyHandle },
}

/// Handle to a rigid body owned by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

impl BodyHandle {
    /// A handle that never resolves to a body.
    pub fn invalid() -> Self {
        Self(RigidBodyHandle::invalid())
    }
}

/// Handle to a collider owned by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(ColliderHandle);

/// Collider geometry. Dimensions in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeDesc {
    /// Axis-aligned box given by its half width and half height.
    Cuboid { half_extents: Vec2 },
    Ball { radius: f32 },
}

impl ShapeDesc {
    pub fn cuboid(hx: f32, hy: f32) -> Self {
        Self::Cuboid {
            half_extents: Vec2::new(hx, hy),
        }
    }

    fn builder(&self) -> ColliderBuilder {
        match *self {
            Self::Cuboid { half_extents } => ColliderBuilder::cuboid(half_extents.x, half_extents.y),
            Self::Ball { radius } => ColliderBuilder::ball(radius),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Fixed,
}

/// Rigid body description: kind, initial translation (meters) and rotation (radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub translation: Vec2,
    pub rotation: f32,
}

impl BodyDesc {
    pub fn dynamic() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            translation: Vec2::ZERO,
            rotation: 0.0,
        }
    }

    pub fn fixed() -> Self {
        Self {
            kind: BodyKind::Fixed,
            ..Self::dynamic()
        }
    }

    pub fn with_translation(mut self, x: f32, y: f32) -> Self {
        self.translation = Vec2::new(x, y);
        self
    }

    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }
}

/// Position and orientation of a body in simulation space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub translation: Vec2,
    /// Radians, counter-clockwise positive.
    pub rotation: f32,
}

/// The capabilities the frame driver needs from a physics world.
pub trait Simulation {
    /// Advance the simulation by one timestep.
    fn step(&mut self) -> Result<(), KernelError>;

    /// Current pose of a rigid body.
    fn body_pose(&self, body: BodyHandle) -> Result<BodyPose, KernelError>;

    /// Debug line geometry for the current state.
    fn debug_render_batch(&mut self) -> DebugBatch;
}

/// The authoritative physics world.
///
/// Owns the rapier body and collider sets together with the pipeline state
/// needed to step them. Every mutation goes through an explicit operation.
pub struct World {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    debug_pipeline: DebugRenderPipeline,
    tick: u64,
}

impl World {
    /// Create an empty world with the given gravity (m/s²).
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vector![gravity.x, gravity.y],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            debug_pipeline: DebugRenderPipeline::new(
                DebugRenderStyle::default(),
                DebugRenderMode::default(),
            ),
            tick: 0,
        }
    }

    /// Number of steps taken so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.gravity.x, self.gravity.y)
    }

    /// Length of one step in seconds.
    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Insert a collider that is not attached to any body.
    pub fn create_static_collider(&mut self, shape: &ShapeDesc) -> ColliderId {
        let handle = self.colliders.insert(shape.builder().build());
        tracing::debug!(?shape, "created static collider");
        ColliderId(handle)
    }

    pub fn create_rigid_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let body_type = match desc.kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Fixed => RigidBodyType::Fixed,
        };
        let body = RigidBodyBuilder::new(body_type)
            .translation(vector![desc.translation.x, desc.translation.y])
            .rotation(desc.rotation)
            .build();
        let handle = self.bodies.insert(body);
        tracing::debug!(?desc, "created rigid body");
        BodyHandle(handle)
    }

    /// Attach a collider to an existing body.
    pub fn create_collider(
        &mut self,
        shape: &ShapeDesc,
        body: BodyHandle,
    ) -> Result<ColliderId, KernelError> {
        if !self.bodies.contains(body.0) {
            return Err(KernelError::UnknownBody(body));
        }
        let handle =
            self.colliders
                .insert_with_parent(shape.builder().build(), body.0, &mut self.bodies);
        Ok(ColliderId(handle))
    }

    /// Advance the simulation by one default timestep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.tick += 1;
    }

    pub fn translation(&self, body: BodyHandle) -> Result<Vec2, KernelError> {
        self.body_pose(body).map(|pose| pose.translation)
    }

    /// Rotation in radians, normalised to (-π, π].
    pub fn rotation(&self, body: BodyHandle) -> Result<f32, KernelError> {
        self.body_pose(body).map(|pose| pose.rotation)
    }

    pub fn linear_velocity(&self, body: BodyHandle) -> Result<Vec2, KernelError> {
        let rb = self.bodies.get(body.0).ok_or(KernelError::UnknownBody(body))?;
        let v = rb.linvel();
        Ok(Vec2::new(v.x, v.y))
    }

    /// World-space half extents of a collider's bounding box.
    pub fn collider_half_extents(&self, collider: ColliderId) -> Result<Vec2, KernelError> {
        let c = self
            .colliders
            .get(collider.0)
            .ok_or(KernelError::UnknownCollider(collider))?;
        let aabb = c.compute_aabb();
        let he = aabb.half_extents();
        Ok(Vec2::new(he.x, he.y))
    }

    /// Collect debug line geometry for every collider and body in the world.
    pub fn debug_render_batch(&mut self) -> DebugBatch {
        let mut backend = BatchBackend::default();
        self.debug_pipeline.render(
            &mut backend,
            &self.bodies,
            &self.colliders,
            &self.impulse_joints,
            &self.multibody_joints,
            &self.narrow_phase,
        );
        backend.finish()
    }

    fn first_non_finite_body(&self) -> Option<BodyHandle> {
        self.bodies
            .iter()
            .find(|(_, rb)| {
                let t = rb.translation();
                !(t.x.is_finite() && t.y.is_finite() && rb.rotation().angle().is_finite())
            })
            .map(|(handle, _)| BodyHandle(handle))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -9.81))
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.tick)
            .field("gravity", &self.gravity())
            .field("bodies", &self.bodies.len())
            .field("colliders", &self.colliders.len())
            .finish()
    }
}

impl Simulation for World {
    fn step(&mut self) -> Result<(), KernelError> {
        World::step(self);
        match self.first_non_finite_body() {
            Some(body) => Err(KernelError::NonFiniteState {
                tick: self.tick,
                body,
            }),
            None => Ok(()),
        }
    }

    fn body_pose(&self, body: BodyHandle) -> Result<BodyPose, KernelError> {
        let rb = self.bodies.get(body.0).ok_or(KernelError::UnknownBody(body))?;
        let t = rb.translation();
        Ok(BodyPose {
            translation: Vec2::new(t.x, t.y),
            rotation: rb.rotation().angle(),
        })
    }

    fn debug_render_batch(&mut self) -> DebugBatch {
        World::debug_render_batch(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ground slab plus the falling 10m x 4m box.
    fn falling_box_world() -> (World, BodyHandle) {
        let mut world = World::new(Vec2::new(0.0, -9.81));
        world.create_static_collider(&ShapeDesc::cuboid(10.0, 0.1));
        let body = world.create_rigid_body(
            &BodyDesc::dynamic()
                .with_translation(0.5, 10.0)
                .with_rotation(270.0),
        );
        world
            .create_collider(&ShapeDesc::cuboid(5.0, 2.0), body)
            .unwrap();
        (world, body)
    }

    #[test]
    fn world_starts_empty() {
        let w = World::default();
        assert_eq!(w.tick(), 0);
        assert_eq!(w.body_count(), 0);
        assert_eq!(w.collider_count(), 0);
        assert_eq!(w.gravity(), Vec2::new(0.0, -9.81));
    }

    #[test]
    fn step_increments_tick() {
        let mut w = World::default();
        w.step();
        w.step();
        w.step();
        assert_eq!(w.tick(), 3);
    }

    #[test]
    fn body_starts_at_requested_pose() {
        let mut w = World::default();
        let body = w.create_rigid_body(&BodyDesc::dynamic().with_translation(0.5, 10.0));
        assert_eq!(w.translation(body).unwrap(), Vec2::new(0.5, 10.0));
        assert_eq!(w.rotation(body).unwrap(), 0.0);
    }

    #[test]
    fn rotation_is_normalised() {
        let mut w = World::default();
        let body = w.create_rigid_body(&BodyDesc::dynamic().with_rotation(270.0));
        let r = w.rotation(body).unwrap();
        assert!(r > -std::f32::consts::PI - 1e-4 && r <= std::f32::consts::PI + 1e-4);
        assert!((r.sin() - 270.0_f32.sin()).abs() < 1e-3);
        assert!((r.cos() - 270.0_f32.cos()).abs() < 1e-3);
    }

    #[test]
    fn gravity_pulls_body_down() {
        let mut w = World::default();
        let body = w.create_rigid_body(&BodyDesc::dynamic().with_translation(0.0, 10.0));
        w.create_collider(&ShapeDesc::Ball { radius: 0.5 }, body)
            .unwrap();
        for _ in 0..10 {
            w.step();
        }
        assert!(w.translation(body).unwrap().y < 10.0);
        assert!(w.linear_velocity(body).unwrap().y < 0.0);
    }

    #[test]
    fn unknown_body_is_reported() {
        let mut w = World::default();
        let bogus = BodyHandle::invalid();
        assert!(matches!(
            w.translation(bogus),
            Err(KernelError::UnknownBody(_))
        ));
        assert!(matches!(
            w.create_collider(&ShapeDesc::cuboid(1.0, 1.0), bogus),
            Err(KernelError::UnknownBody(_))
        ));
    }

    #[test]
    fn falling_box_settles_on_ground() {
        let (mut world, body) = falling_box_world();
        let ground_top = 0.1;
        for _ in 0..600 {
            world.step();
            let y = world.translation(body).unwrap().y;
            // Never tunnels below the slab: the box is at least 2m thick.
            assert!(y > ground_top, "tunnelled at tick {}: y={y}", world.tick());
            assert!(y <= 10.0 + 1e-3);
        }
        let settled = world.translation(body).unwrap().y;
        for _ in 0..120 {
            world.step();
        }
        let later = world.translation(body).unwrap().y;
        assert!((settled - later).abs() < 0.05, "{settled} vs {later}");
        // Resting on its long side: centre sits half the box height above the slab.
        assert!(later > ground_top + 1.5 && later < ground_top + 5.5, "y={later}");
    }

    #[test]
    fn debug_batch_is_well_formed() {
        let (mut world, _) = falling_box_world();
        world.step();
        let batch = world.debug_render_batch();
        assert!(!batch.is_empty());
        assert_eq!(batch.vertices.len() % 4, 0);
        assert_eq!(batch.colors.len(), batch.vertices.len() * 2);
        assert!(batch.colors.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn debug_batch_covers_ground_extent() {
        let mut world = World::default();
        world.create_static_collider(&ShapeDesc::cuboid(10.0, 0.1));
        let batch = world.debug_render_batch();
        let max_x = batch
            .vertices
            .chunks(2)
            .map(|p| p[0])
            .fold(f32::MIN, f32::max);
        assert!((max_x - 10.0).abs() < 1e-3);
    }

    #[test]
    fn collider_half_extents_match_shape() {
        let mut world = World::default();
        let ground = world.create_static_collider(&ShapeDesc::cuboid(10.0, 0.1));
        let he = world.collider_half_extents(ground).unwrap();
        assert!((he.x - 10.0).abs() < 1e-4);
        assert!((he.y - 0.1).abs() < 1e-4);
    }

    #[test]
    fn simulation_trait_reports_pose() {
        let (mut world, body) = falling_box_world();
        Simulation::step(&mut world).unwrap();
        let pose = world.body_pose(body).unwrap();
        assert!(pose.translation.y < 10.0);
        assert!(pose.rotation.is_finite());
    }
}
