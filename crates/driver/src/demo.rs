use glam::Vec2;
use rigidframe_common::{Rgba, ScreenTransform};
use rigidframe_kernel::{BodyDesc, ShapeDesc, World};
use rigidframe_render::{Drawable, Scene, SceneConfig};

use crate::FrameError;
use crate::driver::FrameContext;

/// The falling-box demo: a thin static ground slab and one dynamic box above it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoConfig {
    /// m/s².
    pub gravity: Vec2,
    /// Half width and half height of the ground slab, in meters.
    pub ground_half_extents: Vec2,
    pub body_translation: Vec2,
    /// Initial body rotation in radians.
    pub body_rotation: f32,
    pub body_half_extents: Vec2,
    pub body_fill: Rgba,
    pub ground_fill: Rgba,
    pub scene: SceneConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            ground_half_extents: Vec2::new(10.0, 0.1),
            body_translation: Vec2::new(0.5, 10.0),
            body_rotation: 270.0,
            body_half_extents: Vec2::new(5.0, 2.0),
            body_fill: Rgba::from_hex(0x000000),
            ground_fill: Rgba::from_hex(0x000000),
            scene: SceneConfig::default(),
        }
    }
}

/// Build the world and scene for the demo and bundle them into a frame context.
pub fn build_demo(config: &DemoConfig) -> Result<FrameContext<World>, FrameError> {
    let mut world = World::new(config.gravity);

    let ground = config.ground_half_extents;
    world.create_static_collider(&ShapeDesc::cuboid(ground.x, ground.y));

    let body = world.create_rigid_body(
        &BodyDesc::dynamic()
            .with_translation(config.body_translation.x, config.body_translation.y)
            .with_rotation(config.body_rotation),
    );
    let half = config.body_half_extents;
    world.create_collider(&ShapeDesc::cuboid(half.x, half.y), body)?;

    let mut scene = Scene::new(config.scene);
    let transform = ScreenTransform::new(scene.viewport());

    let shape = scene.add_drawable(centered_rect(&transform, half).fill(config.body_fill));

    // The ground never moves, so it is placed once at the simulation origin.
    let origin = transform.to_screen(Vec2::ZERO);
    scene.add_drawable(
        centered_rect(&transform, ground)
            .fill(config.ground_fill)
            .at(origin.x, origin.y),
    );

    tracing::info!(
        "demo scene ready: {}x{} px, body at ({:.2}, {:.2})",
        config.scene.width,
        config.scene.height,
        config.body_translation.x,
        config.body_translation.y
    );

    Ok(FrameContext {
        world,
        body,
        shape,
        scene,
        transform,
    })
}

/// Rectangle of the given half extents (meters) centred on the drawable's origin.
fn centered_rect(transform: &ScreenTransform, half_extents: Vec2) -> Drawable {
    let hx = transform.meters_to_pixels(half_extents.x);
    let hy = transform.meters_to_pixels(half_extents.y);
    Drawable::rectangle(-hx, -hy, hx * 2.0, hy * 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigidframe_common::SCALE;

    #[test]
    fn demo_world_has_ground_and_body() {
        let ctx = build_demo(&DemoConfig::default()).unwrap();
        assert_eq!(ctx.world.body_count(), 1);
        assert_eq!(ctx.world.collider_count(), 2);
        assert_eq!(ctx.world.translation(ctx.body).unwrap(), Vec2::new(0.5, 10.0));
    }

    #[test]
    fn demo_scene_has_box_and_floor() {
        let config = DemoConfig {
            scene: SceneConfig::new(1000, 800),
            ..Default::default()
        };
        let ctx = build_demo(&config).unwrap();
        assert_eq!(ctx.scene.drawable_count(), 2);

        let body = ctx.scene.drawable(ctx.shape).unwrap();
        assert_eq!(body.rect.x, -5.0 * SCALE);
        assert_eq!(body.rect.height, 4.0 * SCALE);

        let (_, floor) = ctx
            .scene
            .drawables()
            .find(|(id, _)| *id != ctx.shape)
            .unwrap();
        assert_eq!(floor.position, Vec2::new(500.0, 400.0));
        assert_eq!(floor.rect.width, 20.0 * SCALE);
    }

    #[test]
    fn transform_uses_scene_viewport() {
        let config = DemoConfig {
            scene: SceneConfig::new(640, 480),
            ..Default::default()
        };
        let ctx = build_demo(&config).unwrap();
        assert_eq!(ctx.transform.viewport().width, 640.0);
        assert_eq!(ctx.transform.scale(), SCALE);
    }
}
