// camera.rs
use bevy::prelude::*;

use crate::physics::{Body, PhysicsContext};

/// Scroll offset of the scene camera, in canvas pixels. Pans subtract velocity
/// from it, so it is usually zero or negative.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraView {
    pub offset: Vec2,
}

/// Size of the drawing surface the scene renders into.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub size: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            size: Vec2::new(1024.0, 576.0),
        }
    }
}

/// Tag an enemy whose movement should steer the scene camera.
#[derive(Component, Debug, Default)]
pub struct CameraFocus;

/// Snapshot of what the pan queries need from a body.
///
/// Each query is independent and advisory: it nudges the camera by the body's
/// velocity when its camera box crosses a quarter-viewport threshold, and does
/// nothing near the matching world edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraHints {
    pub camera_box: Rect,
    pub velocity: Vec2,
    pub world_size: Vec2,
}

impl CameraHints {
    pub fn should_pan_left(&self, viewport: Vec2, camera: &mut CameraView) -> bool {
        let right_side = self.camera_box.max.x;
        if right_side >= self.world_size.x {
            return false;
        }
        if right_side >= viewport.x / 4.0 + camera.offset.x.abs() {
            camera.offset.x -= self.velocity.x;
            return true;
        }
        false
    }

    pub fn should_pan_right(&self, _viewport: Vec2, camera: &mut CameraView) -> bool {
        let left_side = self.camera_box.min.x;
        if left_side <= 0.0 {
            return false;
        }
        if left_side <= camera.offset.x.abs() {
            camera.offset.x -= self.velocity.x;
            return true;
        }
        false
    }

    pub fn should_pan_down(&self, viewport: Vec2, camera: &mut CameraView) -> bool {
        let top = self.camera_box.min.y;
        if top + self.velocity.y <= 0.0 {
            return false;
        }
        if top <= camera.offset.y.abs() + viewport.y / 4.0 {
            camera.offset.y -= self.velocity.y;
            return true;
        }
        false
    }

    pub fn should_pan_up(&self, viewport: Vec2, camera: &mut CameraView) -> bool {
        let bottom = self.camera_box.max.y;
        if bottom + self.velocity.y >= self.world_size.y {
            return false;
        }
        if bottom >= camera.offset.y.abs() + viewport.y / 4.0 {
            camera.offset.y -= self.velocity.y;
            return true;
        }
        false
    }
}

/// Runs the pan queries for every focused body, picking the query that matches
/// its direction of travel. With several focused bodies the last one wins.
pub(crate) fn apply_camera_hints(
    ctx: Res<PhysicsContext>,
    viewport: Res<Viewport>,
    mut camera: ResMut<CameraView>,
    focused: Query<&Body, With<CameraFocus>>,
) {
    for body in &focused {
        let hints = body.camera_hints(&ctx);
        if body.velocity.x < 0.0 {
            hints.should_pan_right(viewport.size, &mut camera);
        } else if body.velocity.x > 0.0 {
            hints.should_pan_left(viewport.size, &mut camera);
        }
        if body.velocity.y < 0.0 {
            hints.should_pan_down(viewport.size, &mut camera);
        } else if body.velocity.y > 0.0 {
            hints.should_pan_up(viewport.size, &mut camera);
        }
    }
}
