// physics.rs
use std::sync::Arc;

use bevy::prelude::*;
use serde::Deserialize;

use crate::camera::CameraHints;
use crate::geometry::{CollisionBlock, has_collision, rect_at};

/// Extra distance a corrected box is pushed past the edge it collided with.
pub const EDGE_EPSILON: f32 = 0.01;
/// Vertical velocity set by a jump; negative is up.
pub const JUMP_VELOCITY: f32 = -2.0;

/// Per-frame physics constants injected into every integration step.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsContext {
    pub gravity: f32,
    pub world_width: f32,
    pub world_height: f32,
}

impl Default for PhysicsContext {
    fn default() -> Self {
        Self {
            gravity: 0.1,
            world_width: 576.0,
            world_height: 432.0,
        }
    }
}

impl PhysicsContext {
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.world_width, self.world_height)
    }
}

/// Where a derived box sits relative to the body position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxLayout {
    pub offset: Vec2,
    pub size: Vec2,
}

impl BoxLayout {
    pub const HITBOX: Self = Self::new(Vec2::new(35.0, 26.0), Vec2::new(14.0, 27.0));
    pub const CAMERA_BOX: Self = Self::new(Vec2::new(-50.0, 0.0), Vec2::new(200.0, 80.0));

    pub const fn new(offset: Vec2, size: Vec2) -> Self {
        Self { offset, size }
    }

    pub fn at(&self, position: Vec2) -> Rect {
        rect_at(position + self.offset, self.size)
    }
}

#[derive(Component, Debug, Clone)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    hitbox: Rect,
    camera_box: Rect,
    hitbox_layout: BoxLayout,
    camera_layout: BoxLayout,
    jump_count: u32,
    blocks: Arc<[CollisionBlock]>,
}

impl Body {
    pub fn new(position: Vec2, blocks: Arc<[CollisionBlock]>) -> Self {
        Self::with_layouts(position, blocks, BoxLayout::HITBOX, BoxLayout::CAMERA_BOX)
    }

    pub fn with_layouts(
        position: Vec2,
        blocks: Arc<[CollisionBlock]>,
        hitbox_layout: BoxLayout,
        camera_layout: BoxLayout,
    ) -> Self {
        Self {
            position,
            velocity: Vec2::new(0.0, 1.0),
            hitbox: hitbox_layout.at(position),
            camera_box: camera_layout.at(position),
            hitbox_layout,
            camera_layout,
            jump_count: 0,
            blocks,
        }
    }

    pub fn hitbox(&self) -> Rect {
        self.hitbox
    }

    pub fn camera_box(&self) -> Rect {
        self.camera_box
    }

    pub fn hitbox_layout(&self) -> BoxLayout {
        self.hitbox_layout
    }

    pub fn jump_count(&self) -> u32 {
        self.jump_count
    }

    pub fn blocks(&self) -> &[CollisionBlock] {
        &self.blocks
    }

    /// Moves the body to `position` and refreshes both derived boxes.
    pub fn place(&mut self, position: Vec2) {
        self.position = position;
        self.update_hitbox();
        self.update_camera_box();
    }

    pub fn camera_hints(&self, ctx: &PhysicsContext) -> CameraHints {
        CameraHints {
            camera_box: self.camera_box,
            velocity: self.velocity,
            world_size: ctx.world_size(),
        }
    }

    /// Advances one frame. Axes are moved and resolved one at a time, horizontal
    /// first, so gravity is applied exactly once after horizontal settling.
    pub fn integrate(&mut self, ctx: &PhysicsContext) {
        self.clamp_to_world(ctx);

        self.position.x += self.velocity.x;
        self.update_hitbox();
        self.resolve_horizontal();

        self.velocity.y += ctx.gravity;
        self.position.y += self.velocity.y;
        self.update_hitbox();
        self.resolve_vertical();

        self.update_camera_box();
    }

    /// Stops horizontal motion when the hitbox would cross a world edge.
    pub fn clamp_to_world(&mut self, ctx: &PhysicsContext) -> bool {
        let next_left = self.hitbox.min.x + self.velocity.x;
        let next_right = self.hitbox.max.x + self.velocity.x;
        if next_right >= ctx.world_width || next_left <= 0.0 {
            self.velocity.x = 0.0;
            return true;
        }
        false
    }

    fn update_hitbox(&mut self) {
        self.hitbox = self.hitbox_layout.at(self.position);
    }

    fn update_camera_box(&mut self) {
        self.camera_box = self.camera_layout.at(self.position);
    }

    // Every block overlapping the moved hitbox is a contact and hops the body.
    // Push-out uses the layout, so later contacts never see a corrected box.
    fn resolve_horizontal(&mut self) {
        let moved = self.hitbox;
        let moving_left = self.velocity.x < 0.0;
        let layout = self.hitbox_layout;
        let blocks = Arc::clone(&self.blocks);
        for block in blocks.iter().filter(|b| has_collision(&moved, &b.rect)) {
            self.velocity.x = 0.0;
            self.position.x = if moving_left {
                block.right() - layout.offset.x + EDGE_EPSILON
            } else {
                block.left() - (layout.offset.x + layout.size.x) - EDGE_EPSILON
            };
            log::trace!("wall contact at x={}", self.position.x);
            self.jump();
        }
        self.update_hitbox();
    }

    fn resolve_vertical(&mut self) {
        let blocks = Arc::clone(&self.blocks);
        for block in blocks.iter() {
            if !has_collision(&self.hitbox, &block.rect) {
                continue;
            }
            if self.velocity.y >= 0.0 {
                self.velocity.y = 0.0;
                self.reset_jumps();
                let offset = self.hitbox.min.y - self.position.y + self.hitbox.height();
                self.position.y = block.top() - offset - EDGE_EPSILON;
            } else {
                self.velocity.y = 0.0;
                let offset = self.hitbox.min.y - self.position.y;
                self.position.y = block.bottom() - offset + EDGE_EPSILON;
            }
            self.update_hitbox();
            break;
        }
    }

    fn jump(&mut self) {
        self.velocity.y = JUMP_VELOCITY;
        self.jump_count += 1;
    }

    fn reset_jumps(&mut self) {
        self.jump_count = 0;
    }
}
