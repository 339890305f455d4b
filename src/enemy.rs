// enemy.rs
use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;

use crate::ai::{Facing, run_enemy_ai};
use crate::animations::{
    AnimationSet, Animator, EnemyClip, advance_animators, mark_animators_loaded,
};
use crate::camera::{CameraView, Viewport, apply_camera_hints};
use crate::combat::{CombatState, Health, PlayerStruck, tick_attack_commits};
use crate::config::EnemyTuning;
use crate::error::EnemyError;
use crate::geometry::CollisionBlock;
use crate::health_bar::{EnemyDefeated, EnemyHurt, HealthBar, refresh_health_bars};
use crate::physics::{Body, PhysicsContext};

// ====== Tags & data ======
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    pub class_id: String,
}

/// The single entity enemies perceive and attack.
#[derive(Component, Debug, Default)]
pub struct Player;

/// Draw scale applied to the sprite; collision boxes are not scaled.
#[derive(Component, Debug, Clone, Copy, PartialEq, Deref)]
pub struct SpriteScale(pub f32);

pub const DEFAULT_SPRITE_SCALE: f32 = 0.5;

/// Everything needed to put one enemy into the world.
#[derive(Debug, Clone)]
pub struct EnemyDescriptor {
    pub position: Vec2,
    pub blocks: Arc<[CollisionBlock]>,
    pub class_id: String,
    pub hp_limit: f32,
    pub animations: Arc<AnimationSet>,
    pub scale: f32,
    /// Frame count override for the initial clip.
    pub frame_rate: Option<u32>,
}

impl EnemyDescriptor {
    pub fn new(
        position: Vec2,
        blocks: Arc<[CollisionBlock]>,
        class_id: impl Into<String>,
        hp_limit: f32,
        animations: Arc<AnimationSet>,
    ) -> Self {
        Self {
            position,
            blocks,
            class_id: class_id.into(),
            hp_limit,
            animations,
            scale: DEFAULT_SPRITE_SCALE,
            frame_rate: None,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    /// Validates the descriptor and assembles the components. The enemy
    /// starts facing left on `Idle`, falling, with its first attack a full
    /// cooldown after `now`.
    pub fn build(self, tuning: &EnemyTuning, now: Duration) -> Result<EnemyBundle, EnemyError> {
        if !self.position.is_finite() {
            return Err(EnemyError::NonFinitePosition(self.position));
        }
        if !(self.hp_limit.is_finite() && self.hp_limit > 0.0) {
            return Err(EnemyError::InvalidHealthLimit(self.hp_limit));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(EnemyError::InvalidScale(self.scale));
        }

        let mut animator = Animator::new(self.animations, EnemyClip::Idle.name(Facing::Right))?;
        if let Some(frames) = self.frame_rate {
            animator = animator.with_frame_count(frames);
        }

        Ok(EnemyBundle {
            transform: screen_to_world(self.position, 0.0).with_scale(Vec3::splat(self.scale)),
            name: Name::new(format!("Enemy ({})", self.class_id)),
            enemy: Enemy {
                class_id: self.class_id,
            },
            body: Body::new(self.position, self.blocks),
            facing: Facing::Left,
            combat: CombatState::new(&tuning.combat, now),
            animator,
            health: Health::new(self.hp_limit),
            health_bar: HealthBar::default(),
            scale: SpriteScale(self.scale),
        })
    }
}

// ====== Bundle ======
#[derive(Bundle)]
pub struct EnemyBundle {
    pub enemy: Enemy,
    pub body: Body,
    pub facing: Facing,
    pub combat: CombatState,
    pub animator: Animator,
    pub health: Health,
    pub health_bar: HealthBar,
    pub scale: SpriteScale,
    pub transform: Transform,
    pub name: Name,
}

pub fn spawn_enemy(
    cmd: &mut Commands,
    descriptor: EnemyDescriptor,
    tuning: &EnemyTuning,
    now: Duration,
) -> Result<Entity, EnemyError> {
    let position = descriptor.position;
    let bundle = descriptor.build(tuning, now)?;
    let class_id = bundle.enemy.class_id.clone();
    let e = cmd.spawn(bundle).id();
    info!("spawned enemy {e} ({class_id}) at {position}");
    Ok(e)
}

/// Minimal player: enough for enemies to see, reach and hurt it.
#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: Player,
    pub body: Body,
    pub health: Health,
    pub facing: Facing,
    pub animator: Animator,
    pub transform: Transform,
    pub name: Name,
}

impl PlayerBundle {
    pub fn new(
        position: Vec2,
        blocks: Arc<[CollisionBlock]>,
        hp_limit: f32,
        animations: Arc<AnimationSet>,
        initial_clip: &str,
    ) -> Result<Self, EnemyError> {
        if !position.is_finite() {
            return Err(EnemyError::NonFinitePosition(position));
        }
        if !(hp_limit.is_finite() && hp_limit > 0.0) {
            return Err(EnemyError::InvalidHealthLimit(hp_limit));
        }
        Ok(Self {
            player: Player,
            body: Body::new(position, blocks),
            health: Health::new(hp_limit),
            facing: Facing::Right,
            animator: Animator::new(animations, initial_clip)?,
            transform: screen_to_world(position, 1.0),
            name: Name::new("Player"),
        })
    }
}

/// Canvas coordinates grow downward; Bevy's world y grows upward.
pub fn screen_to_world(position: Vec2, z: f32) -> Transform {
    Transform::from_xyz(position.x, -position.y, z)
}

// ====== Systems ======
/// Per-frame enemy pipeline, run in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemySet {
    Think,
    Integrate,
    Animate,
    Present,
}

fn integrate_bodies(ctx: Res<PhysicsContext>, mut q: Query<&mut Body, With<Enemy>>) {
    for mut body in &mut q {
        body.integrate(&ctx);
    }
}

fn sync_transforms(mut q: Query<(&Body, &mut Transform), Changed<Body>>) {
    for (body, mut t) in &mut q {
        t.translation.x = body.position.x;
        t.translation.y = -body.position.y;
    }
}

// ====== Plugin wiring ======
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemyTuning>()
            .init_resource::<PhysicsContext>()
            .init_resource::<CameraView>()
            .init_resource::<Viewport>()
            .register_type::<Facing>()
            .add_event::<PlayerStruck>()
            .add_event::<EnemyHurt>()
            .add_event::<EnemyDefeated>()
            .configure_sets(
                Update,
                (
                    EnemySet::Think,
                    EnemySet::Integrate,
                    EnemySet::Animate,
                    EnemySet::Present,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    (tick_attack_commits, run_enemy_ai)
                        .chain()
                        .in_set(EnemySet::Think),
                    integrate_bodies.in_set(EnemySet::Integrate),
                    (mark_animators_loaded, advance_animators)
                        .chain()
                        .in_set(EnemySet::Animate),
                    (sync_transforms, refresh_health_bars, apply_camera_hints)
                        .in_set(EnemySet::Present),
                ),
            );
    }
}
