//! Hostile NPC runtime for a 2D side-scroller: discrete tile physics,
//! perception-driven pursuit, cooldown-gated melee, clip selection and
//! camera pan hints, wired into Bevy as plugins.
//!
//! All positions are canvas pixels with y growing downward. Systems mirror
//! them into `Transform` with y flipped.

pub mod ai;
pub mod animations;
pub mod camera;
pub mod combat;
pub mod config;
pub mod enemy;
pub mod error;
pub mod geometry;
pub mod health_bar;
pub mod level;
pub mod physics;
#[cfg(feature = "render")]
pub mod render;
pub mod spawner;

pub mod prelude {
    pub use crate::ai::{AiTuning, Decision, EnemyView, Facing, PlayerTarget, think};
    pub use crate::animations::{
        Animatable, AnimationSet, Animator, ClipSpec, DeferredImageLoading, EnemyClip,
    };
    pub use crate::camera::{CameraFocus, CameraHints, CameraView, Viewport};
    pub use crate::combat::{
        AttackOutcome, CombatState, CombatTarget, CombatTuning, Health, PendingAttackCommit,
        PlayerStruck,
    };
    pub use crate::config::{EnemyConfigPlugin, EnemyTuning, LoadSet};
    pub use crate::enemy::{
        Enemy, EnemyBundle, EnemyDescriptor, EnemyPlugin, EnemySet, Player, PlayerBundle,
        SpriteScale, spawn_enemy,
    };
    pub use crate::error::EnemyError;
    pub use crate::geometry::{CollisionBlock, has_collision, rect_at};
    pub use crate::health_bar::{EnemyDefeated, EnemyHurt, HealthBar};
    pub use crate::level::{CollisionMap, LevelFile, LevelPlugin};
    pub use crate::physics::{Body, BoxLayout, PhysicsContext};
    #[cfg(feature = "render")]
    pub use crate::render::{DebugBoxes, EnemyRenderPlugin};
    pub use crate::spawner::{EnemySpawner, EnemySpawnerPlugin, EnemyTemplate};
}
