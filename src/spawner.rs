// spawner.rs
use std::sync::Arc;

use bevy::prelude::*;
use rand::{Rng, rng};

use crate::animations::AnimationSet;
use crate::config::EnemyTuning;
use crate::enemy::{Enemy, EnemyDescriptor, spawn_enemy};
use crate::geometry::{CollisionBlock, has_collision};
use crate::level::CollisionMap;
use crate::physics::{BoxLayout, EDGE_EPSILON};

/// What each spawned enemy looks like.
#[derive(Debug, Clone)]
pub struct EnemyTemplate {
    pub class_id: String,
    pub hp_limit: f32,
    pub animations: Arc<AnimationSet>,
}

/// Configuration + timer for periodic enemy spawns.
#[derive(Resource)]
pub struct EnemySpawner {
    pub timer: Timer,
    pub attempts_per_tick: u32,
    pub max_alive: usize,
    pub template: Option<EnemyTemplate>,
}

impl Default for EnemySpawner {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(5.0, TimerMode::Repeating),
            attempts_per_tick: 8,
            max_alive: 4,
            template: None,
        }
    }
}

impl EnemySpawner {
    pub fn with_template(mut self, template: EnemyTemplate) -> Self {
        self.template = Some(template);
        self
    }
}

/// True when no other block covers the tile directly above `block`.
fn has_free_top(block: &CollisionBlock, blocks: &[CollisionBlock]) -> bool {
    let candidate = Rect::new(
        block.left() + EDGE_EPSILON,
        block.top() - EDGE_EPSILON,
        block.right() - EDGE_EPSILON,
        block.top() - EDGE_EPSILON,
    );
    !blocks
        .iter()
        .filter(|other| *other != block)
        .any(|other| has_collision(&candidate, &other.rect))
}

/// Picks a random standable block and returns the body position that rests
/// the hitbox on its top, centred over the block.
pub fn pick_spawn_point<R: Rng + ?Sized>(
    rng: &mut R,
    blocks: &[CollisionBlock],
    layout: BoxLayout,
    attempts: u32,
) -> Option<Vec2> {
    if blocks.is_empty() {
        return None;
    }
    for _ in 0..attempts {
        let block = &blocks[rng.random_range(0..blocks.len())];
        if !has_free_top(block, blocks) {
            continue;
        }
        let hitbox_x = block.rect.center().x - layout.size.x / 2.0;
        let hitbox_y = block.top() - layout.size.y - EDGE_EPSILON;
        return Some(Vec2::new(hitbox_x, hitbox_y) - layout.offset);
    }
    None
}

/// System: tick the spawn timer and spawn when it elapses.
fn tick_enemy_spawner(
    time: Res<Time>,
    tuning: Res<EnemyTuning>,
    map: Res<CollisionMap>,
    mut spawner: ResMut<EnemySpawner>,
    alive: Query<(), With<Enemy>>,
    mut commands: Commands,
) {
    spawner.timer.tick(time.delta());
    if !spawner.timer.just_finished() {
        return;
    }
    let Some(template) = spawner.template.clone() else {
        return;
    };
    if alive.iter().count() >= spawner.max_alive {
        return;
    }

    let Some(position) = pick_spawn_point(
        &mut rng(),
        &map.blocks,
        BoxLayout::HITBOX,
        spawner.attempts_per_tick,
    ) else {
        debug!("EnemySpawner: no free block found this tick");
        return;
    };

    let descriptor = EnemyDescriptor::new(
        position,
        map.blocks.clone(),
        template.class_id,
        template.hp_limit,
        template.animations,
    );
    if let Err(e) = spawn_enemy(&mut commands, descriptor, &tuning, time.elapsed()) {
        error!("EnemySpawner: {e}");
    }
}

/// Tiny plugin to wire everything up.
pub struct EnemySpawnerPlugin;

impl Plugin for EnemySpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemySpawner>()
            .init_resource::<CollisionMap>()
            .add_systems(Update, tick_enemy_spawner);
    }
}
