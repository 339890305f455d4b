//! Shared fixtures for the headless app tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use skirmisher::prelude::*;

pub const FRAME: Duration = Duration::from_millis(16);
/// Top edge of the floor row every fixture stands on.
pub const FLOOR_TOP: f32 = 112.0;
/// Body y at which the default hitbox rests on the floor.
pub const REST_Y: f32 = FLOOR_TOP - 53.0 - 0.01;

pub fn headless_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(EnemyPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app
}

pub fn run_frames(app: &mut App, n: usize) {
    for _ in 0..n {
        app.update();
    }
}

pub fn floor() -> Arc<[CollisionBlock]> {
    (0..36)
        .map(|i| CollisionBlock::tile(Vec2::new(i as f32 * 16.0, FLOOR_TOP)))
        .collect()
}

fn clip(frame_count: u32) -> ClipSpec {
    ClipSpec {
        image: "clip.png".into(),
        frame_count,
        frame_buffer: 3,
        frame_size: None,
    }
}

pub fn clips() -> Arc<AnimationSet> {
    let names = [
        "Idle",
        "IdleLeft",
        "Run",
        "RunLeft",
        "Jump",
        "JumpLeft",
        "Fall",
        "FallLeft",
        "Attack1_right",
        "Attack1_left",
        "Attack2_right",
        "Attack2_left",
        "TakeHit_right",
        "TakeHit_left",
    ];
    Arc::new(AnimationSet::from_clips(names.map(|n| (n, clip(4)))))
}

pub fn spawn_enemy_at(app: &mut App, position: Vec2) -> Entity {
    let bundle = EnemyDescriptor::new(position, floor(), "grunt", 5.0, clips())
        .build(&EnemyTuning::default(), Duration::ZERO)
        .expect("valid enemy");
    app.world_mut().spawn(bundle).id()
}

pub fn spawn_player_at(app: &mut App, position: Vec2, hp: f32) -> Entity {
    let bundle =
        PlayerBundle::new(position, floor(), hp, clips(), "Idle").expect("valid player");
    app.world_mut().spawn(bundle).id()
}

/// Keeps every event of type `E` seen since the app started.
#[derive(Resource)]
pub struct Collected<E: Event>(pub Vec<E>);

impl<E: Event> Default for Collected<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn collect<E: Event + Clone>(mut reader: EventReader<E>, mut log: ResMut<Collected<E>>) {
    log.0.extend(reader.read().cloned());
}

pub fn collect_events<E: Event + Clone>(app: &mut App) {
    app.init_resource::<Collected<E>>()
        .add_systems(PostUpdate, collect::<E>);
}

pub fn collected<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world().resource::<Collected<E>>().0.clone()
}
