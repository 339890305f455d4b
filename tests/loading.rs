//! Startup loaders for tuning and level files.

mod common;

use bevy::prelude::*;
use common::*;
use skirmisher::prelude::*;

fn asset(path: &str) -> String {
    format!("{}/assets/{path}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn level_plugin_builds_collision_map_and_world_size() {
    let mut app = headless_app();
    app.world_mut().insert_resource(PhysicsContext {
        world_width: 1.0,
        world_height: 1.0,
        ..default()
    });
    app.add_plugins(LevelPlugin::new(asset("levels/level1.json")));
    app.update();

    let map = app.world().resource::<CollisionMap>();
    assert!(!map.blocks.is_empty());
    assert!(map.blocks.iter().all(|b| b.rect.size() == Vec2::splat(16.0)));
    let ctx = app.world().resource::<PhysicsContext>();
    assert_eq!(ctx.world_size(), Vec2::new(576.0, 432.0));
}

#[test]
fn missing_level_leaves_empty_map() {
    let mut app = headless_app();
    app.add_plugins(LevelPlugin::new("no/such/level.json"));
    app.update();

    assert!(app.world().resource::<CollisionMap>().blocks.is_empty());
    assert_eq!(
        *app.world().resource::<PhysicsContext>(),
        PhysicsContext::default()
    );
}

#[test]
fn config_plugin_loads_tuning() {
    let mut app = headless_app();
    app.add_plugins(EnemyConfigPlugin::new(asset("enemy/tuning.json")));
    app.update();

    let tuning = *app.world().resource::<EnemyTuning>();
    assert_eq!(tuning.combat.cooldown_ms, 2000);
    assert_eq!(*app.world().resource::<PhysicsContext>(), tuning.physics);
}

#[test]
fn missing_tuning_keeps_defaults() {
    let mut app = headless_app();
    app.add_plugins(EnemyConfigPlugin::new("no/such/tuning.json"));
    app.update();

    assert_eq!(*app.world().resource::<EnemyTuning>(), EnemyTuning::default());
}

#[test]
fn spawner_respects_cap() {
    let mut app = headless_app();
    app.add_plugins(EnemySpawnerPlugin);
    app.insert_resource(CollisionMap { blocks: floor() });
    app.insert_resource(EnemySpawner {
        timer: Timer::from_seconds(0.1, TimerMode::Repeating),
        max_alive: 2,
        ..default()
    }
    .with_template(EnemyTemplate {
        class_id: "grunt".into(),
        hp_limit: 3.0,
        animations: clips(),
    }));

    run_frames(&mut app, 60);

    let mut q = app.world_mut().query_filtered::<&Body, With<Enemy>>();
    let bodies: Vec<Body> = q.iter(app.world()).cloned().collect();
    assert_eq!(bodies.len(), 2);
    for b in bodies {
        assert!(b.hitbox().max.y < FLOOR_TOP);
    }
}

/// Width and height from a PNG's IHDR chunk.
fn png_size(path: &str) -> (u32, u32) {
    let bytes = std::fs::read(path).unwrap_or_else(|e| panic!("{path}: {e}"));
    assert_eq!(&bytes[1..4], b"PNG", "{path} is not a PNG");
    let word = |at: usize| u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    (word(16), word(20))
}

#[test]
fn shipped_manifests_point_at_matching_sheets() {
    for manifest in ["enemy/animations.json", "player/animations.json"] {
        let set = AnimationSet::from_json_file(&asset(manifest)).expect("manifest");
        for (name, clip) in set.iter() {
            let [w, h] = clip.frame_size.expect("frame size");
            let (sheet_w, sheet_h) = png_size(&asset(&clip.image));
            assert_eq!(sheet_w, w * clip.frame_count, "{name} sheet width");
            assert_eq!(sheet_h, h, "{name} sheet height");
        }
    }
}
