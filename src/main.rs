use std::sync::Arc;

use bevy::prelude::*;
use skirmisher::prelude::*;
use skirmisher::render::scene_projection;

// The sheets under assets/enemy and assets/player are flat placeholder
// silhouettes sized to the manifests. Real art drops in under the same names.
const ENEMY_ANIMATIONS: &str = "assets/enemy/animations.json";
const PLAYER_ANIMATIONS: &str = "assets/player/animations.json";

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: String::from("skirmisher"),
                        resolution: (1024.0, 576.0).into(),
                        ..Default::default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .add_plugins((
            EnemyPlugin,
            EnemyConfigPlugin::new("assets/enemy/tuning.json"),
            LevelPlugin::new("assets/levels/level1.json"),
            EnemySpawnerPlugin,
            EnemyRenderPlugin,
        ))
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.1)))
        .add_systems(Startup, (spawn_camera, spawn_scene))
        .add_systems(Update, (toggle_debug_boxes, report_hits))
        .run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, scene_projection()));
}

fn spawn_scene(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<EnemyTuning>,
    map: Res<CollisionMap>,
    mut spawner: ResMut<EnemySpawner>,
) {
    let (enemy_clips, player_clips) = match (
        AnimationSet::from_json_file(ENEMY_ANIMATIONS),
        AnimationSet::from_json_file(PLAYER_ANIMATIONS),
    ) {
        (Ok(e), Ok(p)) => (Arc::new(e), Arc::new(p)),
        (Err(e), _) | (_, Err(e)) => {
            error!("cannot start the scene: {e}");
            return;
        }
    };

    match PlayerBundle::new(
        Vec2::new(120.0, 300.0),
        map.blocks.clone(),
        10.0,
        player_clips,
        "Idle",
    ) {
        Ok(player) => {
            commands.spawn(player);
        }
        Err(e) => error!("player: {e}"),
    }

    let first = EnemyDescriptor::new(
        Vec2::new(200.0, 300.0),
        map.blocks.clone(),
        "skeleton",
        5.0,
        enemy_clips.clone(),
    );
    match spawn_enemy(&mut commands, first, &tuning, time.elapsed()) {
        Ok(e) => {
            commands.entity(e).insert(CameraFocus);
        }
        Err(e) => error!("enemy: {e}"),
    }

    spawner.template = Some(EnemyTemplate {
        class_id: "skeleton".into(),
        hp_limit: 5.0,
        animations: enemy_clips,
    });
}

fn toggle_debug_boxes(keys: Res<ButtonInput<KeyCode>>, mut debug: ResMut<DebugBoxes>) {
    if keys.just_pressed(KeyCode::F1) {
        debug.0 = !debug.0;
    }
}

fn report_hits(mut struck: EventReader<PlayerStruck>) {
    for hit in struck.read() {
        info!(
            "player struck by {} for {:.1}, {:.1} hp left",
            hit.enemy, hit.damage, hit.remaining
        );
    }
}
