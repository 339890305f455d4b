mod common;

use bevy::prelude::*;
use common::*;
use skirmisher::prelude::*;

fn set_hp(app: &mut App, e: Entity, hp: f32) {
    app.world_mut()
        .get_mut::<Health>(e)
        .expect("health")
        .set_hp(hp);
}

#[test]
fn bar_tracks_hp_and_reports_hurt() {
    let mut app = headless_app();
    collect_events::<EnemyHurt>(&mut app);
    let e = spawn_enemy_at(&mut app, Vec2::new(100.0, REST_Y));

    app.update();
    assert!(collected::<EnemyHurt>(&app).is_empty());
    assert_eq!(app.world().get::<HealthBar>(e).expect("bar").fill, 1.0);

    set_hp(&mut app, e, 2.5);
    app.update();

    assert_eq!(app.world().get::<HealthBar>(e).expect("bar").fill, 0.5);
    assert_eq!(
        collected::<EnemyHurt>(&app),
        vec![EnemyHurt { enemy: e, hp: 2.5 }]
    );

    // unchanged HP is not a new hurt
    run_frames(&mut app, 3);
    assert_eq!(collected::<EnemyHurt>(&app).len(), 1);
}

#[test]
fn defeat_is_reported_once() {
    let mut app = headless_app();
    collect_events::<EnemyHurt>(&mut app);
    collect_events::<EnemyDefeated>(&mut app);
    let e = spawn_enemy_at(&mut app, Vec2::new(100.0, REST_Y));
    app.update();

    set_hp(&mut app, e, -3.0);
    run_frames(&mut app, 5);

    assert_eq!(app.world().get::<Health>(e).expect("health").hp(), 0.0);
    assert_eq!(collected::<EnemyHurt>(&app).len(), 1);
    assert_eq!(
        collected::<EnemyDefeated>(&app),
        vec![EnemyDefeated { enemy: e }]
    );
    let bar = app.world().get::<HealthBar>(e).expect("bar");
    assert!(bar.is_defeated());
    assert_eq!(bar.fill, 0.0);
}
