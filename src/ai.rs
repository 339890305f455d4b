// ai.rs
use std::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;

use crate::animations::{Animatable, Animator, EnemyClip};
use crate::combat::{
    AttackOutcome, CombatState, CombatTarget, Health, PendingAttackCommit, PlayerStruck,
};
use crate::config::EnemyTuning;
use crate::enemy::{Enemy, Player};
use crate::geometry::has_collision;
use crate::physics::Body;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

// ====== Tuning ======
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    pub pursuit_speed: f32,
    /// Half-width of the stand-and-fight band around the player.
    pub melee_band: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            pursuit_speed: 0.8,
            melee_band: 30.0,
        }
    }
}

/// What the controller chose this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Player outside the camera box.
    Unaware,
    /// Inside the band: stand still, attacking when the cooldown allows.
    Hold { attack: Option<AttackOutcome> },
    Pursue,
}

/// Mutable parts of one enemy the controller works on.
pub struct EnemyView<'a> {
    pub body: &'a mut Body,
    pub facing: &'a mut Facing,
    pub combat: &'a mut CombatState,
    pub animator: &'a mut Animator,
}

/// One controller step against `player`, whose position and hitbox are read
/// once up front.
pub fn think<T>(enemy: EnemyView<'_>, player: &mut T, tuning: &AiTuning, now: Duration) -> Decision
where
    T: CombatTarget + ?Sized,
{
    let EnemyView {
        body,
        facing,
        combat,
        animator,
    } = enemy;
    let target = player.position();
    let target_box = player.hitbox();

    if body.position.x < target.x {
        *facing = Facing::Right;
    } else if body.position.x > target.x {
        *facing = Facing::Left;
    }

    if !has_collision(&body.camera_box(), &target_box) {
        body.velocity.x = 0.0;
        animator.switch_sprite(EnemyClip::Idle.name(*facing));
        return Decision::Unaware;
    }

    let mut closer = true;
    let mut decision = Decision::Pursue;

    let dx = body.position.x - target.x;
    if dx < tuning.melee_band && dx > -tuning.melee_band {
        body.velocity.x = 0.0;
        animator.switch_sprite(EnemyClip::Idle.name(*facing));
        closer = false;
        let attack = if combat.can_attack(now) {
            Some(combat.attack(body.position, *facing, &mut *animator, &mut *player))
        } else {
            None
        };
        decision = Decision::Hold { attack };
    }

    if closer {
        body.velocity.x = match *facing {
            Facing::Right => tuning.pursuit_speed,
            Facing::Left => -tuning.pursuit_speed,
        };
        animator.switch_sprite(EnemyClip::Run.name(*facing));
    }

    if body.velocity.y < 0.0 {
        animator.switch_sprite(EnemyClip::Jump.name(*facing));
    } else if body.velocity.y > 0.0 {
        animator.switch_sprite(EnemyClip::Fall.name(*facing));
    }

    decision
}

/// ECS view of the player entity as an attack target.
pub struct PlayerTarget<'a> {
    pub body: &'a Body,
    pub health: &'a mut Health,
    pub facing: Facing,
    pub animator: &'a mut Animator,
}

impl CombatTarget for PlayerTarget<'_> {
    fn position(&self) -> Vec2 {
        self.body.position
    }
    fn hitbox(&self) -> Rect {
        self.body.hitbox()
    }
    fn hp(&self) -> f32 {
        self.health.hp()
    }
    fn set_hp(&mut self, hp: f32) {
        self.health.set_hp(hp);
    }
    fn facing(&self) -> Facing {
        self.facing
    }
    fn switch_sprite(&mut self, name: &str) {
        self.animator.switch_sprite(name);
    }
}

pub(crate) fn run_enemy_ai(
    time: Res<Time>,
    tuning: Res<EnemyTuning>,
    mut cmd: Commands,
    mut enemies: Query<
        (
            Entity,
            &mut Body,
            &mut Facing,
            &mut CombatState,
            &mut Animator,
            Has<PendingAttackCommit>,
        ),
        With<Enemy>,
    >,
    mut players: Query<(&Body, &mut Health, &Facing, &mut Animator), (With<Player>, Without<Enemy>)>,
    mut struck: EventWriter<PlayerStruck>,
) {
    let Ok((player_body, mut player_health, player_facing, mut player_anim)) = players.single_mut()
    else {
        return;
    };
    let now = time.elapsed();

    for (e, mut body, mut facing, mut combat, mut animator, pending) in &mut enemies {
        let mut player = PlayerTarget {
            body: player_body,
            health: &mut player_health,
            facing: *player_facing,
            animator: &mut player_anim,
        };
        let view = EnemyView {
            body: &mut body,
            facing: &mut facing,
            combat: &mut combat,
            animator: &mut animator,
        };

        let Decision::Hold {
            attack: Some(outcome),
        } = think(view, &mut player, &tuning.ai, now)
        else {
            continue;
        };

        if !pending {
            cmd.entity(e)
                .try_insert(PendingAttackCommit::new(combat.commit_delay()));
        }
        match outcome {
            AttackOutcome::Struck { damage, remaining } => {
                struck.write(PlayerStruck {
                    enemy: e,
                    damage,
                    remaining,
                });
            }
            AttackOutcome::Felled { damage } => {
                info!("enemy {e} felled the player");
                struck.write(PlayerStruck {
                    enemy: e,
                    damage,
                    remaining: 0.0,
                });
            }
            AttackOutcome::Missed | AttackOutcome::TargetDown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::tests::loaded_animator;
    use crate::combat::CombatTuning;
    use crate::combat::tests::Dummy;
    use crate::geometry::rect_at;
    use std::sync::Arc;

    struct Rig {
        body: Body,
        facing: Facing,
        combat: CombatState,
        animator: Animator,
    }

    impl Rig {
        fn at(position: Vec2) -> Self {
            let mut body = Body::new(position, Arc::from(Vec::new()));
            body.velocity = Vec2::ZERO;
            Self {
                body,
                facing: Facing::Left,
                // spawned long ago: the cooldown has run out
                combat: CombatState::new(&CombatTuning::default(), Duration::ZERO),
                animator: loaded_animator(),
            }
        }

        fn think(&mut self, player: &mut Dummy, now: Duration) -> Decision {
            let view = EnemyView {
                body: &mut self.body,
                facing: &mut self.facing,
                combat: &mut self.combat,
                animator: &mut self.animator,
            };
            think(view, player, &AiTuning::default(), now)
        }
    }

    const LATE: Duration = Duration::from_secs(10);

    #[test]
    fn stands_and_fights_inside_band() {
        let mut rig = Rig::at(Vec2::new(100.0, 50.0));
        rig.body.velocity.x = -0.8;
        let mut player = Dummy::at(Vec2::new(90.0, 50.0), 10.0);

        let decision = rig.think(&mut player, LATE);

        assert_eq!(rig.facing, Facing::Left);
        assert_eq!(rig.body.velocity.x, 0.0);
        assert!(matches!(decision, Decision::Hold { attack: Some(o) } if o.connected()));
        // The attack clip replaces Idle in the same frame.
        assert_eq!(rig.animator.current_clip(), "Attack2_left");
        assert!(player.hp < 10.0);
    }

    #[test]
    fn holds_without_attacking_on_cooldown() {
        let mut rig = Rig::at(Vec2::new(100.0, 50.0));
        let mut player = Dummy::at(Vec2::new(90.0, 50.0), 10.0);

        let decision = rig.think(&mut player, Duration::from_millis(500));

        assert_eq!(decision, Decision::Hold { attack: None });
        assert_eq!(rig.animator.current_clip(), "IdleLeft");
        assert_eq!(player.hp, 10.0);
    }

    #[test]
    fn pursues_outside_band() {
        let mut rig = Rig::at(Vec2::new(0.0, 50.0));
        let mut player = Dummy::at(Vec2::new(200.0, 50.0), 10.0);
        // keep the hitbox inside the camera box (-50..150)
        player.hitbox = rect_at(Vec2::new(140.0, 76.0), Vec2::new(14.0, 27.0));

        let decision = rig.think(&mut player, LATE);

        assert_eq!(decision, Decision::Pursue);
        assert_eq!(rig.facing, Facing::Right);
        assert_eq!(rig.body.velocity.x, 0.8);
        assert_eq!(rig.animator.current_clip(), "Run");
    }

    #[test]
    fn band_edges_are_exclusive() {
        let mut rig = Rig::at(Vec2::new(130.0, 50.0));
        let mut player = Dummy::at(Vec2::new(100.0, 50.0), 10.0);

        assert_eq!(rig.think(&mut player, LATE), Decision::Pursue);
        assert_eq!(rig.body.velocity.x, -0.8);
        assert_eq!(rig.animator.current_clip(), "RunLeft");
    }

    #[test]
    fn unaware_stops_and_idles() {
        let mut rig = Rig::at(Vec2::new(0.0, 50.0));
        rig.body.velocity.x = 0.8;
        rig.animator.switch_sprite("Run");
        let mut player = Dummy::at(Vec2::new(400.0, 50.0), 10.0);

        let decision = rig.think(&mut player, LATE);

        assert_eq!(decision, Decision::Unaware);
        assert_eq!(rig.facing, Facing::Right);
        assert_eq!(rig.body.velocity.x, 0.0);
        assert_eq!(rig.animator.current_clip(), "Idle");
        assert_eq!(player.hp, 10.0);
        assert_eq!(rig.combat.attack_count(), 0);
    }

    #[test]
    fn equal_x_keeps_facing() {
        let mut rig = Rig::at(Vec2::new(100.0, 50.0));
        rig.facing = Facing::Right;
        let mut player = Dummy::at(Vec2::new(100.0, 50.0), 10.0);

        rig.think(&mut player, Duration::ZERO);
        assert_eq!(rig.facing, Facing::Right);
    }

    #[test]
    fn airborne_overlay_picks_jump_or_fall() {
        let mut rig = Rig::at(Vec2::new(0.0, 50.0));
        let mut player = Dummy::at(Vec2::new(200.0, 50.0), 10.0);
        player.hitbox = rect_at(Vec2::new(140.0, 76.0), Vec2::new(14.0, 27.0));

        rig.body.velocity.y = -1.5;
        rig.think(&mut player, LATE);
        assert_eq!(rig.animator.current_clip(), "Jump");
        assert_eq!(rig.body.velocity.x, 0.8);

        rig.body.velocity.y = 0.4;
        rig.think(&mut player, LATE);
        assert_eq!(rig.animator.current_clip(), "Fall");
        assert_eq!(rig.body.velocity.y, 0.4);
    }
}
