// combat.rs
use std::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;

use crate::ai::Facing;
use crate::animations::{Animatable, EnemyClip};

// ====== Tuning ======
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub damage: f32,
    pub reach_x: f32,
    pub reach_y: f32,
    pub cooldown_ms: u64,
    pub commit_delay_ms: u64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            damage: 0.2,
            reach_x: 40.0,
            reach_y: 20.0,
            cooldown_ms: 2000,
            // roughly one attack animation
            commit_delay_ms: 500,
        }
    }
}

// ====== Health ======
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    hp: f32,
    limit: f32,
    pre_hp: f32,
}

impl Health {
    pub fn new(limit: f32) -> Self {
        Self {
            hp: limit,
            limit,
            pre_hp: limit,
        }
    }

    pub fn hp(&self) -> f32 {
        self.hp
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Sets HP, clamped to `0..=limit`.
    pub fn set_hp(&mut self, hp: f32) {
        self.hp = hp.clamp(0.0, self.limit);
    }

    /// Changes the limit and pulls HP down to it if needed.
    pub fn set_limit(&mut self, limit: f32) {
        self.limit = limit.max(0.0);
        self.hp = self.hp.min(self.limit);
    }

    /// Subtracts `amount` and returns what is left; never goes below zero.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        self.set_hp(self.hp - amount);
        self.hp
    }

    pub fn is_depleted(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        if self.limit <= 0.0 {
            return 0.0;
        }
        (self.hp / self.limit).clamp(0.0, 1.0)
    }

    /// True when HP dropped since the previous call; remembers the current HP.
    pub fn take_hurt(&mut self) -> bool {
        let hurt = self.hp < self.pre_hp;
        self.pre_hp = self.hp;
        hurt
    }
}

// ====== Target contract ======
/// What an attack needs from the thing being attacked.
pub trait CombatTarget {
    fn position(&self) -> Vec2;
    fn hitbox(&self) -> Rect;
    fn hp(&self) -> f32;
    fn set_hp(&mut self, hp: f32);
    fn facing(&self) -> Facing;
    fn switch_sprite(&mut self, name: &str);
}

pub const fn take_hit_clip(facing: Facing) -> &'static str {
    match facing {
        Facing::Right => "TakeHit_right",
        Facing::Left => "TakeHit_left",
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOutcome {
    /// Target outside melee reach.
    Missed,
    /// Target already at zero HP.
    TargetDown,
    Struck { damage: f32, remaining: f32 },
    /// The blow took the rest of the target's HP.
    Felled { damage: f32 },
}

impl AttackOutcome {
    pub fn connected(&self) -> bool {
        matches!(self, Self::Struck { .. } | Self::Felled { .. })
    }
}

// ====== Combat state ======
#[derive(Component, Debug, Clone)]
pub struct CombatState {
    damage: f32,
    attack_count: u32,
    last_attack_at: Duration,
    cooldown: Duration,
    commit_delay: Duration,
    reach: Vec2,
    has_damage: bool,
}

impl CombatState {
    /// `now` counts as the last attack, so the first one waits a full cooldown.
    pub fn new(tuning: &CombatTuning, now: Duration) -> Self {
        Self {
            damage: tuning.damage,
            attack_count: 0,
            last_attack_at: now,
            cooldown: Duration::from_millis(tuning.cooldown_ms),
            commit_delay: Duration::from_millis(tuning.commit_delay_ms),
            reach: Vec2::new(tuning.reach_x, tuning.reach_y),
            has_damage: false,
        }
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }

    pub fn set_damage(&mut self, damage: f32) {
        self.damage = damage;
    }

    pub fn attack_count(&self) -> u32 {
        self.attack_count
    }

    pub fn last_attack_at(&self) -> Duration {
        self.last_attack_at
    }

    pub fn commit_delay(&self) -> Duration {
        self.commit_delay
    }

    pub fn can_attack(&self, now: Duration) -> bool {
        now >= self.last_attack_at + self.cooldown
    }

    /// Restarts the cooldown and counts the attack.
    pub fn commit(&mut self, now: Duration) {
        self.last_attack_at = now;
        self.attack_count += 1;
    }

    pub fn in_reach(&self, attacker: Vec2, target: Vec2) -> bool {
        (target.x - attacker.x).abs() <= self.reach.x && (target.y - attacker.y).abs() <= self.reach.y
    }

    /// Plays an attack clip and applies at most one hit to `target`.
    pub fn attack<A, T>(
        &mut self,
        attacker: Vec2,
        facing: Facing,
        animator: &mut A,
        target: &mut T,
    ) -> AttackOutcome
    where
        A: Animatable + ?Sized,
        T: CombatTarget + ?Sized,
    {
        let clip = if self.attack_count % 3 != 0 {
            EnemyClip::Attack1
        } else {
            EnemyClip::Attack2
        };
        animator.switch_sprite(clip.name(facing));

        let mut outcome = AttackOutcome::Missed;
        if self.in_reach(attacker, target.position()) {
            let hp = target.hp();
            outcome = AttackOutcome::TargetDown;
            if hp > 0.0 && !self.has_damage {
                self.has_damage = true;
                if self.damage >= hp {
                    target.set_hp(0.0);
                    outcome = AttackOutcome::Felled { damage: hp };
                } else {
                    let remaining = hp - self.damage;
                    target.set_hp(remaining);
                    target.switch_sprite(take_hit_clip(target.facing()));
                    outcome = AttackOutcome::Struck {
                        damage: self.damage,
                        remaining,
                    };
                }
            }
        }
        self.has_damage = false;
        outcome
    }
}

/// Deferred commit of an attack: when the timer runs out the cooldown restarts
/// and the attack is counted. Lives on the enemy entity, so despawning the
/// enemy drops it and removing the component cancels it.
///
/// An enemy holds at most one pending commit. Attacks landed while the window
/// is open share it, so the whole window counts as a single attack.
#[derive(Component, Debug)]
pub struct PendingAttackCommit(pub Timer);

impl PendingAttackCommit {
    pub fn new(delay: Duration) -> Self {
        Self(Timer::new(delay, TimerMode::Once))
    }
}

/// Raised when an enemy attack lands on its target.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerStruck {
    pub enemy: Entity,
    pub damage: f32,
    pub remaining: f32,
}

pub(crate) fn tick_attack_commits(
    time: Res<Time>,
    mut cmd: Commands,
    mut q: Query<(Entity, &mut PendingAttackCommit, &mut CombatState)>,
) {
    for (e, mut pending, mut combat) in &mut q {
        pending.0.tick(time.delta());
        if pending.0.finished() {
            combat.commit(time.elapsed());
            cmd.entity(e).try_remove::<PendingAttackCommit>();
            debug!("enemy {e} attack committed (count {})", combat.attack_count());
        }
    }
}
