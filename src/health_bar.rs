// health_bar.rs
use bevy::prelude::*;

use crate::combat::Health;
use crate::enemy::Enemy;

/// Floating bar drawn above an enemy's hitbox.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HealthBar {
    /// Filled share of the bar, `0.0..=1.0`.
    pub fill: f32,
    pub size: Vec2,
    /// Space between the bar's bottom edge and the hitbox top.
    pub gap: f32,
    defeated: bool,
}

impl Default for HealthBar {
    fn default() -> Self {
        Self {
            fill: 1.0,
            size: Vec2::new(30.0, 4.0),
            gap: 6.0,
            defeated: false,
        }
    }
}

impl HealthBar {
    /// Screen-space frame of the whole bar, centred over `hitbox`.
    pub fn frame(&self, hitbox: Rect) -> Rect {
        let center_x = hitbox.center().x;
        let bottom = hitbox.min.y - self.gap;
        Rect::new(
            center_x - self.size.x / 2.0,
            bottom - self.size.y,
            center_x + self.size.x / 2.0,
            bottom,
        )
    }

    /// The filled part, anchored on the left edge of [`Self::frame`].
    pub fn fill_rect(&self, hitbox: Rect) -> Rect {
        let frame = self.frame(hitbox);
        Rect::new(
            frame.min.x,
            frame.min.y,
            frame.min.x + self.size.x * self.fill,
            frame.max.y,
        )
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }
}

/// An enemy lost HP since the previous frame.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EnemyHurt {
    pub enemy: Entity,
    pub hp: f32,
}

/// An enemy's HP reached zero. Sent once per enemy.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyDefeated {
    pub enemy: Entity,
}

pub(crate) fn refresh_health_bars(
    mut q: Query<(Entity, &mut Health, &mut HealthBar), With<Enemy>>,
    mut hurt: EventWriter<EnemyHurt>,
    mut defeated: EventWriter<EnemyDefeated>,
) {
    for (e, mut health, mut bar) in &mut q {
        bar.fill = health.fraction();
        if health.take_hurt() {
            debug!("enemy {e} hurt, {} hp left", health.hp());
            hurt.write(EnemyHurt {
                enemy: e,
                hp: health.hp(),
            });
        }
        if health.is_depleted() && !bar.defeated {
            bar.defeated = true;
            info!("enemy {e} defeated");
            defeated.write(EnemyDefeated { enemy: e });
        }
    }
}
