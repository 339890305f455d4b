// config.rs
use bevy::prelude::*;
use serde::Deserialize;

use crate::ai::AiTuning;
use crate::combat::CombatTuning;
use crate::error::{EnemyError, read_json};
use crate::physics::PhysicsContext;

/// All enemy tuning knobs, loaded from JSON. Missing sections keep defaults.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub ai: AiTuning,
    pub combat: CombatTuning,
    pub physics: PhysicsContext,
}

impl EnemyTuning {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: &str) -> Result<Self, EnemyError> {
        read_json(path)
    }
}

/// Startup loading order: tuning first, then level data that may override it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadSet {
    Tuning,
    Level,
}

#[derive(Resource, Clone)]
pub struct EnemyConfigPluginConfig {
    pub path: String,
}

pub struct EnemyConfigPlugin {
    config: EnemyConfigPluginConfig,
}

impl EnemyConfigPlugin {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            config: EnemyConfigPluginConfig { path: path.into() },
        }
    }
}

impl Plugin for EnemyConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .configure_sets(PreStartup, (LoadSet::Tuning, LoadSet::Level).chain())
            .add_systems(PreStartup, load_tuning_from_json.in_set(LoadSet::Tuning));
    }
}

fn load_tuning_from_json(mut commands: Commands, cfg: Res<EnemyConfigPluginConfig>) {
    match EnemyTuning::from_json_file(&cfg.path) {
        Ok(tuning) => {
            info!("EnemyConfigPlugin: loaded tuning from {}", cfg.path);
            commands.insert_resource(tuning.physics);
            commands.insert_resource(tuning);
        }
        Err(e) => error!("EnemyConfigPlugin: {e}; keeping default tuning"),
    }
}
