// level.rs
use std::sync::Arc;

use bevy::prelude::*;
use serde::Deserialize;

use crate::config::LoadSet;
use crate::error::{EnemyError, read_json};
use crate::geometry::CollisionBlock;
use crate::physics::PhysicsContext;

/// Collision layer exported from the level editor: a row-major tile grid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LevelFile {
    pub columns: usize,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    /// Tile ids that count as solid. Empty means every non-zero id.
    #[serde(default)]
    pub solid_tiles: Vec<u32>,
    pub tiles: Vec<u32>,
}

fn default_tile_size() -> f32 {
    CollisionBlock::SIZE
}

impl LevelFile {
    pub fn from_json_file(path: &str) -> Result<Self, EnemyError> {
        read_json(path)
    }

    pub fn rows(&self) -> usize {
        if self.columns == 0 {
            0
        } else {
            self.tiles.len() / self.columns
        }
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.columns as f32, self.rows() as f32) * self.tile_size
    }

    fn is_solid(&self, id: u32) -> bool {
        if self.solid_tiles.is_empty() {
            id != 0
        } else {
            self.solid_tiles.contains(&id)
        }
    }

    /// One block per solid tile, in row-major order.
    pub fn blocks(&self) -> Result<Vec<CollisionBlock>, EnemyError> {
        if self.columns == 0 || self.tiles.len() % self.columns != 0 {
            return Err(EnemyError::RaggedLevel {
                tiles: self.tiles.len(),
                columns: self.columns,
            });
        }
        let size = Vec2::splat(self.tile_size);
        Ok(self
            .tiles
            .chunks(self.columns)
            .enumerate()
            .flat_map(|(row, ids)| {
                ids.iter()
                    .enumerate()
                    .filter(|(_, id)| self.is_solid(**id))
                    .map(move |(col, _)| {
                        CollisionBlock::new(Vec2::new(col as f32, row as f32) * size, size)
                    })
            })
            .collect())
    }
}

/// The static block set every body of the current level collides with.
#[derive(Resource, Debug, Clone, Default)]
pub struct CollisionMap {
    pub blocks: Arc<[CollisionBlock]>,
}

impl CollisionMap {
    pub fn new(blocks: Vec<CollisionBlock>) -> Self {
        Self {
            blocks: blocks.into(),
        }
    }
}

#[derive(Resource, Clone)]
pub struct LevelPluginConfig {
    pub path: String,
}

pub struct LevelPlugin {
    config: LevelPluginConfig,
}

impl LevelPlugin {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            config: LevelPluginConfig { path: path.into() },
        }
    }
}

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .init_resource::<CollisionMap>()
            .configure_sets(PreStartup, (LoadSet::Tuning, LoadSet::Level).chain())
            .add_systems(PreStartup, load_level.in_set(LoadSet::Level));
    }
}

fn load_level(
    mut commands: Commands,
    cfg: Res<LevelPluginConfig>,
    physics: Option<ResMut<PhysicsContext>>,
) {
    let level = match LevelFile::from_json_file(&cfg.path) {
        Ok(level) => level,
        Err(e) => {
            error!("LevelPlugin: {e}; the level has no collision blocks");
            return;
        }
    };
    let blocks = match level.blocks() {
        Ok(blocks) => blocks,
        Err(e) => {
            error!("LevelPlugin: {}: {e}", cfg.path);
            return;
        }
    };
    info!(
        "LevelPlugin: {} collision blocks from {}",
        blocks.len(),
        cfg.path
    );
    if let Some(mut physics) = physics {
        let size = level.world_size();
        physics.world_width = size.x;
        physics.world_height = size.y;
    }
    commands.insert_resource(CollisionMap::new(blocks));
}
