// error.rs
use bevy::math::Vec2;
use thiserror::Error;

/// Everything that can go wrong while building an enemy or reading its data files.
///
/// None of these happen during a frame update; they signal a caller handing in
/// malformed construction input.
#[derive(Debug, Error)]
pub enum EnemyError {
    #[error("spawn position must be finite, got {0}")]
    NonFinitePosition(Vec2),

    #[error("health limit must be a positive finite number, got {0}")]
    InvalidHealthLimit(f32),

    #[error("sprite scale must be a positive finite number, got {0}")]
    InvalidScale(f32),

    #[error("animation set is empty")]
    EmptyAnimationSet,

    #[error("animation set has no `{0}` clip")]
    MissingClip(String),

    #[error("clip `{0}` must have at least one frame")]
    EmptyClip(String),

    #[error("level grid has {tiles} tiles, which is not a multiple of {columns} columns")]
    RaggedLevel { tiles: usize, columns: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EnemyError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Reads a JSON file and deserializes it, tagging failures with the path.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, EnemyError> {
    let text = std::fs::read_to_string(path).map_err(|e| EnemyError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| EnemyError::json(path, e))
}
