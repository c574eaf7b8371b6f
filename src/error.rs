use thiserror::Error;

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid token {found:?} at position {position}, expected {expected}")]
    Token { position: usize, found: String, expected: &'static str },

    #[error("Unexpected end of scene after {0} tokens")]
    UnexpectedEof(usize),

    #[error("Unknown shape code {0}")]
    UnknownShape(i64),

    #[error("Unknown texture code {0}")]
    UnknownTexture(i64),

    #[error("Unknown reflection code {0}")]
    UnknownReflection(i64),

    #[error("Object index {index} out of range, scene has {count} objects")]
    ObjectIndex { index: i64, count: usize },

    #[error("AND-group index {index} out of range, scene has {count} groups")]
    GroupIndex { index: i64, count: usize },
}

/// Result type for scene loading.
pub type SceneResult<T> = Result<T, SceneError>;
