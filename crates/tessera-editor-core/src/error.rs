//! Error types for surface operations and configuration loading.

/// Failure of a single surface operation.
///
/// Synchronization treats these as recoverable: the failing leaf is left as
/// it was, or caret restoration is skipped.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The node handle no longer refers to a node in the surface.
    #[error("node not found in surface")]
    NodeNotFound,

    /// The node exists but is not attached under the surface root.
    #[error("node is detached from the surface")]
    Detached,

    /// The caret offset could not be mapped to a position.
    #[error("caret offset {offset} is outside the surface text (len {len})")]
    CaretOutOfRange { offset: usize, len: usize },

    /// Host-level failure (e.g. a DOM exception).
    #[error("surface error: {0}")]
    Host(String),
}

impl From<&str> for SurfaceError {
    fn from(s: &str) -> Self {
        SurfaceError::Host(s.to_string())
    }
}

impl From<String> for SurfaceError {
    fn from(s: String) -> Self {
        SurfaceError::Host(s)
    }
}

/// Errors raised while loading an [`EditorConfig`](crate::config::EditorConfig).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("could not serialize config as TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}
