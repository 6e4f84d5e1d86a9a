use thiserror::Error;

#[derive(Error, Debug)]
pub enum PyletError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    // Workspace errors
    #[error("Cannot resolve workspace root: {reason}")]
    WorkspaceResolve { reason: String },

    #[error("Invalid script name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    // Execution errors
    #[error("Invalid timeout: {seconds} seconds (must be greater than 0)")]
    InvalidTimeout { seconds: i64 },

    #[error("Failed to launch '{interpreter}': {source}")]
    Launch {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PyletError>;
