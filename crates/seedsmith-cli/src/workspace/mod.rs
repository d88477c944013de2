mod artifacts;
mod atomic;
mod documents;
mod settings;

pub use artifacts::{AnalysisArtifact, read_json, write_json};
pub use atomic::write_bytes_atomic;
pub use documents::FileTextSink;
pub use settings::{
    DEFAULT_SETTINGS_FILE, LogFormat, LoggingSettings, Settings, load_settings, save_settings,
};

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("toml encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("invalid workspace state: {0}")]
    Invalid(String),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
