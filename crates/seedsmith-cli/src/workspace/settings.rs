use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use seedsmith_generate::SourceStyle;
use seedsmith_plan::{DEFAULT_RECORD_COUNT, OutputFormat};

use super::atomic::write_bytes_atomic;
use super::WorkspaceResult;

pub const DEFAULT_SETTINGS_FILE: &str = "seedsmith.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub format: OutputFormat,
    /// Dates count back from this day; today when unset.
    pub base_date: Option<NaiveDate>,
    pub preview_limit: Option<u64>,
    pub source_style: SourceStyle,
    /// Root record count used when scaffolding plans.
    pub record_count: u64,
    pub seed: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            base_date: None,
            preview_limit: None,
            source_style: SourceStyle::ObjectInitializer,
            record_count: DEFAULT_RECORD_COUNT,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    pub type_key_matching: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
    /// Append-only JSON log file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generation: GenerationSettings,
    pub inference: InferenceSettings,
    pub logging: LoggingSettings,
}

/// Read settings from `path`; a missing file yields defaults.
pub fn load_settings(path: &Path) -> WorkspaceResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> WorkspaceResult<()> {
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(path, encoded.as_bytes())
}
