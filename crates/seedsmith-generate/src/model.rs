use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use seedsmith_plan::OutputFormat;

/// How generated source code builds each record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStyle {
    /// `new Product { Id = 1, ... }`
    #[default]
    ObjectInitializer,
    /// `var product1 = new Product(); product1.Id = 1;`
    Assignment,
}

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub format: OutputFormat,
    /// Dates count back from this day; today when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_date: Option<NaiveDate>,
    /// Cap on records emitted per entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_limit: Option<u64>,
    #[serde(default)]
    pub source_style: SourceStyle,
    /// Seed for pattern-driven values.
    #[serde(default)]
    pub seed: u64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            base_date: None,
            preview_limit: None,
            source_style: SourceStyle::ObjectInitializer,
            seed: 0,
        }
    }
}

impl GenerateOptions {
    pub fn with_format(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn resolved_base_date(&self) -> NaiveDate {
        self.base_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Summary of a generated entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReport {
    pub entity: String,
    pub records_requested: u64,
    pub records_generated: u64,
    pub columns: usize,
}
