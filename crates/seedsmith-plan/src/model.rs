use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::PlanError;

/// Contract version for the plan format.
pub const PLAN_VERSION: &str = "0.1";

pub const DEFAULT_RECORD_COUNT: u64 = 10;
pub const DEFAULT_RECORDS_PER_PARENT: u64 = 1;

/// Output shape produced by the generator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Generator routines in the host language.
    SourceCode,
    #[default]
    Json,
    Csv,
    Sql,
    Xml,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::SourceCode,
        OutputFormat::Json,
        OutputFormat::Csv,
        OutputFormat::Sql,
        OutputFormat::Xml,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::SourceCode => "source_code",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Sql => "sql",
            OutputFormat::Xml => "xml",
        }
    }

    /// Conventional file extension for written output.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::SourceCode => "cs",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Sql => "sql",
            OutputFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "source_code" | "sourcecode" | "source" | "code" => Ok(OutputFormat::SourceCode),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "sql" => Ok(OutputFormat::Sql),
            "xml" => Ok(OutputFormat::Xml),
            _ => Err(PlanError::UnknownFormat(value.to_string())),
        }
    }
}

/// Per-property generation override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyOverride {
    /// Values cycled through instead of synthesized ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed_values: Vec<serde_json::Value>,
    /// Leave the property out of the output entirely.
    #[serde(default)]
    pub exclude: bool,
}

/// Generation settings for one selected entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityConfig {
    /// Entity name as reported by analysis.
    pub entity: String,
    /// Number of records for a root entity.
    #[serde(default = "default_record_count")]
    pub record_count: u64,
    /// Records generated for each parent record.
    #[serde(default = "default_records_per_parent")]
    pub records_per_parent: u64,
    /// Computed by propagation; input values are overwritten.
    #[serde(default)]
    pub total_record_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_entity_name: Option<String>,
    /// Overrides keyed by property name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyOverride>,
}

fn default_record_count() -> u64 {
    DEFAULT_RECORD_COUNT
}

fn default_records_per_parent() -> u64 {
    DEFAULT_RECORDS_PER_PARENT
}

impl EntityConfig {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            record_count: DEFAULT_RECORD_COUNT,
            records_per_parent: DEFAULT_RECORDS_PER_PARENT,
            total_record_count: 0,
            parent_entity_name: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn root(entity: impl Into<String>, record_count: u64) -> Self {
        Self {
            record_count,
            ..Self::new(entity)
        }
    }

    pub fn child(entity: impl Into<String>, parent: impl Into<String>, records_per_parent: u64) -> Self {
        Self {
            records_per_parent,
            parent_entity_name: Some(parent.into()),
            ..Self::new(entity)
        }
    }

    /// Case-insensitive override lookup.
    pub fn property_override(&self, property: &str) -> Option<&PropertyOverride> {
        self.properties
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    pub fn is_excluded(&self, property: &str) -> bool {
        self.property_override(property)
            .is_some_and(|value| value.exclude)
    }

    /// Fixed values for a non-excluded property.
    pub fn fixed_values(&self, property: &str) -> &[serde_json::Value] {
        match self.property_override(property) {
            Some(value) if !value.exclude => &value.fixed_values,
            _ => &[],
        }
    }

    pub fn exclude(mut self, property: impl Into<String>) -> Self {
        self.properties.entry(property.into()).or_default().exclude = true;
        self
    }

    pub fn with_fixed_values(
        mut self,
        property: impl Into<String>,
        values: Vec<serde_json::Value>,
    ) -> Self {
        self.properties.entry(property.into()).or_default().fixed_values = values;
        self
    }

    /// Product of the non-empty fixed-value set sizes on non-excluded properties.
    pub fn combination_count(&self) -> u64 {
        self.properties
            .values()
            .filter(|value| !value.exclude && !value.fixed_values.is_empty())
            .fold(1u64, |product, value| {
                product.saturating_mul(value.fixed_values.len() as u64)
            })
    }

    /// Records actually emitted: every fixed-value combination per counted record.
    pub fn final_record_count(&self) -> u64 {
        self.total_record_count
            .saturating_mul(self.combination_count().max(1))
    }
}

/// Canonical generation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GenerationPlan {
    /// Contract version for the plan format.
    pub plan_version: String,
    /// Seed for pattern-driven values.
    #[serde(default)]
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    /// Cap on records emitted per entity, for previews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_limit: Option<u64>,
    /// Selected entities and their counts.
    pub entities: Vec<EntityConfig>,
}

impl GenerationPlan {
    pub fn new(entities: Vec<EntityConfig>) -> Self {
        Self {
            plan_version: PLAN_VERSION.to_string(),
            seed: 0,
            format: None,
            preview_limit: None,
            entities,
        }
    }

    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities
            .iter()
            .find(|config| config.entity.eq_ignore_ascii_case(name))
    }
}
