use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info, warn};

use seedsmith_core::{EntityDescriptor, PropertyDescriptor, RelationshipKind};
use seedsmith_plan::{EntityConfig, compute_record_counts};

use crate::errors::{GenerationError, Result};
use crate::generators::{ColumnPlan, ForeignRange, GeneratedValue, ValueSynthesizer};
use crate::model::{EntityReport, GenerateOptions};
use crate::output::{self, EntityRecords};

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub text: String,
    pub entities: Vec<EntityReport>,
}

/// Entry point for generating seed data from descriptors + entity configs.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn run(
        &self,
        entities: &[EntityDescriptor],
        configs: &[EntityConfig],
    ) -> Result<GenerationResult> {
        let start = Instant::now();

        let mut configs = configs.to_vec();
        compute_record_counts(&mut configs);
        let order = emission_order(&configs);

        let tasks = order
            .iter()
            .map(|&position| EntityTask::new(entities, &configs, position))
            .collect::<Result<Vec<_>>>()?;

        info!(
            entities = tasks.len(),
            format = %self.options.format,
            seed = self.options.seed,
            "generation started"
        );

        let mut synthesizer =
            ValueSynthesizer::new(self.options.resolved_base_date(), self.options.seed);
        let mut blocks = Vec::with_capacity(tasks.len());
        let mut reports = Vec::with_capacity(tasks.len());

        for task in &tasks {
            let columns = task.column_plans(&configs, self.options.preview_limit);
            let emitted = task.emitted(self.options.preview_limit);
            let rows = generate_rows(task, &columns, emitted, &mut synthesizer);

            info!(
                entity = %task.entity.name,
                records_requested = task.config.final_record_count(),
                records_generated = rows.len() as u64,
                columns = columns.len(),
                "entity generated"
            );
            reports.push(EntityReport {
                entity: task.entity.name.clone(),
                records_requested: task.config.final_record_count(),
                records_generated: rows.len() as u64,
                columns: columns.len(),
            });
            blocks.push(EntityRecords {
                entity: task.entity,
                columns: task.columns.clone(),
                rows,
            });
        }

        let text = output::render(&blocks, &self.options)?;
        info!(
            entities = reports.len(),
            bytes = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "generation completed"
        );

        Ok(GenerationResult {
            text,
            entities: reports,
        })
    }
}

/// Generate text for `configs` in the given options' format.
pub fn generate(
    entities: &[EntityDescriptor],
    configs: &[EntityConfig],
    options: &GenerateOptions,
) -> Result<GenerationResult> {
    GenerationEngine::new(options.clone()).run(entities, configs)
}

struct EntityTask<'a> {
    entity: &'a EntityDescriptor,
    config: &'a EntityConfig,
    columns: Vec<&'a PropertyDescriptor>,
}

impl<'a> EntityTask<'a> {
    fn new(
        entities: &'a [EntityDescriptor],
        configs: &'a [EntityConfig],
        position: usize,
    ) -> Result<Self> {
        let config = &configs[position];
        let entity = entities
            .iter()
            .find(|entity| entity.name.eq_ignore_ascii_case(&config.entity))
            .ok_or_else(|| {
                GenerationError::InvalidPlan(format!(
                    "entity '{}' not found in analyzed entities",
                    config.entity
                ))
            })?;

        if entity.is_abstract {
            warn!(entity = %entity.name, "generating records for an abstract type");
        }

        let columns: Vec<&PropertyDescriptor> = entity
            .properties
            .iter()
            .filter(|property| property.is_scalar() && !config.is_excluded(&property.name))
            .collect();
        if columns.is_empty() {
            return Err(GenerationError::MissingSchema(format!(
                "entity '{}' has no emittable properties",
                entity.name
            )));
        }

        Ok(Self {
            entity,
            config,
            columns,
        })
    }

    fn emitted(&self, preview_limit: Option<u64>) -> u64 {
        let requested = self.config.final_record_count();
        preview_limit.map_or(requested, |limit| requested.min(limit))
    }

    fn column_plans(&self, configs: &[EntityConfig], preview_limit: Option<u64>) -> Vec<ColumnPlan<'a>> {
        self.columns
            .iter()
            .copied()
            .map(|property| {
                let foreign = self
                    .foreign_target(property)
                    .map(|target| self.foreign_range(target, configs, preview_limit));
                ColumnPlan::new(property, foreign)
            })
            .collect()
    }

    /// Entity referenced by a foreign-key property, by annotation or inferred edge.
    fn foreign_target(&self, property: &'a PropertyDescriptor) -> Option<&'a str> {
        if property.is_key {
            return None;
        }
        if property.is_foreign_key {
            if let Some(target) = &property.foreign_key_target_entity {
                return Some(target.as_str());
            }
        }
        self.entity
            .relationships
            .iter()
            .filter(|relationship| relationship.kind == RelationshipKind::ManyToOne)
            .find(|relationship| {
                relationship
                    .foreign_key_property_name
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(&property.name))
            })
            .map(|relationship| relationship.target_entity.as_str())
    }

    fn foreign_range(
        &self,
        target: &str,
        configs: &[EntityConfig],
        preview_limit: Option<u64>,
    ) -> ForeignRange {
        let target_config = configs
            .iter()
            .find(|config| config.entity.eq_ignore_ascii_case(target));
        let target_total = target_config.map_or(0, |config| {
            let requested = config.final_record_count();
            preview_limit.map_or(requested, |limit| requested.min(limit))
        });
        let is_parent = self
            .config
            .parent_entity_name
            .as_deref()
            .is_some_and(|parent| parent.eq_ignore_ascii_case(target));
        let per_parent = (is_parent && target_config.is_some()).then(|| {
            self.config
                .records_per_parent
                .saturating_mul(self.config.combination_count())
        });

        debug!(
            entity = %self.entity.name,
            target_entity = target,
            target_total,
            per_parent = per_parent.unwrap_or(0),
            "foreign key range"
        );
        ForeignRange {
            target: target.to_string(),
            per_parent,
            target_total,
        }
    }
}

fn generate_rows(
    task: &EntityTask<'_>,
    columns: &[ColumnPlan<'_>],
    emitted: u64,
    synthesizer: &mut ValueSynthesizer,
) -> Vec<Vec<GeneratedValue>> {
    let fixed: Vec<&[serde_json::Value]> = columns
        .iter()
        .map(|column| task.config.fixed_values(&column.property.name))
        .collect();

    let mut rows = Vec::new();
    for offset in 0..emitted {
        let index = offset + 1;
        let mut combination = offset;
        let row = columns
            .iter()
            .zip(&fixed)
            .map(|(column, values)| {
                if values.is_empty() {
                    return synthesizer.synthesize(&task.entity.name, column, index);
                }
                let radix = values.len() as u64;
                let digit = (combination % radix) as usize;
                combination /= radix;
                synthesizer.fixed(column, &values[digit])
            })
            .collect();
        rows.push(row);
    }
    rows
}

/// Config positions ordered so every parent precedes its children.
///
/// Configs whose parent is unknown count as roots; parent loops fall back to
/// plan order.
fn emission_order(configs: &[EntityConfig]) -> Vec<usize> {
    let names: HashSet<String> = configs
        .iter()
        .map(|config| config.entity.to_lowercase())
        .collect();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut order = Vec::with_capacity(configs.len());
    let mut remaining: Vec<usize> = (0..configs.len()).collect();

    while !remaining.is_empty() {
        let ready = remaining.iter().position(|&position| {
            let config = &configs[position];
            config.parent_entity_name.as_ref().is_none_or(|parent| {
                let parent = parent.to_lowercase();
                parent == config.entity.to_lowercase()
                    || !names.contains(&parent)
                    || emitted.contains(&parent)
            })
        });
        let next = remaining.remove(ready.unwrap_or(0));
        emitted.insert(configs[next].entity.to_lowercase());
        order.push(next);
    }
    order
}
