use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, info};

use seedsmith_core::{DependencyResolution, EntityDescriptor};

use crate::model::EntityConfig;

/// Recompute `total_record_count` on every config.
///
/// Roots (no parent, or a parent outside `configs`) take their own
/// `record_count`; children get `parent total × records_per_parent`.
/// Configs not reachable from any root are counted as roots.
pub fn compute_record_counts(configs: &mut [EntityConfig]) {
    let index: BTreeMap<String, usize> = configs
        .iter()
        .enumerate()
        .map(|(position, config)| (config.entity.to_lowercase(), position))
        .collect();

    let parent_index: Vec<Option<usize>> = configs
        .iter()
        .enumerate()
        .map(|(position, config)| {
            config
                .parent_entity_name
                .as_ref()
                .and_then(|parent| index.get(&parent.to_lowercase()).copied())
                .filter(|parent| *parent != position)
        })
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); configs.len()];
    for (child, parent) in parent_index.iter().enumerate() {
        if let Some(parent) = parent {
            children[*parent].push(child);
        }
    }

    let mut finalized = vec![false; configs.len()];
    let roots: Vec<usize> = (0..configs.len())
        .filter(|position| parent_index[*position].is_none())
        .collect();
    propagate_from(configs, &roots, &children, &mut finalized);

    // Parent chains that loop back on themselves never reach a root.
    while let Some(orphan) = finalized.iter().position(|done| !*done) {
        debug!(entity = %configs[orphan].entity, "unreachable from roots, counting as root");
        propagate_from(configs, &[orphan], &children, &mut finalized);
    }

    info!(
        entities = configs.len(),
        roots = roots.len(),
        "record counts propagated"
    );
}

fn propagate_from(
    configs: &mut [EntityConfig],
    roots: &[usize],
    children: &[Vec<usize>],
    finalized: &mut [bool],
) {
    let mut queue = VecDeque::new();
    for &root in roots {
        if finalized[root] {
            continue;
        }
        configs[root].total_record_count = configs[root].record_count;
        finalized[root] = true;
        queue.push_back(root);
    }

    while let Some(parent) = queue.pop_front() {
        let parent_total = configs[parent].total_record_count;
        for &child in &children[parent] {
            if finalized[child] {
                continue;
            }
            let total = parent_total.saturating_mul(configs[child].records_per_parent);
            configs[child].total_record_count = total;
            finalized[child] = true;
            debug!(
                entity = %configs[child].entity,
                parent = %configs[parent].entity,
                total,
                "record count propagated"
            );
            queue.push_back(child);
        }
    }
}

/// Copy resolved parents into the configs and recompute totals.
pub fn apply_parents(configs: &mut [EntityConfig], resolution: &DependencyResolution) {
    for config in configs.iter_mut() {
        config.parent_entity_name = resolution.parent_of(&config.entity).map(str::to_string);
    }
    compute_record_counts(configs);
}

/// Default configs for every entity, in generation order, with parents applied.
pub fn scaffold_configs(
    entities: &[EntityDescriptor],
    resolution: &DependencyResolution,
    record_count: u64,
) -> Vec<EntityConfig> {
    let mut ordered: Vec<&EntityDescriptor> = resolution
        .order
        .iter()
        .filter_map(|name| entities.iter().find(|entity| &entity.name == name))
        .collect();
    for entity in entities {
        if !ordered.iter().any(|existing| existing.name == entity.name) {
            ordered.push(entity);
        }
    }

    let mut configs: Vec<EntityConfig> = ordered
        .into_iter()
        .map(|entity| EntityConfig::root(entity.name.clone(), record_count))
        .collect();
    apply_parents(&mut configs, resolution);
    configs
}
