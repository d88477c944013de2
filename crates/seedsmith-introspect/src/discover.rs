use std::collections::BTreeSet;

use tracing::info;

use seedsmith_core::{EntityDescriptor, TypeKind, has_annotation};

use crate::adapter::{SolutionTypeCatalog, TypeMetadataProvider};
use crate::cache::TypeCache;
use crate::extract::extract_entity;
use crate::options::ExtractOptions;

/// Find the entity types in a catalog and extract their descriptors.
///
/// A class type is an entity when it has a key property, carries a `Table`
/// annotation, or is the element type of a collection navigation on another
/// entity. Results keep catalog order.
pub fn discover_entities<C>(catalog: &C, options: &ExtractOptions) -> Vec<EntityDescriptor>
where
    C: SolutionTypeCatalog + TypeMetadataProvider + ?Sized,
{
    let mut cache = TypeCache::new(catalog);
    let mut seen = BTreeSet::new();
    let mut candidates = Vec::new();

    for name in catalog.type_names() {
        let Some(metadata) = cache.resolve(&name) else {
            continue;
        };
        if metadata.kind != TypeKind::Class || metadata.is_static {
            continue;
        }
        if !seen.insert(metadata.qualified_name()) {
            continue;
        }
        let descriptor = extract_entity(metadata, &mut cache, options);
        let mapped = has_annotation(&metadata.annotations, "Table");
        candidates.push((descriptor, mapped));
    }

    let mut accepted: Vec<bool> = candidates
        .iter()
        .map(|(descriptor, mapped)| *mapped || descriptor.key_properties().next().is_some())
        .collect();

    // Collection elements of accepted entities join until nothing changes.
    loop {
        let referenced: BTreeSet<String> = candidates
            .iter()
            .zip(&accepted)
            .filter(|(_, accepted)| **accepted)
            .flat_map(|((descriptor, _), _)| descriptor.properties.iter())
            .filter(|property| property.is_collection && property.is_navigation)
            .filter_map(|property| property.element_type_name.clone())
            .collect();

        let mut changed = false;
        for ((descriptor, _), accepted) in candidates.iter().zip(accepted.iter_mut()) {
            if !*accepted && referenced.contains(&descriptor.name) {
                *accepted = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let entities: Vec<EntityDescriptor> = candidates
        .into_iter()
        .zip(accepted)
        .filter(|(_, accepted)| *accepted)
        .map(|((descriptor, _), _)| descriptor)
        .collect();

    info!(entities = entities.len(), "entities discovered");
    entities
}
