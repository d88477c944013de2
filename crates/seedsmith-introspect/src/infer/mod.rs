//! Relationship inference over a set of entity descriptors.
//!
//! Detectors run in a fixed order. Each one sees the relationships added by
//! the detectors before it and contributes only edges that are not already
//! present, so the first detector to find an edge owns it.

mod naming;
mod navigation;
mod type_key;

use tracing::{debug, info};

use seedsmith_core::{EntityDescriptor, RelationshipDescriptor};

use crate::options::InferenceOptions;

pub use naming::NamingConventionDetector;
pub use navigation::NavigationShapeDetector;
pub use type_key::TypeKeyDetector;

/// A heuristic that proposes relationships for one entity.
pub trait RelationshipDetector {
    fn name(&self) -> &'static str;

    /// Candidate relationships whose source is `entities[index]`.
    fn detect(&self, entities: &[EntityDescriptor], index: usize) -> Vec<RelationshipDescriptor>;
}

/// Detectors enabled by `options`, in evaluation order.
pub fn detectors(options: &InferenceOptions) -> Vec<Box<dyn RelationshipDetector>> {
    let mut detectors: Vec<Box<dyn RelationshipDetector>> =
        vec![Box::new(NamingConventionDetector::new())];
    if options.type_key_matching {
        detectors.push(Box::new(TypeKeyDetector));
    }
    detectors.push(Box::new(NavigationShapeDetector));
    detectors
}

/// Populate `relationships` on every descriptor. Returns the number of edges added.
pub fn infer_relationships(entities: &mut [EntityDescriptor], options: &InferenceOptions) -> usize {
    let mut added = 0;

    for detector in detectors(options) {
        let mut found = 0;
        for index in 0..entities.len() {
            let candidates = detector.detect(entities, index);
            let entity = &mut entities[index];
            for candidate in candidates {
                if entity.has_relationship(&candidate) {
                    continue;
                }
                debug!(
                    detector = detector.name(),
                    source = %candidate.source_entity,
                    target = %candidate.target_entity,
                    kind = ?candidate.kind,
                    foreign_key = candidate.foreign_key_property_name.as_deref().unwrap_or("-"),
                    "relationship inferred"
                );
                entity.relationships.push(candidate);
                found += 1;
            }
        }
        debug!(detector = detector.name(), relationships = found, "detector finished");
        added += found;
    }

    info!(
        entities = entities.len(),
        relationships = added,
        "relationship inference complete"
    );
    added
}

/// Index of the entity called `name` (short or full name, case-insensitive).
pub(crate) fn find_entity(entities: &[EntityDescriptor], name: &str) -> Option<usize> {
    entities.iter().position(|entity| {
        entity.name.eq_ignore_ascii_case(name) || entity.full_name.eq_ignore_ascii_case(name)
    })
}
