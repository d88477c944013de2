use seedsmith_core::{
    Detector, EntityDescriptor, PropertyDescriptor, RelationshipDescriptor, RelationshipKind,
    normalize_type_name,
};

use super::RelationshipDetector;

/// Scalars whose declared type matches another entity's single key type.
pub struct TypeKeyDetector;

impl RelationshipDetector for TypeKeyDetector {
    fn name(&self) -> &'static str {
        "type_key_match"
    }

    fn detect(&self, entities: &[EntityDescriptor], index: usize) -> Vec<RelationshipDescriptor> {
        let entity = &entities[index];
        let mut found = Vec::new();

        for property in &entity.properties {
            if !property.is_scalar() || property.is_key || is_related(entity, property) {
                continue;
            }
            let declared = normalize_type_name(&property.declared_type_name);
            let lowered = property.name.to_lowercase();

            let target = entities.iter().enumerate().find(|(candidate, target)| {
                if *candidate == index {
                    return false;
                }
                let mut keys = target.key_properties();
                let (Some(key), None) = (keys.next(), keys.next()) else {
                    return false;
                };
                normalize_type_name(&key.declared_type_name) == declared
                    && (lowered.contains(&target.name.to_lowercase())
                        || lowered.ends_with("key")
                        || lowered.ends_with("id"))
            });

            if let Some((_, target)) = target {
                found.push(RelationshipDescriptor {
                    source_entity: entity.name.clone(),
                    source_navigation_property: None,
                    target_entity: target.name.clone(),
                    target_navigation_property: None,
                    foreign_key_property_name: Some(property.name.clone()),
                    kind: RelationshipKind::ManyToOne,
                    detected_by: Detector::TypeKeyMatch,
                });
            }
        }

        found
    }
}

/// Already used as a foreign key or navigation by an earlier detector.
fn is_related(entity: &EntityDescriptor, property: &PropertyDescriptor) -> bool {
    entity.relationships.iter().any(|relationship| {
        let named = |candidate: &Option<String>| {
            candidate
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(&property.name))
        };
        named(&relationship.foreign_key_property_name)
            || named(&relationship.source_navigation_property)
    })
}
