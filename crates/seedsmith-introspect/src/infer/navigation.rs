use seedsmith_core::{
    Detector, EntityDescriptor, PropertyDescriptor, RelationshipDescriptor, RelationshipKind,
};

use super::{RelationshipDetector, find_entity};

/// Relationships implied by entity-typed members: collections and references.
pub struct NavigationShapeDetector;

impl RelationshipDetector for NavigationShapeDetector {
    fn name(&self) -> &'static str {
        "navigation_shape"
    }

    fn detect(&self, entities: &[EntityDescriptor], index: usize) -> Vec<RelationshipDescriptor> {
        let entity = &entities[index];
        let mut found = Vec::new();

        for property in &entity.properties {
            if property.is_enum {
                continue;
            }
            let Some(target_index) = property
                .element_type_name
                .as_deref()
                .and_then(|element| find_entity(entities, element))
            else {
                continue;
            };
            let target = &entities[target_index];

            let relationship = if property.is_collection {
                collection_relationship(entity, property, target)
            } else {
                reference_relationship(entity, property, target)
            };
            found.push(relationship);
        }

        found
    }
}

/// `OneToMany` from the owning side, with the target's way back when it has one.
fn collection_relationship(
    entity: &EntityDescriptor,
    property: &PropertyDescriptor,
    target: &EntityDescriptor,
) -> RelationshipDescriptor {
    let target_navigation = back_navigation(target, entity, false)
        .or_else(|| back_navigation(target, entity, true))
        .map(|back| back.name.clone());
    let foreign_key = target
        .properties
        .iter()
        .find(|candidate| {
            candidate.is_foreign_key
                && candidate
                    .foreign_key_target_entity
                    .as_deref()
                    .is_some_and(|name| refers_to(entity, name))
        })
        .map(|candidate| candidate.name.clone());

    RelationshipDescriptor {
        source_entity: entity.name.clone(),
        source_navigation_property: Some(property.name.clone()),
        target_entity: target.name.clone(),
        target_navigation_property: target_navigation,
        foreign_key_property_name: foreign_key,
        kind: RelationshipKind::OneToMany,
        detected_by: Detector::NavigationShape,
    }
}

fn reference_relationship(
    entity: &EntityDescriptor,
    property: &PropertyDescriptor,
    target: &EntityDescriptor,
) -> RelationshipDescriptor {
    let sibling = [
        format!("{}Id", target.name),
        format!("{}Id", property.name),
    ]
    .into_iter()
    .find_map(|candidate| {
        entity
            .scalar_properties()
            .find(|sibling| sibling.name.eq_ignore_ascii_case(&candidate))
    });

    let target_navigation = back_navigation(target, entity, true)
        .or_else(|| back_navigation(target, entity, false))
        .map(|back| back.name.clone());

    RelationshipDescriptor {
        source_entity: entity.name.clone(),
        source_navigation_property: Some(property.name.clone()),
        target_entity: target.name.clone(),
        target_navigation_property: target_navigation,
        foreign_key_property_name: Some(
            sibling
                .map(|sibling| sibling.name.clone())
                .unwrap_or_else(|| property.name.clone()),
        ),
        kind: RelationshipKind::ManyToOne,
        detected_by: Detector::NavigationShape,
    }
}

/// Navigation on `target` pointing back at `source`, collection or reference.
fn back_navigation<'a>(
    target: &'a EntityDescriptor,
    source: &EntityDescriptor,
    collection: bool,
) -> Option<&'a PropertyDescriptor> {
    target.properties.iter().find(|candidate| {
        !candidate.is_enum
            && candidate.is_collection == collection
            && candidate
                .element_type_name
                .as_deref()
                .is_some_and(|name| refers_to(source, name))
    })
}

fn refers_to(entity: &EntityDescriptor, name: &str) -> bool {
    entity.name.eq_ignore_ascii_case(name) || entity.full_name.eq_ignore_ascii_case(name)
}
