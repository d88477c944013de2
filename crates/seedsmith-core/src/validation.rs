use std::collections::BTreeSet;

use crate::descriptor::EntityDescriptor;
use crate::error::{Error, Result};

/// Validate internal consistency of a descriptor set.
///
/// This checks:
/// - duplicate entity names
/// - duplicate property names within an entity (case-insensitive)
/// - relationships whose source is not the owning entity
/// - relationships targeting an entity outside the set
pub fn validate_descriptors(entities: &[EntityDescriptor]) -> Result<()> {
    let mut names = BTreeSet::new();
    for entity in entities {
        if !names.insert(entity.name.as_str()) {
            return Err(Error::InvalidModel(format!(
                "duplicate entity name: {}",
                entity.name
            )));
        }

        let mut properties = BTreeSet::new();
        for property in &entity.properties {
            if !properties.insert(property.name.to_lowercase()) {
                return Err(Error::InvalidModel(format!(
                    "duplicate property name: {}.{}",
                    entity.name, property.name
                )));
            }
        }
    }

    for entity in entities {
        for relationship in &entity.relationships {
            if relationship.source_entity != entity.name {
                return Err(Error::InvalidModel(format!(
                    "relationship on {} declares source {}",
                    entity.name, relationship.source_entity
                )));
            }
            if !names.contains(relationship.target_entity.as_str()) {
                return Err(Error::InvalidModel(format!(
                    "relationship target not found: {} -> {}",
                    entity.name, relationship.target_entity
                )));
            }
        }
    }

    Ok(())
}
