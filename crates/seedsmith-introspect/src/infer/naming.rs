use regex::Regex;

use seedsmith_core::{
    Detector, EntityDescriptor, PropertyDescriptor, RelationshipDescriptor, RelationshipKind,
};

use super::{RelationshipDetector, find_entity};

/// `CustomerId` / `CustomerRefId` style scalars pointing at a known entity.
pub struct NamingConventionDetector {
    pattern: Option<Regex>,
}

impl NamingConventionDetector {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"^(?P<stem>.+?)(?P<reference>Ref)?(?:Id|ID)$").ok(),
        }
    }

    /// Candidate target names, most specific first.
    fn candidates(&self, name: &str) -> Vec<String> {
        let Some(captures) = self.pattern.as_ref().and_then(|pattern| pattern.captures(name))
        else {
            return Vec::new();
        };
        let Some(stem) = captures.name("stem").map(|stem| stem.as_str()) else {
            return Vec::new();
        };
        let mut candidates = vec![stem.to_string()];
        if captures.name("reference").is_some() {
            candidates.push(format!("{stem}Ref"));
        }
        candidates
    }
}

impl Default for NamingConventionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipDetector for NamingConventionDetector {
    fn name(&self) -> &'static str {
        "naming_convention"
    }

    fn detect(&self, entities: &[EntityDescriptor], index: usize) -> Vec<RelationshipDescriptor> {
        let entity = &entities[index];
        entity
            .properties
            .iter()
            .filter(|property| is_candidate(property))
            .filter_map(|property| {
                let target = self
                    .candidates(&property.name)
                    .iter()
                    .filter_map(|candidate| find_entity(entities, candidate))
                    .find(|target| *target != index)?;
                Some(RelationshipDescriptor {
                    source_entity: entity.name.clone(),
                    source_navigation_property: None,
                    target_entity: entities[target].name.clone(),
                    target_navigation_property: None,
                    foreign_key_property_name: Some(property.name.clone()),
                    kind: RelationshipKind::ManyToOne,
                    detected_by: Detector::NamingConvention,
                })
            })
            .collect()
    }
}

fn is_candidate(property: &PropertyDescriptor) -> bool {
    property.is_scalar() && !property.is_key && !property.name.eq_ignore_ascii_case("Id")
}
