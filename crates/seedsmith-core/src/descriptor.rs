use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::annotations::AnnotationValue;

/// Structural description of one analyzed data-model type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityDescriptor {
    pub name: String,
    pub full_name: String,
    /// Namespace the type was declared in, when known.
    pub namespace_hint: Option<String>,
    pub is_abstract: bool,
    /// Storage name override from a `Table` annotation.
    pub table_hint: Option<String>,
    /// Non-trivial base type, if any.
    pub base_type_name: Option<String>,
    /// First-declared-wins across the inheritance chain.
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDescriptor>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            namespace_hint: None,
            is_abstract: false,
            table_hint: None,
            base_type_name: None,
            properties: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Case-insensitive property lookup.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|property| property.name.eq_ignore_ascii_case(name))
    }

    pub fn key_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|property| property.is_key)
    }

    /// Properties that carry a value of their own (no navigations or collections).
    pub fn scalar_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|property| property.is_scalar())
    }

    /// Table hint when present, otherwise the entity name.
    pub fn storage_name(&self) -> &str {
        self.table_hint.as_deref().unwrap_or(&self.name)
    }

    pub fn many_to_one_targets(&self) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter(|relationship| relationship.kind == RelationshipKind::ManyToOne)
            .map(|relationship| relationship.target_entity.as_str())
    }

    /// True when an equivalent relationship is already recorded.
    pub fn has_relationship(&self, candidate: &RelationshipDescriptor) -> bool {
        self.relationships
            .iter()
            .any(|existing| existing.is_equivalent(candidate))
    }
}

/// One eligible member of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyDescriptor {
    pub name: String,
    /// Signature-style type name, e.g. `decimal?` or `ICollection<Order>`.
    pub declared_type_name: String,
    /// Storage column name (defaults to `name`).
    pub column_hint: String,
    /// Qualified name of the type that declared the member.
    pub declaring_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    pub is_key: bool,
    pub is_foreign_key: bool,
    pub is_required: bool,
    pub is_enum: bool,
    pub is_nullable: bool,
    pub is_collection: bool,
    pub is_navigation: bool,
    pub is_auto_generated: bool,

    pub max_length: Option<u32>,
    pub min_length: Option<u32>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub regex_pattern: Option<String>,
    pub default_value: Option<AnnotationValue>,

    pub foreign_key_target_entity: Option<String>,
    pub foreign_key_target_property: Option<String>,

    /// Element type for collections, referenced type for navigations.
    pub element_type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_members: Vec<EnumMember>,
}

impl PropertyDescriptor {
    pub fn new(
        name: impl Into<String>,
        declared_type_name: impl Into<String>,
        declaring_type: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            column_hint: name.clone(),
            name,
            declared_type_name: declared_type_name.into(),
            declaring_type: declaring_type.into(),
            notes: Vec::new(),
            is_key: false,
            is_foreign_key: false,
            is_required: false,
            is_enum: false,
            is_nullable: false,
            is_collection: false,
            is_navigation: false,
            is_auto_generated: false,
            max_length: None,
            min_length: None,
            min_value: None,
            max_value: None,
            regex_pattern: None,
            default_value: None,
            foreign_key_target_entity: None,
            foreign_key_target_property: None,
            element_type_name: None,
            enum_members: Vec::new(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_navigation && !self.is_collection
    }
}

/// Named constant of an enum-typed property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    pub description: Option<String>,
}

/// Multiplicity of a relationship, seen from the source entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// Heuristic that produced a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Detector {
    NamingConvention,
    TypeKeyMatch,
    NavigationShape,
}

/// Inferred relationship between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipDescriptor {
    pub source_entity: String,
    pub source_navigation_property: Option<String>,
    pub target_entity: String,
    pub target_navigation_property: Option<String>,
    pub foreign_key_property_name: Option<String>,
    pub kind: RelationshipKind,
    pub detected_by: Detector,
}

impl RelationshipDescriptor {
    /// Same endpoints and the same navigation or foreign-key property.
    pub fn is_equivalent(&self, other: &RelationshipDescriptor) -> bool {
        if !self.source_entity.eq_ignore_ascii_case(&other.source_entity)
            || !self.target_entity.eq_ignore_ascii_case(&other.target_entity)
        {
            return false;
        }
        let same_navigation = matches!(
            (&self.source_navigation_property, &other.source_navigation_property),
            (Some(left), Some(right)) if left.eq_ignore_ascii_case(right)
        );
        let same_foreign_key = matches!(
            (&self.foreign_key_property_name, &other.foreign_key_property_name),
            (Some(left), Some(right)) if left.eq_ignore_ascii_case(right)
        );
        same_navigation || same_foreign_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn many_to_one(navigation: Option<&str>, foreign_key: Option<&str>) -> RelationshipDescriptor {
        RelationshipDescriptor {
            source_entity: "Order".to_string(),
            source_navigation_property: navigation.map(str::to_string),
            target_entity: "Customer".to_string(),
            target_navigation_property: None,
            foreign_key_property_name: foreign_key.map(str::to_string),
            kind: RelationshipKind::ManyToOne,
            detected_by: Detector::NamingConvention,
        }
    }

    #[test]
    fn equivalence_matches_on_foreign_key_or_navigation() {
        let by_fk = many_to_one(None, Some("CustomerId"));
        let by_nav = many_to_one(Some("Customer"), Some("CustomerId"));
        assert!(by_fk.is_equivalent(&by_nav));

        let other_fk = many_to_one(None, Some("BillingCustomerId"));
        assert!(!by_fk.is_equivalent(&other_fk));

        let nav_only = many_to_one(Some("Customer"), None);
        assert!(nav_only.is_equivalent(&by_nav));
        assert!(!nav_only.is_equivalent(&by_fk));
    }

    #[test]
    fn storage_name_prefers_table_hint() {
        let mut entity = EntityDescriptor::new("Product", "Shop.Product");
        assert_eq!(entity.storage_name(), "Product");
        entity.table_hint = Some("Products".to_string());
        assert_eq!(entity.storage_name(), "Products");
    }
}
