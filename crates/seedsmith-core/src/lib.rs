//! Core contracts and helpers for seedsmith.
//!
//! This crate defines the host metadata model, the entity/relationship
//! descriptors produced by analysis, and the dependency graph used to order
//! and parent entities for seed-data generation.

pub mod annotations;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod validation;

pub use annotations::{Annotation, AnnotationValue, find_annotation, has_annotation};
pub use descriptor::{
    Detector, EntityDescriptor, EnumMember, PropertyDescriptor, RelationshipDescriptor,
    RelationshipKind,
};
pub use error::{Error, Result};
pub use graph::{BrokenEdge, DependencyGraph, DependencyResolution, resolve_dependency_order};
pub use metadata::{
    Accessibility, CORE_NAMESPACE, EnumMemberMetadata, MemberMetadata, ROOT_OBJECT_TYPES,
    ScalarKind, TypeKind, TypeMetadata, TypeRef, normalize_type_name,
};
pub use validation::validate_descriptors;

/// Current contract version for serialized descriptor sets.
pub const DESCRIPTOR_VERSION: &str = "0.1";
