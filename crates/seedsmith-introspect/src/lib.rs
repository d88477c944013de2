//! Type-metadata analysis: extraction, discovery and relationship inference.

pub mod adapter;
pub mod cache;
pub mod catalog;
pub mod discover;
pub mod extract;
pub mod infer;
pub mod options;

pub use adapter::{SolutionTypeCatalog, TypeMetadataProvider};
pub use cache::TypeCache;
pub use catalog::{CatalogDocument, InMemoryCatalog};
pub use discover::discover_entities;
pub use extract::{analyze_entities, extract_entity};
pub use infer::{RelationshipDetector, infer_relationships};
pub use options::{ExtractOptions, InferenceOptions};
