//! Seed-data generation for analyzed entities.
//!
//! This crate turns entity descriptors and entity configs into deterministic
//! seed data in one of five text formats, and splices generated source code
//! into host documents.

pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;
pub mod splice;

pub use engine::{GenerationEngine, GenerationResult, generate};
pub use errors::{GenerationError, Result};
pub use generators::{GeneratedValue, ValueKind, deterministic_uuid};
pub use model::{EntityReport, GenerateOptions, SourceStyle};
pub use splice::{
    DocumentTextSink, InMemoryDocuments, InsertionAnchor, apply_anchor, locate_type_body_end,
    splice_before_type_close,
};
