//! Public API surface for the seedsmith library.
//!
//! The pipeline runs strictly forward: extract entity descriptors from type
//! metadata, infer relationships, resolve a cycle-free parent per entity,
//! propagate record counts, then generate seed data. Stage crates stay
//! available for callers that need their options.

pub mod error;

use tracing::info;

pub use error::{Error, Result};
pub use seedsmith_core::{
    BrokenEdge, DependencyResolution, Detector, EntityDescriptor, PropertyDescriptor,
    RelationshipDescriptor, RelationshipKind, TypeMetadata, resolve_dependency_order,
};
pub use seedsmith_generate::{
    DocumentTextSink, GenerateOptions, GenerationResult, InsertionAnchor, SourceStyle,
    splice_before_type_close,
};
pub use seedsmith_introspect::{
    ExtractOptions, InMemoryCatalog, InferenceOptions, SolutionTypeCatalog, TypeMetadataProvider,
};
pub use seedsmith_plan::{EntityConfig, GenerationPlan, OutputFormat, compute_record_counts};

/// Parse a host metadata export into a catalog.
pub fn load_catalog(json: &str) -> Result<InMemoryCatalog> {
    Ok(InMemoryCatalog::from_json(json)?)
}

/// Descriptors for the named types, with default extraction options.
///
/// Unknown names are skipped and duplicates collapse to one descriptor.
pub fn analyze_entities<P, S>(provider: &P, type_names: &[S]) -> Vec<EntityDescriptor>
where
    P: TypeMetadataProvider + ?Sized,
    S: AsRef<str>,
{
    seedsmith_introspect::analyze_entities(provider, type_names, &ExtractOptions::default())
}

/// Every entity the catalog declares, in catalog order.
pub fn discover_entities<C>(catalog: &C) -> Vec<EntityDescriptor>
where
    C: SolutionTypeCatalog + TypeMetadataProvider + ?Sized,
{
    seedsmith_introspect::discover_entities(catalog, &ExtractOptions::default())
}

/// Run the default detectors and merge their findings into `entities`.
///
/// Returns the number of relationships added.
pub fn infer_relationships(entities: &mut [EntityDescriptor]) -> usize {
    seedsmith_introspect::infer_relationships(entities, &InferenceOptions::default())
}

/// Seed data for `configs` in `format`, dated from today.
pub fn generate_seed_data(
    entities: &[EntityDescriptor],
    configs: &[EntityConfig],
    format: OutputFormat,
) -> Result<String> {
    let result = seedsmith_generate::generate(
        entities,
        configs,
        &GenerateOptions::with_format(format),
    )?;
    info!(
        format = %format,
        entities = result.entities.len(),
        "seed data generated"
    );
    Ok(result.text)
}
