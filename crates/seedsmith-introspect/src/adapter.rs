use seedsmith_core::TypeMetadata;

/// Host contract: resolve a type identifier to its metadata.
///
/// Implementations should accept fully qualified names and, where the
/// short name is unambiguous, short names.
pub trait TypeMetadataProvider {
    fn type_metadata(&self, name: &str) -> Option<&TypeMetadata>;
}

/// Host contract: enumerate every type visible to an analysis.
pub trait SolutionTypeCatalog {
    /// Qualified type names in declaration order.
    fn type_names(&self) -> Vec<String>;
}
