use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use seedsmith_core::{Error, Result, TypeMetadata};

use crate::adapter::{SolutionTypeCatalog, TypeMetadataProvider};

/// Serialized form of a host metadata export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub types: Vec<TypeMetadata>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogInput {
    Document(CatalogDocument),
    Types(Vec<TypeMetadata>),
}

/// Metadata provider and type catalog backed by an in-memory type list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    types: Vec<TypeMetadata>,
    by_qualified: HashMap<String, usize>,
    by_short: HashMap<String, usize>,
}

impl InMemoryCatalog {
    pub fn new(types: Vec<TypeMetadata>) -> Self {
        let mut catalog = Self::default();
        for metadata in types {
            catalog.insert(metadata);
        }
        catalog
    }

    /// Parse either `{"types": [...]}` or a bare array of types.
    pub fn from_json(json: &str) -> Result<Self> {
        let input: CatalogInput = serde_json::from_str(json)
            .map_err(|err| Error::Metadata(format!("invalid metadata document: {err}")))?;
        let types = match input {
            CatalogInput::Document(document) => document.types,
            CatalogInput::Types(types) => types,
        };
        Ok(Self::new(types))
    }

    /// Register a type; a later type with the same qualified name replaces the earlier one.
    pub fn insert(&mut self, metadata: TypeMetadata) {
        let qualified = metadata.qualified_name();
        if let Some(&index) = self.by_qualified.get(&qualified) {
            self.types[index] = metadata;
            return;
        }

        let index = self.types.len();
        if self.by_short.contains_key(&metadata.name) {
            debug!(name = %metadata.name, "ambiguous short type name, keeping first");
        } else {
            self.by_short.insert(metadata.name.clone(), index);
        }
        self.by_qualified.insert(qualified, index);
        self.types.push(metadata);
    }

    pub fn types(&self) -> &[TypeMetadata] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeMetadataProvider for InMemoryCatalog {
    fn type_metadata(&self, name: &str) -> Option<&TypeMetadata> {
        self.by_qualified
            .get(name)
            .or_else(|| self.by_short.get(name))
            .and_then(|index| self.types.get(*index))
    }
}

impl SolutionTypeCatalog for InMemoryCatalog {
    fn type_names(&self) -> Vec<String> {
        self.types.iter().map(TypeMetadata::qualified_name).collect()
    }
}
