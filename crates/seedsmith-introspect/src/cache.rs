use std::collections::HashMap;

use seedsmith_core::{TypeMetadata, TypeRef};

use crate::adapter::TypeMetadataProvider;

/// Memoized type lookups scoped to a single analysis run.
pub struct TypeCache<'p, P: TypeMetadataProvider + ?Sized> {
    provider: &'p P,
    resolved: HashMap<String, Option<&'p TypeMetadata>>,
    hits: u64,
    misses: u64,
}

impl<'p, P: TypeMetadataProvider + ?Sized> TypeCache<'p, P> {
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            resolved: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn resolve(&mut self, name: &str) -> Option<&'p TypeMetadata> {
        if let Some(cached) = self.resolved.get(name) {
            self.hits += 1;
            return *cached;
        }
        self.misses += 1;
        let provider = self.provider;
        let found = provider.type_metadata(name);
        self.resolved.insert(name.to_string(), found);
        found
    }

    /// Resolve a member type reference, trying the qualified name first.
    pub fn resolve_ref(&mut self, type_ref: &TypeRef) -> Option<&'p TypeMetadata> {
        let type_ref = type_ref.unwrap_nullable();
        let qualified = type_ref.full_name();
        if qualified != type_ref.name {
            if let Some(found) = self.resolve(&qualified) {
                return Some(found);
            }
        }
        self.resolve(&type_ref.name)
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
