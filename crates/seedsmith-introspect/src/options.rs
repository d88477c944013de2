use seedsmith_core::{CORE_NAMESPACE, ROOT_OBJECT_TYPES};

/// Options that control how type metadata is turned into descriptors.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Base types that end an inheritance walk.
    pub root_types: Vec<String>,
    /// Namespace whose types are never navigation targets.
    pub core_namespace: String,
    /// Generic type names recognized as collection shapes.
    pub collection_types: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            root_types: ROOT_OBJECT_TYPES.iter().map(|name| name.to_string()).collect(),
            core_namespace: CORE_NAMESPACE.to_string(),
            collection_types: [
                "ICollection",
                "IList",
                "List",
                "IEnumerable",
                "ISet",
                "HashSet",
                "Collection",
                "IReadOnlyCollection",
                "IReadOnlyList",
                "ObservableCollection",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
        }
    }
}

impl ExtractOptions {
    pub fn is_root_type(&self, name: &str) -> bool {
        self.root_types.iter().any(|root| root == name)
    }

    pub fn is_collection_type(&self, name: &str) -> bool {
        self.collection_types.iter().any(|candidate| candidate == name)
    }
}

/// Options that control relationship inference.
#[derive(Debug, Clone, Default)]
pub struct InferenceOptions {
    /// Enable the declared-type/key-type matching detector.
    ///
    /// Off by default: it relates any `...Id`/`...Key` scalar to the first
    /// entity whose key has the same type.
    pub type_key_matching: bool,
}
