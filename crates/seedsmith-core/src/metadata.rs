use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::annotations::Annotation;

/// Platform core namespace; types inside it are never navigation targets.
pub const CORE_NAMESPACE: &str = "System";

/// Fully qualified names of the platform root object type.
pub const ROOT_OBJECT_TYPES: &[&str] = &["System.Object", "object", "Object"];

/// Accessor visibility, ordered from least to most visible.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Private,
    Protected,
    Internal,
    Public,
}

/// Shape of a type as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Primitive,
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
}

/// Reference to a type in a member signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeRef {
    /// Short type name (e.g. `int`, `Order`, `ICollection`).
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            kind: TypeKind::Class,
            nullable: false,
            type_arguments: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(namespace) if !namespace.is_empty() => format!("{namespace}.{}", self.name),
            _ => self.name.clone(),
        }
    }

    /// Unwraps `Nullable<T>` into `T` marked nullable.
    pub fn unwrap_nullable(&self) -> TypeRef {
        if self.name == "Nullable" && self.type_arguments.len() == 1 {
            let mut inner = self.type_arguments[0].clone();
            inner.nullable = true;
            return inner;
        }
        self.clone()
    }

    /// Signature-style rendering, e.g. `ICollection<Order>` or `int?`.
    pub fn display_name(&self) -> String {
        let inner = self.unwrap_nullable();
        let mut rendered = inner.name.clone();
        if !inner.type_arguments.is_empty() {
            let args: Vec<String> = inner
                .type_arguments
                .iter()
                .map(TypeRef::display_name)
                .collect();
            rendered = format!("{rendered}<{}>", args.join(", "));
        }
        if inner.nullable {
            rendered.push('?');
        }
        rendered
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == TypeKind::Primitive
            || ScalarKind::from_type_name(&self.unwrap_nullable().name) != ScalarKind::Other
    }

    pub fn is_in_namespace(&self, namespace: &str) -> bool {
        match &self.namespace {
            Some(own) => own == namespace || own.starts_with(&format!("{namespace}.")),
            None => false,
        }
    }
}

/// Named constant of an enum type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnumMemberMetadata {
    pub name: String,
    pub value: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

/// Declared member of a type (property-shaped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MemberMetadata {
    pub name: String,
    pub type_ref: TypeRef,
    #[serde(default)]
    pub is_static: bool,
    /// Overridable/virtual in the host language.
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getter: Option<Accessibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setter: Option<Accessibility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

/// Type metadata as supplied by the host's metadata provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TypeMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_static: bool,
    /// Qualified (or short) name of the base type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_members: Vec<EnumMemberMetadata>,
}

impl TypeMetadata {
    /// Fully qualified name, falling back to `namespace.name`.
    pub fn qualified_name(&self) -> String {
        if let Some(full_name) = &self.full_name {
            return full_name.clone();
        }
        match &self.namespace {
            Some(namespace) if !namespace.is_empty() => format!("{namespace}.{}", self.name),
            _ => self.name.clone(),
        }
    }
}

/// Coarse scalar classification of a declared type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Integer,
    Decimal,
    Text,
    Char,
    DateTime,
    Date,
    Time,
    Guid,
    Other,
}

impl ScalarKind {
    /// Classify a declared type name such as `int?`, `System.Decimal` or `Nullable<Guid>`.
    pub fn from_type_name(type_name: &str) -> ScalarKind {
        let mut name = type_name.trim().trim_end_matches('?');
        if let Some(inner) = name
            .strip_prefix("Nullable<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            name = inner.trim().trim_end_matches('?');
        }
        let name = name.strip_prefix("System.").unwrap_or(name);

        match name {
            "bool" | "Boolean" => ScalarKind::Bool,
            "byte" | "sbyte" | "short" | "ushort" | "int" | "uint" | "long" | "ulong" | "Byte"
            | "SByte" | "Int16" | "UInt16" | "Int32" | "UInt32" | "Int64" | "UInt64" => {
                ScalarKind::Integer
            }
            "decimal" | "double" | "float" | "Decimal" | "Double" | "Single" => {
                ScalarKind::Decimal
            }
            "string" | "String" => ScalarKind::Text,
            "char" | "Char" => ScalarKind::Char,
            "DateTime" | "DateTimeOffset" => ScalarKind::DateTime,
            "DateOnly" => ScalarKind::Date,
            "TimeOnly" | "TimeSpan" => ScalarKind::Time,
            "Guid" => ScalarKind::Guid,
            _ => ScalarKind::Other,
        }
    }
}

/// Strip nullability markers so declared type names compare by shape.
pub fn normalize_type_name(type_name: &str) -> String {
    let name = type_name.trim().trim_end_matches('?');
    let name = name
        .strip_prefix("Nullable<")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(name);
    let name = name.strip_prefix("System.").unwrap_or(name);
    match ScalarKind::from_type_name(name) {
        ScalarKind::Other => name.to_string(),
        _ => canonical_scalar_name(name).to_string(),
    }
}

fn canonical_scalar_name(name: &str) -> &str {
    match name {
        "Boolean" => "bool",
        "Byte" => "byte",
        "SByte" => "sbyte",
        "Int16" => "short",
        "UInt16" => "ushort",
        "Int32" => "int",
        "UInt32" => "uint",
        "Int64" => "long",
        "UInt64" => "ulong",
        "Decimal" => "decimal",
        "Double" => "double",
        "Single" => "float",
        "String" => "string",
        "Char" => "char",
        other => other,
    }
}
