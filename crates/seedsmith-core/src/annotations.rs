use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const ATTRIBUTE_SUFFIX: &str = "Attribute";

/// Argument value attached to an annotation by the host metadata provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnnotationValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer view; floats are accepted only when they carry no fraction.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AnnotationValue::Int(value) => Some(*value),
            AnnotationValue::Float(value) if value.fract() == 0.0 && value.is_finite() => {
                Some(*value as i64)
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnnotationValue::Int(value) => Some(*value as f64),
            AnnotationValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Last segment of an enum-like reference such as `DatabaseGeneratedOption.Identity`.
    pub fn as_enum_member(&self) -> Option<&str> {
        self.as_str()
            .map(|value| value.rsplit('.').next().unwrap_or(value))
    }

    /// Render the value the way it would appear in a literal position.
    pub fn render(&self) -> String {
        match self {
            AnnotationValue::Null => "null".to_string(),
            AnnotationValue::Bool(value) => value.to_string(),
            AnnotationValue::Int(value) => value.to_string(),
            AnnotationValue::Float(value) => value.to_string(),
            AnnotationValue::Text(value) => value.clone(),
            AnnotationValue::List(values) => {
                let parts: Vec<String> = values.iter().map(AnnotationValue::render).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

/// Attribute-like annotation on a type, member or enum member.
///
/// Positional and named arguments are kept as typed values so that callers
/// only ever pattern-match on shapes and get `None` back on a mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Annotation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positional: Vec<AnnotationValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named: BTreeMap<String, AnnotationValue>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positional: Vec::new(),
            named: BTreeMap::new(),
        }
    }

    pub fn with_positional(mut self, value: AnnotationValue) -> Self {
        self.positional.push(value);
        self
    }

    pub fn with_named(mut self, key: impl Into<String>, value: AnnotationValue) -> Self {
        self.named.insert(key.into(), value);
        self
    }

    /// Name without namespace qualification or the conventional `Attribute` suffix.
    pub fn simple_name(&self) -> &str {
        let name = self.name.rsplit('.').next().unwrap_or(&self.name);
        match name.strip_suffix(ATTRIBUTE_SUFFIX) {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => name,
        }
    }

    /// True when the annotation matches `name` in either spelling convention.
    pub fn is(&self, name: &str) -> bool {
        self.simple_name().eq_ignore_ascii_case(name)
    }

    pub fn positional(&self, index: usize) -> Option<&AnnotationValue> {
        self.positional.get(index)
    }

    pub fn named(&self, key: &str) -> Option<&AnnotationValue> {
        self.named
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    }

    /// Named argument `key` if present, otherwise positional argument `index`.
    pub fn argument(&self, index: usize, key: &str) -> Option<&AnnotationValue> {
        self.named(key).or_else(|| self.positional(index))
    }
}

/// First annotation matching `name`.
pub fn find_annotation<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|annotation| annotation.is(name))
}

pub fn has_annotation(annotations: &[Annotation], name: &str) -> bool {
    find_annotation(annotations, name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_bare_suffixed_and_qualified_spellings() {
        assert!(Annotation::new("Key").is("Key"));
        assert!(Annotation::new("KeyAttribute").is("key"));
        assert!(Annotation::new("System.ComponentModel.DataAnnotations.KeyAttribute").is("Key"));
        assert!(!Annotation::new("Keyless").is("Key"));
        assert_eq!(Annotation::new("Attribute").simple_name(), "Attribute");
    }

    #[test]
    fn argument_prefers_named_over_positional() {
        let annotation = Annotation::new("Column")
            .with_positional(AnnotationValue::Text("positional".to_string()))
            .with_named("Name", AnnotationValue::Text("named".to_string()));
        assert_eq!(
            annotation.argument(0, "name").and_then(AnnotationValue::as_str),
            Some("named")
        );
    }

    #[test]
    fn mismatched_shapes_yield_none() {
        let value = AnnotationValue::Text("ten".to_string());
        assert_eq!(value.as_i64(), None);
        assert_eq!(AnnotationValue::Float(2.5).as_i64(), None);
        assert_eq!(AnnotationValue::Float(2.0).as_i64(), Some(2));
        assert_eq!(
            AnnotationValue::Text("DatabaseGeneratedOption.Identity".to_string()).as_enum_member(),
            Some("Identity")
        );
    }

    #[test]
    fn deserializes_untagged_values() {
        let annotation: Annotation = serde_json::from_str(
            r#"{"name":"Range","positional":[1, 99.5, "x", null, true]}"#,
        )
        .expect("parse annotation");
        assert_eq!(
            annotation.positional,
            vec![
                AnnotationValue::Int(1),
                AnnotationValue::Float(99.5),
                AnnotationValue::Text("x".to_string()),
                AnnotationValue::Null,
                AnnotationValue::Bool(true),
            ]
        );
    }
}
