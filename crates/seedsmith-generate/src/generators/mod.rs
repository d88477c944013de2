//! Per-property value synthesis.

mod semantic;

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_regex::Regex as RandRegex;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use seedsmith_core::{PropertyDescriptor, ScalarKind};

pub use semantic::{ValueKind, classify};

const REGEX_MAX_REPEAT: u32 = 8;

/// Generated value for a property.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Text(String),
    Char(char),
    Guid(Uuid),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Enum { name: String, value: i64 },
}

impl GeneratedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, GeneratedValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GeneratedValue::Int(value) => Some(*value),
            GeneratedValue::Enum { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GeneratedValue::Int(value) => Some(*value as f64),
            GeneratedValue::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Plain text rendering used by CSV and XML.
    pub fn to_text(&self) -> String {
        match self {
            GeneratedValue::Null => String::new(),
            GeneratedValue::Bool(value) => value.to_string(),
            GeneratedValue::Int(value) => value.to_string(),
            GeneratedValue::Decimal(value) => value.to_string(),
            GeneratedValue::Text(value) => value.clone(),
            GeneratedValue::Char(value) => value.to_string(),
            GeneratedValue::Guid(value) => value.hyphenated().to_string(),
            GeneratedValue::Date(value) => value.format("%Y-%m-%d").to_string(),
            GeneratedValue::DateTime(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
            GeneratedValue::Time(value) => value.format("%H:%M:%S").to_string(),
            GeneratedValue::Enum { name, .. } => name.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            GeneratedValue::Null => Value::Null,
            GeneratedValue::Bool(value) => Value::Bool(*value),
            GeneratedValue::Int(value) => Value::from(*value),
            GeneratedValue::Decimal(value) => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            _ => Value::String(self.to_text()),
        }
    }
}

/// Where a foreign-key column takes its values from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignRange {
    pub target: String,
    /// Child records per parent record when `target` is the resolved parent.
    pub per_parent: Option<u64>,
    /// Records generated for `target`.
    pub target_total: u64,
}

impl ForeignRange {
    /// Referenced 1-based index for the child record at `index`.
    pub fn map(&self, index: u64) -> u64 {
        if self.target_total == 0 {
            return index;
        }
        match self.per_parent {
            Some(per_parent) if per_parent > 0 => {
                ((index - 1) / per_parent + 1).min(self.target_total)
            }
            _ => (index - 1) % self.target_total + 1,
        }
    }
}

/// One emitted column and how its values are made.
#[derive(Debug, Clone)]
pub struct ColumnPlan<'a> {
    pub property: &'a PropertyDescriptor,
    pub kind: ValueKind,
    pub scalar: ScalarKind,
    pub foreign: Option<ForeignRange>,
}

impl<'a> ColumnPlan<'a> {
    pub fn new(property: &'a PropertyDescriptor, foreign: Option<ForeignRange>) -> Self {
        Self {
            kind: classify(property, foreign.is_some()),
            scalar: ScalarKind::from_type_name(&property.declared_type_name),
            property,
            foreign,
        }
    }
}

/// Deterministic value source keyed by record index.
pub struct ValueSynthesizer {
    base_date: NaiveDate,
    seed: u64,
    patterns: HashMap<String, Option<RandRegex>>,
}

impl ValueSynthesizer {
    pub fn new(base_date: NaiveDate, seed: u64) -> Self {
        Self {
            base_date,
            seed,
            patterns: HashMap::new(),
        }
    }

    /// Value of `column` for the 1-based record `index` of `entity`.
    pub fn synthesize(&mut self, entity: &str, column: &ColumnPlan<'_>, index: u64) -> GeneratedValue {
        let property = column.property;
        let ordinal = index as i64;
        let value = match &column.kind {
            ValueKind::ForeignKey => {
                let (target, mapped) = match &column.foreign {
                    Some(range) => (range.target.as_str(), range.map(index)),
                    None => (entity, index),
                };
                self.key_value(target, column.scalar, mapped)
            }
            ValueKind::Key => self.key_value(entity, column.scalar, index),
            ValueKind::PersonName => {
                let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(self.seed ^ index, "name"));
                let first: String = FirstName().fake_with_rng(&mut rng);
                let last: String = LastName().fake_with_rng(&mut rng);
                GeneratedValue::Text(format!("{first} {last} {index}"))
            }
            ValueKind::Email => GeneratedValue::Text(format!("user{index}@example.com")),
            ValueKind::Date => self.date_value(column.scalar, index),
            ValueKind::Flag => GeneratedValue::Bool(index % 2 == 1),
            ValueKind::Money => GeneratedValue::Decimal(round2(9.99 + (index as f64) * 10.0)),
            ValueKind::Enum => {
                let members = &property.enum_members;
                if members.is_empty() {
                    GeneratedValue::Int(ordinal)
                } else {
                    let member = &members[((index - 1) % members.len() as u64) as usize];
                    GeneratedValue::Enum {
                        name: member.name.clone(),
                        value: member.value,
                    }
                }
            }
            ValueKind::Guid => GeneratedValue::Guid(deterministic_uuid(entity, index)),
            ValueKind::Integer => GeneratedValue::Int(ordinal),
            ValueKind::Pattern(pattern) => self
                .pattern_value(entity, &property.name, pattern, index)
                .unwrap_or_else(|| fallback_text(property, index)),
            ValueKind::Char => {
                let letter = b'A' + ((index - 1) % 26) as u8;
                GeneratedValue::Char(letter as char)
            }
            ValueKind::Text => fallback_text(property, index),
        };

        constrain(coerce(value, column.scalar), property)
    }

    /// Fixed plan value converted to the property's shape.
    pub fn fixed(&self, column: &ColumnPlan<'_>, value: &Value) -> GeneratedValue {
        let property = column.property;
        let value = match value {
            Value::Null => GeneratedValue::Null,
            Value::Bool(flag) => GeneratedValue::Bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => GeneratedValue::Int(integer),
                None => GeneratedValue::Decimal(number.as_f64().unwrap_or_default()),
            },
            Value::String(text) => {
                if let Some(member) = property
                    .enum_members
                    .iter()
                    .find(|member| member.name.eq_ignore_ascii_case(text))
                {
                    GeneratedValue::Enum {
                        name: member.name.clone(),
                        value: member.value,
                    }
                } else if column.scalar == ScalarKind::Guid {
                    Uuid::parse_str(text)
                        .map(GeneratedValue::Guid)
                        .unwrap_or_else(|_| GeneratedValue::Text(text.clone()))
                } else {
                    GeneratedValue::Text(text.clone())
                }
            }
            other => GeneratedValue::Text(other.to_string()),
        };
        if value.is_null() {
            return value;
        }
        coerce(value, column.scalar)
    }

    fn key_value(&self, entity: &str, scalar: ScalarKind, index: u64) -> GeneratedValue {
        match scalar {
            ScalarKind::Guid => GeneratedValue::Guid(deterministic_uuid(entity, index)),
            ScalarKind::Text => GeneratedValue::Text(index.to_string()),
            _ => GeneratedValue::Int(index as i64),
        }
    }

    fn date_value(&self, scalar: ScalarKind, index: u64) -> GeneratedValue {
        let date = self
            .base_date
            .checked_sub_signed(Duration::days(index as i64))
            .unwrap_or(self.base_date);
        match scalar {
            ScalarKind::Date => GeneratedValue::Date(date),
            ScalarKind::Time => {
                let seconds = ((index * 60) % 86_400) as u32;
                GeneratedValue::Time(
                    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or(NaiveTime::MIN),
                )
            }
            ScalarKind::Text => GeneratedValue::Text(date.format("%Y-%m-%d").to_string()),
            _ => GeneratedValue::DateTime(date.and_time(NaiveTime::MIN)),
        }
    }

    fn pattern_value(
        &mut self,
        entity: &str,
        property: &str,
        pattern: &str,
        index: u64,
    ) -> Option<GeneratedValue> {
        let compiled = self
            .patterns
            .entry(pattern.to_string())
            .or_insert_with(|| match RandRegex::compile(pattern, REGEX_MAX_REPEAT) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    debug!(pattern, error = %err, "pattern not usable for generation");
                    None
                }
            })
            .as_ref()?;
        let key = format!("{entity}.{property}");
        let mut rng = ChaCha8Rng::seed_from_u64(hash_row_seed(hash_seed(self.seed, &key), index));
        let value: String = rng.sample(compiled);
        Some(GeneratedValue::Text(value))
    }
}

fn fallback_text(property: &PropertyDescriptor, index: u64) -> GeneratedValue {
    GeneratedValue::Text(format!("{} {index}", property.name))
}

/// Reshape a synthesized value to the declared scalar kind.
fn coerce(value: GeneratedValue, scalar: ScalarKind) -> GeneratedValue {
    match (scalar, value) {
        (ScalarKind::Integer, GeneratedValue::Decimal(number)) => {
            GeneratedValue::Int(number.trunc() as i64)
        }
        (ScalarKind::Integer, GeneratedValue::Bool(flag)) => GeneratedValue::Int(i64::from(flag)),
        (ScalarKind::Decimal, GeneratedValue::Int(number)) => GeneratedValue::Decimal(number as f64),
        (ScalarKind::Text, value @ GeneratedValue::Text(_)) => value,
        (ScalarKind::Text, value @ GeneratedValue::Null) => value,
        (ScalarKind::Text, value @ GeneratedValue::Enum { .. }) => value,
        (ScalarKind::Text, value) => GeneratedValue::Text(value.to_text()),
        (ScalarKind::Bool, GeneratedValue::Int(number)) => GeneratedValue::Bool(number % 2 != 0),
        (_, value) => value,
    }
}

/// Apply range and length annotations.
fn constrain(value: GeneratedValue, property: &PropertyDescriptor) -> GeneratedValue {
    match value {
        GeneratedValue::Int(number) => {
            let mut number = number;
            if let Some(min) = property.min_value {
                number = number.max(min.ceil() as i64);
            }
            if let Some(max) = property.max_value {
                number = number.min(max.floor() as i64);
            }
            GeneratedValue::Int(number)
        }
        GeneratedValue::Decimal(number) => {
            let mut number = number;
            if let Some(min) = property.min_value {
                number = number.max(min);
            }
            if let Some(max) = property.max_value {
                number = number.min(max);
            }
            GeneratedValue::Decimal(number)
        }
        GeneratedValue::Text(text) => match property.max_length {
            Some(max) if text.chars().count() > max as usize => {
                GeneratedValue::Text(text.chars().take(max as usize).collect())
            }
            _ => GeneratedValue::Text(text),
        },
        other => other,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Stable v4-shaped UUID for `(entity, index)`.
pub fn deterministic_uuid(entity: &str, index: u64) -> Uuid {
    let mut rng = ChaCha8Rng::seed_from_u64(hash_row_seed(hash_seed(0, entity), index));
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

pub(crate) fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn hash_row_seed(seed: u64, index: u64) -> u64 {
    let hash = seed ^ index.wrapping_mul(0x9e3779b97f4a7c15);
    hash.wrapping_mul(0x100000001b3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedsmith_core::EnumMember;

    fn base_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date")
    }

    fn value(property: &PropertyDescriptor, index: u64) -> GeneratedValue {
        let mut synthesizer = ValueSynthesizer::new(base_date(), 7);
        synthesizer.synthesize("Thing", &ColumnPlan::new(property, None), index)
    }

    #[test]
    fn semantic_values_follow_the_index() {
        let email = PropertyDescriptor::new("ContactEmail", "string", "Thing");
        assert_eq!(value(&email, 3), GeneratedValue::Text("user3@example.com".to_string()));

        let created = PropertyDescriptor::new("CreatedDate", "DateTime", "Thing");
        assert_eq!(
            value(&created, 2).to_text(),
            "2024-03-08T00:00:00".to_string()
        );

        let active = PropertyDescriptor::new("IsActive", "bool", "Thing");
        assert_eq!(value(&active, 1), GeneratedValue::Bool(true));
        assert_eq!(value(&active, 2), GeneratedValue::Bool(false));

        let price = PropertyDescriptor::new("Price", "decimal", "Thing");
        assert_eq!(value(&price, 1), GeneratedValue::Decimal(19.99));

        let quantity = PropertyDescriptor::new("Quantity", "int", "Thing");
        assert_eq!(value(&quantity, 4), GeneratedValue::Int(4));

        let notes = PropertyDescriptor::new("Notes", "string", "Thing");
        assert_eq!(value(&notes, 5), GeneratedValue::Text("Notes 5".to_string()));
    }

    #[test]
    fn names_are_deterministic_and_indexed() {
        let name = PropertyDescriptor::new("Name", "string", "Thing");
        let first = value(&name, 1);
        assert_eq!(first, value(&name, 1));
        assert!(first.as_str().is_some_and(|text| text.ends_with(" 1")));
    }

    #[test]
    fn constraints_clamp_and_truncate() {
        let mut short = PropertyDescriptor::new("Notes", "string", "Thing");
        short.max_length = Some(3);
        assert_eq!(value(&short, 12), GeneratedValue::Text("Not".to_string()));

        let mut rating = PropertyDescriptor::new("Rating", "int", "Thing");
        rating.min_value = Some(1.0);
        rating.max_value = Some(5.0);
        assert_eq!(value(&rating, 9), GeneratedValue::Int(5));
    }

    #[test]
    fn enums_cycle_through_members() {
        let mut status = PropertyDescriptor::new("Status", "OrderStatus", "Thing");
        status.is_enum = true;
        status.enum_members = vec![
            EnumMember {
                name: "Pending".to_string(),
                value: 0,
                description: None,
            },
            EnumMember {
                name: "Shipped".to_string(),
                value: 1,
                description: None,
            },
        ];
        assert_eq!(value(&status, 1).to_text(), "Pending");
        assert_eq!(value(&status, 2).to_text(), "Shipped");
        assert_eq!(value(&status, 3).to_text(), "Pending");
    }

    #[test]
    fn patterns_and_guids_are_reproducible() {
        let mut sku = PropertyDescriptor::new("Sku", "string", "Thing");
        sku.regex_pattern = Some("[A-Z]{3}-[0-9]{4}".to_string());
        let sample = value(&sku, 1);
        assert_eq!(sample, value(&sku, 1));
        let text = sample.as_str().expect("text sample");
        assert_eq!(text.len(), 8);
        assert_eq!(text.as_bytes()[3], b'-');

        assert_eq!(deterministic_uuid("Thing", 1), deterministic_uuid("Thing", 1));
        assert_ne!(deterministic_uuid("Thing", 1), deterministic_uuid("Thing", 2));
    }

    #[test]
    fn foreign_ranges_map_blocks_and_wrap() {
        let parent = ForeignRange {
            target: "Customer".to_string(),
            per_parent: Some(3),
            target_total: 10,
        };
        let mapped: Vec<u64> = (1..=7).map(|index| parent.map(index)).collect();
        assert_eq!(mapped, vec![1, 1, 1, 2, 2, 2, 3]);

        let other = ForeignRange {
            target: "Region".to_string(),
            per_parent: None,
            target_total: 2,
        };
        let mapped: Vec<u64> = (1..=5).map(|index| other.map(index)).collect();
        assert_eq!(mapped, vec![1, 2, 1, 2, 1]);
    }
}
