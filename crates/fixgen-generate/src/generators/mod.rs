use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub mod rows;
pub mod values;

pub use rows::{SampleRow, SampleSet, generate_rows};
pub use values::Synthesizer;

/// Literal synthesized for one field of one sample row.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Instant(DateTime<Utc>),
    List(Vec<SampleValue>),
    /// Nested object for an embedded class, fields in declaration order.
    Object(Vec<(String, SampleValue)>),
}

impl SampleValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SampleValue::Null)
    }

    pub fn to_json(&self) -> Value {
        match self {
            SampleValue::Null => Value::Null,
            SampleValue::Bool(value) => Value::Bool(*value),
            SampleValue::Int(value) => Value::Number((*value).into()),
            SampleValue::Float(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SampleValue::Text(value) => Value::String(value.clone()),
            SampleValue::Instant(value) => Value::String(format_instant(value)),
            SampleValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            SampleValue::Object(fields) => {
                let map: Map<String, Value> = fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect();
                Value::Object(map)
            }
        }
    }

    /// Plain-text rendering used for CSV cells and id lists.
    pub fn to_text(&self) -> String {
        match self {
            SampleValue::Null => String::new(),
            SampleValue::Bool(value) => value.to_string(),
            SampleValue::Int(value) => value.to_string(),
            SampleValue::Float(value) => format!("{value:?}"),
            SampleValue::Text(value) => value.clone(),
            SampleValue::Instant(value) => format_instant(value),
            SampleValue::List(_) | SampleValue::Object(_) => self.to_json().to_string(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SampleValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SampleValue::Int(value) => Some(*value as f64),
            SampleValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SampleValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Elements of a list, or the value itself for scalars.
    pub fn elements(&self) -> &[SampleValue] {
        match self {
            SampleValue::List(items) => items.as_slice(),
            other => std::slice::from_ref(other),
        }
    }

    /// Representative scalar: the first list element, or the value itself.
    pub fn first_element(&self) -> &SampleValue {
        self.elements().first().unwrap_or(&NULL_VALUE)
    }

    /// Filter semantics: equality, or membership for lists.
    pub fn matches(&self, probe: &SampleValue) -> bool {
        self.elements().iter().any(|element| element == probe)
    }

    /// Ordering for numbers and instants; `None` for everything else.
    pub fn compare(&self, other: &SampleValue) -> Option<Ordering> {
        match (self, other) {
            (SampleValue::Instant(left), SampleValue::Instant(right)) => Some(left.cmp(right)),
            (SampleValue::Int(left), SampleValue::Int(right)) => Some(left.cmp(right)),
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }

    /// True when any element lies in `[from, to]`.
    pub fn within(&self, from: &SampleValue, to: &SampleValue) -> bool {
        self.elements().iter().any(|element| {
            matches!(
                element.compare(from),
                Some(Ordering::Greater | Ordering::Equal)
            ) && matches!(element.compare(to), Some(Ordering::Less | Ordering::Equal))
        })
    }
}

pub(crate) static NULL_VALUE: SampleValue = SampleValue::Null;

fn format_instant(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fixture family a row set belongs to.
///
/// Each variant maps to a fixed multiplier so non-identifier values differ
/// between families while identifiers stay put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureVariant {
    Index,
    Update,
    Search,
}

impl FixtureVariant {
    pub const ALL: [FixtureVariant; 3] = [
        FixtureVariant::Index,
        FixtureVariant::Update,
        FixtureVariant::Search,
    ];

    pub fn multiplier(self) -> u64 {
        match self {
            FixtureVariant::Index => 1,
            FixtureVariant::Update => 2,
            FixtureVariant::Search => 3,
        }
    }
}

/// Position-derived role of a field inside its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// First declared field.
    Identifier,
    /// Second declared field, used for term search.
    Display,
    Plain,
}

impl FieldRole {
    pub fn for_position(index: usize) -> Self {
        match index {
            0 => FieldRole::Identifier,
            1 => FieldRole::Display,
            _ => FieldRole::Plain,
        }
    }

    pub fn is_identifier(self) -> bool {
        self == FieldRole::Identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn list_values_match_by_membership() {
        let list = SampleValue::List(vec![
            SampleValue::Text("tags_1".to_string()),
            SampleValue::Text("tags_2".to_string()),
        ]);
        assert!(list.matches(&SampleValue::Text("tags_2".to_string())));
        assert!(!list.matches(&SampleValue::Text("tags_3".to_string())));
        assert_eq!(list.first_element(), &SampleValue::Text("tags_1".to_string()));
    }

    #[test]
    fn within_is_inclusive_and_empty_for_inverted_bounds() {
        let value = SampleValue::Int(500);
        assert!(value.within(&SampleValue::Int(500), &SampleValue::Int(500)));
        assert!(!value.within(&SampleValue::Int(1500), &SampleValue::Int(-500)));
        assert!(SampleValue::Float(2.5).within(&SampleValue::Int(2), &SampleValue::Int(3)));
        assert!(!SampleValue::Text("a".to_string()).within(
            &SampleValue::Text("a".to_string()),
            &SampleValue::Text("z".to_string())
        ));
    }

    #[test]
    fn instants_render_with_millisecond_precision() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
        assert_eq!(
            SampleValue::Instant(instant).to_text(),
            "2024-01-01T12:30:00.000Z"
        );
    }

    #[test]
    fn nested_objects_keep_field_order() {
        let value = SampleValue::Object(vec![
            ("zeta".to_string(), SampleValue::Int(1)),
            ("alpha".to_string(), SampleValue::Bool(true)),
        ]);
        assert_eq!(value.to_text(), r#"{"zeta":1,"alpha":true}"#);
    }

    #[test]
    fn variants_have_distinct_multipliers() {
        let multipliers: Vec<u64> = FixtureVariant::ALL.iter().map(|v| v.multiplier()).collect();
        assert_eq!(multipliers, vec![1, 2, 3]);
    }
}
