use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use fixgen_core::{ClassSpec, FieldSpec, SIZE_LIMIT};

use crate::errors::GenerationError;
use crate::generators::SampleRow;

/// Upper size bound reported when only `sizeMin` is declared.
pub const JAVA_INT_MAX: u64 = 2_147_483_647;

const PATTERN_SENTINEL: &str = "invalid";
const EMAIL_SENTINEL: &str = "not-an-email";

/// A payload that breaks exactly one constraint of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidCase {
    pub payload: String,
    pub field: String,
    pub message: String,
}

impl InvalidCase {
    /// Validation message as reported by the service (`name must not be blank`).
    pub fn describe(&self) -> String {
        format!("{} {}", self.field, self.message)
    }
}

/// Enumerate invalid payloads for every declared constraint, in field order.
///
/// `row` is the reference row; each case replaces a single key of its payload.
pub fn enumerate_invalid(
    class: &ClassSpec,
    row: &SampleRow,
) -> Result<Vec<InvalidCase>, GenerationError> {
    let mut cases = Vec::new();
    for field in &class.fields {
        for (input, message) in violations(field)? {
            let mut payload = row.payload_object()?;
            payload.insert(field.name.clone(), input);
            cases.push(InvalidCase {
                payload: serde_json::to_string(&Value::Object(payload))?,
                field: field.name.clone(),
                message,
            });
        }
    }
    Ok(cases)
}

fn violations(field: &FieldSpec) -> Result<Vec<(Value, String)>, GenerationError> {
    let c = &field.constraints;
    let mut out = Vec::new();

    if c.not_blank {
        let message = "must not be blank".to_string();
        out.push((Value::Null, message.clone()));
        out.push((Value::String(String::new()), message.clone()));
        out.push((Value::String("   ".to_string()), message));
    } else if c.not_empty {
        let message = "must not be empty".to_string();
        out.push((Value::Null, message.clone()));
        out.push((Value::String(String::new()), message));
    } else if c.not_null {
        out.push((Value::Null, "must not be null".to_string()));
    }

    if c.email {
        out.push((
            Value::String(EMAIL_SENTINEL.to_string()),
            "must be a well-formed email address".to_string(),
        ));
    }

    if let Some(min) = c.min {
        out.push((
            Value::Number(min.saturating_sub(1).into()),
            format!("must be greater than or equal to {min}"),
        ));
    }
    if let Some(max) = c.max {
        out.push((
            Value::Number(max.saturating_add(1).into()),
            format!("must be less than or equal to {max}"),
        ));
    }

    if let Some(min) = c.decimal_min {
        out.push((
            float(field, min - 1.0)?,
            format!("must be greater than or equal to {min}"),
        ));
    }
    if let Some(max) = c.decimal_max {
        out.push((
            float(field, max + 1.0)?,
            format!("must be less than or equal to {max}"),
        ));
    }

    if c.size_min.is_some() || c.size_max.is_some() {
        let low = c.size_min.unwrap_or(0);
        let high = c.size_max.unwrap_or(JAVA_INT_MAX);
        let message = format!("size must be between {low} and {high}");
        if low > SIZE_LIMIT {
            return Err(GenerationError::Invariant(format!(
                "sizeMin {low} for field '{}' exceeds the limit of {SIZE_LIMIT}",
                field.name
            )));
        }
        if low > 1 {
            out.push((Value::String(filler(low - 1)), message.clone()));
        }
        if let Some(max) = c.size_max.filter(|max| *max <= SIZE_LIMIT) {
            out.push((Value::String(filler(max + 1)), message));
        }
    }

    if let Some(pattern) = &c.pattern {
        let anchored = Regex::new(&format!("^(?:{pattern})$")).map_err(|err| {
            GenerationError::InvalidSchema(format!(
                "pattern for field '{}' does not compile: {err}",
                field.name
            ))
        })?;
        if anchored.is_match(PATTERN_SENTINEL) {
            return Err(GenerationError::Invariant(format!(
                "pattern for field '{}' accepts the sentinel '{PATTERN_SENTINEL}'",
                field.name
            )));
        }
        out.push((
            Value::String(PATTERN_SENTINEL.to_string()),
            format!("must match \"{pattern}\""),
        ));
    }

    Ok(out)
}

fn float(field: &FieldSpec, value: f64) -> Result<Value, GenerationError> {
    Number::from_f64(value).map(Value::Number).ok_or_else(|| {
        GenerationError::Invariant(format!(
            "boundary for field '{}' is not a finite number",
            field.name
        ))
    })
}

fn filler(len: u64) -> String {
    "a".repeat(len as usize)
}
