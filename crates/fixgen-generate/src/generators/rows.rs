use serde_json::{Map, Value};

use fixgen_core::ClassSpec;

use crate::errors::GenerationError;
use crate::generators::{FixtureVariant, NULL_VALUE, SampleValue, Synthesizer};

/// One synthesized row: raw values in field order plus the JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub index: usize,
    pub values: Vec<SampleValue>,
    pub payload: String,
}

impl SampleRow {
    pub fn identifier(&self) -> &SampleValue {
        self.values.first().unwrap_or(&NULL_VALUE)
    }

    pub fn id_string(&self) -> String {
        self.identifier().to_text()
    }

    /// Payload parsed back into an object, for structural mutation.
    pub fn payload_object(&self) -> Result<Map<String, Value>, GenerationError> {
        match serde_json::from_str(&self.payload)? {
            Value::Object(map) => Ok(map),
            other => Err(GenerationError::Invariant(format!(
                "row {} payload is not an object: {other}",
                self.index
            ))),
        }
    }
}

/// Rows of one class for one fixture variant, in generation order.
#[derive(Debug, Clone)]
pub struct SampleSet {
    pub class_name: String,
    pub variant: FixtureVariant,
    pub rows: Vec<SampleRow>,
}

impl SampleSet {
    /// Reference row for oracles and enumerators.
    pub fn row0(&self) -> Result<&SampleRow, GenerationError> {
        self.rows.first().ok_or_else(|| {
            GenerationError::Invariant(format!(
                "class '{}' has no {:?} rows",
                self.class_name, self.variant
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn generate_rows(
    class: &ClassSpec,
    synth: &Synthesizer<'_>,
    variant: FixtureVariant,
    count: usize,
) -> Result<SampleSet, GenerationError> {
    if count == 0 {
        return Err(GenerationError::Invariant(format!(
            "row count for class '{}' must be positive",
            class.name
        )));
    }
    if class.identifier().is_none() {
        return Err(GenerationError::InvalidSchema(format!(
            "class '{}' has no fields",
            class.name
        )));
    }

    let mut rows = Vec::with_capacity(count);
    for index in 0..count {
        let mut values = Vec::with_capacity(class.fields.len());
        let mut payload = Map::new();
        for (position, field) in class.fields.iter().enumerate() {
            let value = synth.synthesize_in(class, position, index, variant)?;
            payload.insert(field.name.clone(), value.to_json());
            values.push(value);
        }
        rows.push(SampleRow {
            index,
            values,
            payload: serde_json::to_string(&Value::Object(payload))?,
        });
    }

    Ok(SampleSet {
        class_name: class.name.clone(),
        variant,
        rows,
    })
}
