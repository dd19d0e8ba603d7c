use chrono::{DateTime, Duration, Utc};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_regex::Regex as RandRegex;
use regex::Regex;

use fixgen_core::{ClassRegistry, ClassSpec, FieldSpec, SIZE_LIMIT, TypeClass};

use crate::errors::GenerationError;
use crate::generators::{FieldRole, FixtureVariant, SampleValue};

const EMAIL_DOMAIN: &str = "@test.com";
const PATTERN_MAX_REPEAT: u32 = 8;
const ONE_SIDED_SPREAD: u64 = 1000;

/// Deterministic value synthesis.
///
/// Every value is a pure function of `(field, role, row, variant)` plus the
/// run's seed and anchor instant. Identifiers are synthesized with the
/// `Index` multiplier whatever the variant, so the same row index addresses
/// the same entity in every fixture family.
#[derive(Debug, Clone)]
pub struct Synthesizer<'a> {
    registry: &'a ClassRegistry,
    seed: u64,
    anchor: DateTime<Utc>,
    max_levels: usize,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        registry: &'a ClassRegistry,
        seed: u64,
        anchor: DateTime<Utc>,
        max_levels: usize,
    ) -> Self {
        Self {
            registry,
            seed,
            anchor,
            max_levels,
        }
    }

    /// Synthesize a value for a field outside of any owning class.
    pub fn synthesize(
        &self,
        field: &FieldSpec,
        role: FieldRole,
        row_index: usize,
        variant: FixtureVariant,
    ) -> Result<SampleValue, GenerationError> {
        let mut path = Vec::new();
        self.value(field, role, row_index, variant, &mut path)
    }

    /// Synthesize the value of `class.fields[field_index]`; the owning class
    /// counts as visited when expanding nested references.
    pub fn synthesize_in(
        &self,
        class: &ClassSpec,
        field_index: usize,
        row_index: usize,
        variant: FixtureVariant,
    ) -> Result<SampleValue, GenerationError> {
        let field = class.fields.get(field_index).ok_or_else(|| {
            GenerationError::Invariant(format!(
                "class '{}' has no field #{field_index}",
                class.name
            ))
        })?;
        let mut path = vec![class.name.clone()];
        self.value(
            field,
            FieldRole::for_position(field_index),
            row_index,
            variant,
            &mut path,
        )
    }

    fn value(
        &self,
        field: &FieldSpec,
        role: FieldRole,
        row: usize,
        variant: FixtureVariant,
        path: &mut Vec<String>,
    ) -> Result<SampleValue, GenerationError> {
        let multiplier = if role.is_identifier() {
            FixtureVariant::Index.multiplier()
        } else {
            variant.multiplier()
        };

        let scalar = match field.type_class() {
            TypeClass::Bool => SampleValue::Bool(self.bool_value(field, row)),
            TypeClass::Date => SampleValue::Instant(self.date_value(field, row, multiplier)),
            TypeClass::Integer | TypeClass::Decimal => {
                self.number_value(field, role, row, multiplier)?
            }
            TypeClass::Text => self.text_value(field, row, multiplier)?,
            TypeClass::Reference => match self.registry.resolve(field) {
                Some(class) => self.nested_value(class, row, variant, path)?,
                None => self.text_value(field, row, multiplier)?,
            },
        };

        if field.is_container() && !scalar.is_null() {
            Ok(SampleValue::List(vec![scalar]))
        } else {
            Ok(scalar)
        }
    }

    /// Seeded coin flip keyed by field name and row only, so every variant
    /// sees the same boolean for a given row.
    fn bool_value(&self, field: &FieldSpec, row: usize) -> bool {
        let key = format!("{}#{row}", field.name);
        let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(self.seed, &key));
        rng.random_bool(0.5)
    }

    fn date_value(&self, field: &FieldSpec, row: usize, multiplier: u64) -> DateTime<Utc> {
        let sample = self.sample(field, row, multiplier);
        let hours = (sample % 24) as i64;
        let minutes = ((row as u64 + 1) * multiplier % 60) as i64;
        self.anchor + Duration::hours(hours) + Duration::minutes(minutes)
    }

    fn number_value(
        &self,
        field: &FieldSpec,
        role: FieldRole,
        row: usize,
        multiplier: u64,
    ) -> Result<SampleValue, GenerationError> {
        let c = &field.constraints;
        // Identifiers walk the row index so they stay unique across rows.
        let sample = if role.is_identifier() {
            row as u64
        } else {
            self.sample(field, row, multiplier)
        };

        if let (Some(min), Some(max)) = (c.min, c.max) {
            let span = max.saturating_sub(min);
            let value = if span <= 0 {
                min
            } else {
                min.saturating_add((sample % span as u64) as i64 + 1)
            };
            return Ok(numeric(field, value as f64));
        }

        if let (Some(min), Some(max)) = (c.decimal_min, c.decimal_max) {
            let value = min + (max - min) * (sample % 100) as f64 / 100.0;
            if !field.is_integer() {
                return Ok(SampleValue::Float(value));
            }
            let (low, high) = (min.ceil(), max.floor());
            if low > high {
                return Err(GenerationError::Invariant(format!(
                    "no integer fits decimalMin {min} and decimalMax {max} on field '{}'",
                    field.name
                )));
            }
            return Ok(SampleValue::Int(value.ceil().clamp(low, high) as i64));
        }

        let spread = (sample % ONE_SIDED_SPREAD) as f64;
        let value = match (c.min, c.max, c.decimal_min, c.decimal_max) {
            (Some(min), None, _, _) => numeric(field, min as f64 + spread),
            (None, Some(max), _, _) => numeric(field, max as f64 - spread),
            (None, None, Some(min), None) => numeric(field, min + spread),
            // Round down so integers stay under a fractional upper bound.
            (None, None, None, Some(max)) if field.is_integer() => {
                SampleValue::Int((max - spread).floor() as i64)
            }
            (None, None, None, Some(max)) => SampleValue::Float(max - spread),
            _ if role.is_identifier() => numeric(field, (row + 1) as f64),
            _ if field.is_integer() => {
                SampleValue::Int((sample % integer_modulus(&field.type_name)) as i64)
            }
            _ => SampleValue::Float((sample % 10_000_000) as f64 / 100.0),
        };
        Ok(value)
    }

    fn text_value(
        &self,
        field: &FieldSpec,
        row: usize,
        multiplier: u64,
    ) -> Result<SampleValue, GenerationError> {
        let c = &field.constraints;
        let suffix = (row as u64 + 1) * multiplier;
        let mut value = format!("{}_{suffix}", field.name);
        if c.email {
            value.push_str(EMAIL_DOMAIN);
        }

        let min = c.size_min.unwrap_or(0);
        if min > SIZE_LIMIT {
            return Err(GenerationError::Invariant(format!(
                "sizeMin {min} for field '{}' exceeds the limit of {SIZE_LIMIT}",
                field.name
            )));
        }

        if let Some(pattern) = &c.pattern {
            let anchored = Regex::new(&format!("^(?:{pattern})$")).map_err(|err| {
                GenerationError::InvalidSchema(format!(
                    "pattern for field '{}' does not compile: {err}",
                    field.name
                ))
            })?;
            if !anchored.is_match(&value) || (value.chars().count() as u64) < min {
                value = self.pattern_value(field, pattern, row, multiplier)?;
            }
        } else {
            let missing = (min as usize).saturating_sub(value.chars().count());
            value.extend(std::iter::repeat_n('x', missing));
        }

        let len = value.chars().count() as u64;
        if len < min {
            return Err(GenerationError::Invariant(format!(
                "sample value '{value}' for field '{}' is shorter than sizeMin {min}",
                field.name
            )));
        }
        if let Some(max) = c.size_max {
            if len > max {
                return Err(GenerationError::Invariant(format!(
                    "sample value '{value}' for field '{}' exceeds sizeMax {max}",
                    field.name
                )));
            }
        }

        Ok(SampleValue::Text(value))
    }

    fn pattern_value(
        &self,
        field: &FieldSpec,
        pattern: &str,
        row: usize,
        multiplier: u64,
    ) -> Result<String, GenerationError> {
        let regex = RandRegex::compile(pattern, PATTERN_MAX_REPEAT).map_err(|err| {
            GenerationError::InvalidSchema(format!(
                "pattern for field '{}' cannot drive generation: {err}",
                field.name
            ))
        })?;
        let mut rng = self.rng(field, row, multiplier);
        Ok(rng.sample(&regex))
    }

    fn nested_value(
        &self,
        class: &ClassSpec,
        row: usize,
        variant: FixtureVariant,
        path: &mut Vec<String>,
    ) -> Result<SampleValue, GenerationError> {
        if path.len() > self.max_levels || path.iter().any(|name| name == &class.name) {
            return Ok(SampleValue::Null);
        }

        path.push(class.name.clone());
        let mut fields = Vec::with_capacity(class.fields.len());
        for (index, field) in class.fields.iter().enumerate() {
            let value = self.value(field, FieldRole::for_position(index), row, variant, path)?;
            if !value.is_null() {
                fields.push((field.name.clone(), value));
            }
        }
        path.pop();

        Ok(SampleValue::Object(fields))
    }

    fn sample(&self, field: &FieldSpec, row: usize, multiplier: u64) -> u64 {
        self.rng(field, row, multiplier).next_u64()
    }

    fn rng(&self, field: &FieldSpec, row: usize, multiplier: u64) -> ChaCha8Rng {
        let key = format!("{}#{row}#{multiplier}", field.name);
        ChaCha8Rng::seed_from_u64(hash_seed(self.seed, &key))
    }
}

fn numeric(field: &FieldSpec, value: f64) -> SampleValue {
    if field.is_integer() {
        SampleValue::Int(value.ceil() as i64)
    } else {
        SampleValue::Float(value)
    }
}

/// Keeps unconstrained integers inside the declared Java type.
fn integer_modulus(type_name: &str) -> u64 {
    match type_name {
        "byte" | "Byte" => 100,
        "short" | "Short" => 10_000,
        _ => 1_000_000_000,
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
