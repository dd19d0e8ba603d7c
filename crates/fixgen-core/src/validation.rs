use std::collections::BTreeSet;

use regex::Regex;

use crate::issues::ValidationIssue;
use crate::schema::ClassSpec;

/// Largest string length a size bound may ask the generator to build.
pub const SIZE_LIMIT: u64 = 100_000;

/// Validate one class description.
///
/// This checks:
/// - at least one field (the identifier) is declared
/// - field names are unique
/// - the `identifier` flag only appears on the first field
/// - numeric, decimal and size bounds are not inverted
/// - `sizeMin` stays within [`SIZE_LIMIT`]
/// - `pattern` compiles as an anchored regular expression
///
/// The first problem found is returned as an error issue located under
/// `path`; callers skip the class and keep going.
pub fn validate_class(class: &ClassSpec, path: &str) -> Result<(), ValidationIssue> {
    if class.fields.is_empty() {
        return Err(ValidationIssue::error(
            "empty_fields",
            format!("{path}/fields"),
            format!("class '{}' declares no fields", class.name),
        )
        .with_hint("the first field is used as the identifier"));
    }

    let mut names = BTreeSet::new();
    for (index, field) in class.fields.iter().enumerate() {
        let field_path = format!("{path}/fields/{index}");
        if !names.insert(field.name.as_str()) {
            return Err(ValidationIssue::error(
                "duplicate_field",
                field_path,
                format!("duplicate field name: {}.{}", class.name, field.name),
            ));
        }

        let c = &field.constraints;
        if c.identifier && index > 0 {
            return Err(ValidationIssue::error(
                "identifier_not_first",
                format!("{field_path}/identifier"),
                format!(
                    "field '{}.{}' is flagged as identifier but is not declared first",
                    class.name, field.name
                ),
            )
            .with_hint("move the identifier field to the top of the field list"));
        }

        if let (Some(min), Some(max)) = (c.min, c.max) {
            if min > max {
                return Err(inverted(&field_path, &class.name, &field.name, "min", "max"));
            }
        }
        if let (Some(min), Some(max)) = (c.decimal_min, c.decimal_max) {
            if min > max {
                return Err(inverted(
                    &field_path,
                    &class.name,
                    &field.name,
                    "decimalMin",
                    "decimalMax",
                ));
            }
        }
        if let (Some(min), Some(max)) = (c.size_min, c.size_max) {
            if min > max {
                return Err(inverted(&field_path, &class.name, &field.name, "sizeMin", "sizeMax"));
            }
        }

        if let Some(min) = c.size_min.filter(|min| *min > SIZE_LIMIT) {
            return Err(ValidationIssue::error(
                "size_out_of_range",
                format!("{field_path}/sizeMin"),
                format!(
                    "sizeMin {min} for '{}.{}' exceeds the limit of {SIZE_LIMIT}",
                    class.name, field.name
                ),
            ));
        }

        if let Some(pattern) = &c.pattern {
            if let Err(err) = Regex::new(&format!("^(?:{pattern})$")) {
                return Err(ValidationIssue::error(
                    "invalid_pattern",
                    format!("{field_path}/pattern"),
                    format!("pattern for '{}.{}' does not compile: {err}", class.name, field.name),
                ));
            }
        }
    }

    Ok(())
}

fn inverted(path: &str, class: &str, field: &str, lower: &str, upper: &str) -> ValidationIssue {
    ValidationIssue::error(
        "inverted_bounds",
        format!("{path}/{lower}"),
        format!("{lower} must be <= {upper} for '{class}.{field}'"),
    )
}
