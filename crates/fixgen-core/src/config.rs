//! Loading of the schema config document.
//!
//! The raw document is checked in two passes. Structural problems (not JSON,
//! wrong types, no `classes` array) are fatal. Problems confined to one
//! class definition only skip that class and are reported as warnings.

use std::collections::BTreeMap;
use std::path::Path;

use jsonschema::JSONSchema;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::field::{Constraints, ContainerKind, FieldSpec};
use crate::issues::{IssueSeverity, ValidationIssue, ValidationReport};
use crate::schema::{ClassSpec, SchemaConfig};
use crate::validation::validate_class;

/// Config document as written by users, before per-class validation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawSchemaConfig {
    pub package: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub classes: Vec<RawClass>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RawClass {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub cacheable: bool,
    #[serde(default)]
    pub fields: Option<Vec<RawField>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RawField {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub container: Option<ContainerKind>,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// A validated config plus the warnings collected while loading it.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub config: SchemaConfig,
    pub report: ValidationReport,
}

impl LoadedSchema {
    pub fn skipped_classes(&self) -> usize {
        self.report.warnings.len()
    }
}

/// Emit the JSON Schema describing the config document.
pub fn config_json_schema() -> RootSchema {
    schema_for!(RawSchemaConfig)
}

/// Validate a config document against [`config_json_schema`].
pub fn validate_config_json(config_json: &Value) -> Result<ValidationReport> {
    let schema = serde_json::to_value(config_json_schema())?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| Error::InvalidConfig(err.to_string()))?;

    let mut report = ValidationReport::default();
    if let Err(errors) = compiled.validate(config_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Read and validate a config file.
pub fn load_schema_config(path: &Path) -> Result<LoadedSchema> {
    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    parse_schema_config(&value)
}

/// Validate a parsed config document, skipping classes that fail
/// per-class checks.
pub fn parse_schema_config(config_json: &Value) -> Result<LoadedSchema> {
    let structural = validate_config_json(config_json)?;
    if !structural.is_ok() {
        return Err(Error::InvalidConfig(structural.error_summary()));
    }

    let raw: RawSchemaConfig = serde_json::from_value(config_json.clone())?;
    let mut report = ValidationReport::default();
    let mut directories = BTreeMap::new();
    let mut classes = Vec::with_capacity(raw.classes.len());

    for (index, raw_class) in raw.classes.into_iter().enumerate() {
        let path = format!("/classes/{index}");
        let class = match raw_class.into_class_spec(&path) {
            Ok(class) => class,
            Err(issue) => {
                report.push_warning(skipped(issue));
                continue;
            }
        };

        if let Err(issue) = validate_class(&class, &path) {
            report.push_warning(skipped(issue));
            continue;
        }

        if let Some(first) = directories.get(&class.snake_name()) {
            let issue = if first == &class.name {
                ValidationIssue::warning(
                    "duplicate_class",
                    format!("{path}/name"),
                    format!("duplicate class name '{}'; later definition skipped", class.name),
                )
            } else {
                ValidationIssue::warning(
                    "directory_collision",
                    format!("{path}/name"),
                    format!(
                        "class '{}' writes to the same directory '{}' as '{first}'; later definition skipped",
                        class.name,
                        class.snake_name()
                    ),
                )
                .with_hint("rename one of the classes")
            };
            report.push_warning(issue);
            continue;
        }
        directories.insert(class.snake_name(), class.name.clone());

        classes.push(class);
    }

    Ok(LoadedSchema {
        config: SchemaConfig {
            package: raw.package,
            imports: raw.imports,
            author: raw.author,
            version: raw.version,
            classes,
        },
        report,
    })
}

impl RawClass {
    fn into_class_spec(self, path: &str) -> std::result::Result<ClassSpec, ValidationIssue> {
        let name = required(self.name, path, "name", "class")?;
        let caption = required(self.caption, path, "caption", &format!("class '{name}'"))?;
        let raw_fields = self.fields.ok_or_else(|| {
            missing(path, "fields", &format!("class '{name}'"))
        })?;

        let mut fields = Vec::with_capacity(raw_fields.len());
        for (index, raw_field) in raw_fields.into_iter().enumerate() {
            let field_path = format!("{path}/fields/{index}");
            let owner = format!("field #{index} of class '{name}'");
            let field_name = required(raw_field.name, &field_path, "name", &owner)?;
            let type_name = required(raw_field.type_name, &field_path, "type", &owner)?;
            fields.push(FieldSpec {
                name: field_name,
                type_name,
                container: raw_field.container,
                constraints: raw_field.constraints,
            });
        }

        Ok(ClassSpec {
            name,
            caption,
            path: self.path,
            plural: self.plural,
            cacheable: self.cacheable,
            fields,
        })
    }
}

fn required(
    value: Option<String>,
    path: &str,
    key: &str,
    owner: &str,
) -> std::result::Result<String, ValidationIssue> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(missing(path, key, owner)),
    }
}

fn missing(path: &str, key: &str, owner: &str) -> ValidationIssue {
    ValidationIssue::error(
        "missing_property",
        format!("{path}/{key}"),
        format!("{owner} is missing required property '{key}'"),
    )
}

fn skipped(issue: ValidationIssue) -> ValidationIssue {
    ValidationIssue {
        severity: IssueSeverity::Warning,
        message: format!("class skipped: {}", issue.message),
        ..issue
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn skips_class_without_caption_and_keeps_the_rest() {
        let doc = json!({
            "package": "com.example",
            "classes": [
                {"name": "Broken", "fields": [{"name": "id", "type": "String"}]},
                {"name": "Widget", "caption": "Widget", "fields": [{"name": "id", "type": "String"}]}
            ]
        });

        let loaded = parse_schema_config(&doc).expect("load config");
        assert_eq!(loaded.config.classes.len(), 1);
        assert_eq!(loaded.config.classes[0].name, "Widget");
        assert_eq!(loaded.skipped_classes(), 1);
        assert_eq!(loaded.report.warnings[0].path, "/classes/0/caption");
        assert_eq!(loaded.report.warnings[0].severity, IssueSeverity::Warning);
    }

    #[test]
    fn skips_field_without_type() {
        let doc = json!({
            "package": "com.example",
            "classes": [
                {"name": "Widget", "caption": "Widget", "fields": [{"name": "id"}]}
            ]
        });

        let loaded = parse_schema_config(&doc).expect("load config");
        assert!(loaded.config.classes.is_empty());
        assert_eq!(loaded.report.warnings[0].path, "/classes/0/fields/0/type");
    }

    #[test]
    fn structural_violation_is_fatal() {
        let doc = json!({
            "package": "com.example",
            "classes": [{"name": "Widget", "cacheable": "yes"}]
        });

        let err = parse_schema_config(&doc).expect_err("should fail");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn missing_classes_array_is_fatal() {
        let err = parse_schema_config(&json!({"package": "com.example"})).expect_err("fail");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn duplicate_class_keeps_first_definition() {
        let doc = json!({
            "package": "com.example",
            "classes": [
                {"name": "Widget", "caption": "First", "fields": [{"name": "id", "type": "String"}]},
                {"name": "Widget", "caption": "Second", "fields": [{"name": "id", "type": "String"}]}
            ]
        });

        let loaded = parse_schema_config(&doc).expect("load config");
        assert_eq!(loaded.config.classes.len(), 1);
        assert_eq!(loaded.config.classes[0].caption, "First");
        assert_eq!(loaded.report.warnings[0].code, "duplicate_class");
    }

    #[test]
    fn class_names_sharing_a_directory_keep_first_definition() {
        let doc = json!({
            "package": "com.example",
            "classes": [
                {"name": "orderLine", "caption": "First", "fields": [{"name": "id", "type": "String"}]},
                {"name": "OrderLine", "caption": "Second", "fields": [{"name": "id", "type": "String"}]}
            ]
        });

        let loaded = parse_schema_config(&doc).expect("load config");
        assert_eq!(loaded.config.classes.len(), 1);
        assert_eq!(loaded.config.classes[0].name, "orderLine");
        let warning = &loaded.report.warnings[0];
        assert_eq!(warning.code, "directory_collision");
        assert_eq!(warning.path, "/classes/1/name");
        assert!(warning.message.contains("order_line"));
    }
}
