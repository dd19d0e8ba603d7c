//! Core contracts and helpers for fixgen.
//!
//! This crate defines the schema description consumed by the fixture engine
//! (classes, fields, validation constraints), the field type taxonomy, the
//! class registry used to resolve object references, and config loading with
//! structural and per-class validation.

pub mod config;
pub mod error;
pub mod field;
pub mod graph;
pub mod issues;
pub mod registry;
pub mod schema;
pub mod validation;

pub use config::{
    LoadedSchema, RawClass, RawField, RawSchemaConfig, config_json_schema, load_schema_config,
    parse_schema_config, validate_config_json,
};
pub use error::{Error, Result};
pub use field::{Constraints, ContainerKind, FieldSpec, TypeClass};
pub use graph::{ReferenceGraphReport, ReferenceGraphSummary, build_reference_graph_report};
pub use issues::{IssueSeverity, ValidationIssue, ValidationReport};
pub use registry::ClassRegistry;
pub use schema::{ClassSpec, SchemaConfig};
pub use validation::{SIZE_LIMIT, validate_class};
