//! Schema-driven fixture synthesis for fixgen.
//!
//! This crate consumes a validated schema config and produces, per class,
//! deterministic sample rows and the fixtures derived from them: index and
//! update payloads, invalid-value cases, unknown-property patch cases, search
//! filters with ground-truth results, and a nested search mapping.

pub mod engine;
pub mod errors;
pub mod fixture;
pub mod generators;
pub mod mapping;
pub mod model;
pub mod oracles;
pub mod output;

pub use engine::{ClassFixtures, FixtureEngine, GenerationResult, build_class_fixtures};
pub use errors::GenerationError;
pub use fixture::{Fixture, FixtureKind};
pub use generators::{FieldRole, FixtureVariant, SampleRow, SampleSet, SampleValue, Synthesizer};
pub use mapping::{MappingRenderer, render_mapping};
pub use model::{
    ClassReport, FileReport, GenerateOptions, GenerationIssue, GenerationReport, MAX_LEVELS,
    NUM_OF_TESTS, QUOTE_CHARACTER,
};
pub use oracles::{InvalidCase, PatchCase, SearchCase, SearchKind};
