use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fixgen_core::{ReferenceGraphReport, ValidationIssue};

/// Sample rows synthesized per class and variant.
pub const NUM_OF_TESTS: usize = 10;
/// Quote character for CSV fixtures; payload cells embed double quotes.
pub const QUOTE_CHARACTER: char = '\'';
/// Maximum nesting of referenced classes in mappings and sample objects.
pub const MAX_LEVELS: usize = 3;

/// Options for the fixture engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where per-class fixture directories are written.
    pub out_dir: PathBuf,
    pub rows: usize,
    /// Seed for every sampled value.
    pub seed: u64,
    /// Base instant for date fields. Defaults to the run start, truncated
    /// to milliseconds.
    pub anchor: Option<DateTime<Utc>>,
    pub quote: char,
    pub max_levels: usize,
    /// Fail when any class had to be skipped.
    pub strict: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("fixtures"),
            rows: NUM_OF_TESTS,
            seed: 0,
            anchor: None,
            quote: QUOTE_CHARACTER,
            max_levels: MAX_LEVELS,
            strict: false,
        }
    }
}

/// A written fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Path relative to the output directory.
    pub file: String,
    pub records: u64,
    pub bytes: u64,
    pub sha256: String,
}

/// Summary of the fixtures generated for one class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassReport {
    pub class: String,
    pub rows: u64,
    pub invalid_cases: u64,
    pub patch_cases: u64,
    pub search_cases: u64,
    pub files: Vec<FileReport>,
}

/// Structured generation issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl GenerationIssue {
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: "warning".to_string(),
            code: code.into(),
            message: message.into(),
            path: None,
            class: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: "error".to_string(),
            ..Self::warning(code, message)
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl From<&ValidationIssue> for GenerationIssue {
    fn from(issue: &ValidationIssue) -> Self {
        Self {
            path: Some(issue.path.clone()),
            ..Self::warning(issue.code.clone(), issue.message.clone())
        }
    }
}

/// Report for a generation run, written as `generation_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub anchor: String,
    pub rows_per_class: u64,
    pub classes: Vec<ClassReport>,
    pub reference_graph: Option<ReferenceGraphReport>,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<GenerationIssue>,
    pub errors: Vec<GenerationIssue>,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, anchor: String, rows_per_class: u64) -> Self {
        Self {
            run_id,
            seed,
            anchor,
            rows_per_class,
            classes: Vec::new(),
            reference_graph: None,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            bytes_written: 0,
            duration_ms: 0,
        }
    }

    pub fn record_warning(&mut self, issue: GenerationIssue) {
        *self.warnings_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.warnings.push(issue);
    }

    pub fn record_error(&mut self, issue: GenerationIssue) {
        self.errors.push(issue);
    }

    pub fn record_class(&mut self, class: ClassReport) {
        self.bytes_written += class.files.iter().map(|file| file.bytes).sum::<u64>();
        self.classes.push(class);
    }

    pub fn class(&self, name: &str) -> Option<&ClassReport> {
        self.classes.iter().find(|class| class.class == name)
    }
}
