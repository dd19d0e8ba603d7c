use std::any::Any;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use fixgen_core::{ClassRegistry, ClassSpec, LoadedSchema, build_reference_graph_report};

use crate::errors::GenerationError;
use crate::fixture::{Fixture, FixtureKind};
use crate::generators::{FixtureVariant, Synthesizer, generate_rows};
use crate::mapping::render_mapping;
use crate::model::{ClassReport, FileReport, GenerateOptions, GenerationIssue, GenerationReport};
use crate::oracles::{build_search_cases, enumerate_invalid, enumerate_patch_invalid};
use crate::output::csv::render_csv;
use crate::output::json::render_json;
use crate::output::write_artifact;

const REPORT_FILE: &str = "generation_report.json";
const MAPPING_FILE: &str = "mapping.json";

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub report: GenerationReport,
}

/// Every fixture of one class, built in memory before anything is written.
#[derive(Debug, Clone)]
pub struct ClassFixtures {
    pub class_name: String,
    /// Directory name under the output root.
    pub dir_name: String,
    pub rows: usize,
    pub fixtures: Vec<Fixture>,
    pub mapping: Value,
}

impl ClassFixtures {
    pub fn fixture(&self, kind: FixtureKind) -> Option<&Fixture> {
        self.fixtures.iter().find(|fixture| fixture.kind == kind)
    }

    fn count(&self, kind: FixtureKind) -> u64 {
        self.fixture(kind).map_or(0, |fixture| fixture.len() as u64)
    }
}

/// Build all fixtures of a class.
///
/// Index rows feed the invalid-value cases, update rows the patch cases,
/// and search rows both the search oracle and the `search-data` seed set.
pub fn build_class_fixtures(
    class: &ClassSpec,
    synth: &Synthesizer<'_>,
    registry: &ClassRegistry,
    options: &GenerateOptions,
) -> Result<ClassFixtures, GenerationError> {
    let index = generate_rows(class, synth, FixtureVariant::Index, options.rows)?;
    let update = generate_rows(class, synth, FixtureVariant::Update, options.rows)?;
    let search_data = generate_rows(class, synth, FixtureVariant::Search, options.rows)?;

    let invalid = enumerate_invalid(class, index.row0()?)?;
    let patch = enumerate_patch_invalid(class, update.row0()?)?;
    let search = build_search_cases(class, &search_data)?;
    let mapping = render_mapping(class, registry, options.max_levels)?;

    Ok(ClassFixtures {
        class_name: class.name.clone(),
        dir_name: class.snake_name(),
        rows: options.rows,
        fixtures: vec![
            Fixture::from_rows(FixtureKind::Index, class, &index),
            Fixture::from_rows(FixtureKind::Update, class, &update),
            Fixture::from_rows(FixtureKind::SearchData, class, &search_data),
            Fixture::from_search(class, &search),
            Fixture::from_invalid(class, &invalid),
            Fixture::from_patch(class, &patch),
        ],
        mapping,
    })
}

/// Entry point for writing the fixtures of a loaded schema.
#[derive(Debug, Clone)]
pub struct FixtureEngine {
    options: GenerateOptions,
}

impl FixtureEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn run(&self, loaded: &LoadedSchema) -> Result<GenerationResult, GenerationError> {
        self.validate_options()?;
        if self.options.strict && loaded.skipped_classes() > 0 {
            return Err(GenerationError::InvalidSchema(format!(
                "strict mode: {} class(es) skipped ({})",
                loaded.skipped_classes(),
                loaded.report.warning_summary()
            )));
        }

        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let anchor = self.anchor();
        let out_dir = self.options.out_dir.clone();
        std::fs::create_dir_all(&out_dir)?;

        let classes = &loaded.config.classes;
        let registry = ClassRegistry::from_config(&loaded.config);
        let synth = Synthesizer::new(&registry, self.options.seed, anchor, self.options.max_levels);

        let mut report = GenerationReport::new(
            run_id.clone(),
            self.options.seed,
            anchor.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.options.rows as u64,
        );

        info!(
            run_id = %run_id,
            classes = classes.len(),
            rows = self.options.rows,
            seed = self.options.seed,
            anchor = %report.anchor,
            "generation started"
        );

        for issue in &loaded.report.warnings {
            let issue = GenerationIssue::from(issue);
            log_issue(&issue);
            report.record_warning(issue);
        }

        let graph = build_reference_graph_report(&registry);
        if let Some(cycle) = &graph.cycle {
            let issue = GenerationIssue::warning(
                "reference_cycle",
                format!("classes reference each other: {}", cycle.join(" -> ")),
            );
            log_issue(&issue);
            report.record_warning(issue);
        }
        report.reference_graph = Some(graph);

        for class in classes {
            let class_start = Instant::now();
            info!(class = %class.name, rows = self.options.rows, "generating class");

            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                build_class_fixtures(class, &synth, &registry, &self.options)
            }));

            let built = match outcome {
                Ok(Ok(built)) => built,
                Ok(Err(err)) => {
                    warn!(class = %class.name, error = %err, "class failed");
                    report.record_error(
                        GenerationIssue::error("class_failed", err.to_string()).with_class(&class.name),
                    );
                    continue;
                }
                Err(panic) => {
                    let message = panic_message(panic);
                    warn!(class = %class.name, error = %message, "class panicked");
                    report.record_error(
                        GenerationIssue::error("class_panicked", message).with_class(&class.name),
                    );
                    continue;
                }
            };

            let class_report = self.write_class(&out_dir, &built)?;
            info!(
                class = %class.name,
                files = class_report.files.len(),
                invalid_cases = class_report.invalid_cases,
                search_cases = class_report.search_cases,
                duration_ms = class_start.elapsed().as_millis() as u64,
                "class generated"
            );
            report.record_class(class_report);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        write_artifact(&out_dir, REPORT_FILE, &render_json(&report)?, 1)?;

        if report.errors.is_empty() {
            info!(
                run_id = %run_id,
                classes = report.classes.len(),
                warnings = report.warnings.len(),
                bytes_written = report.bytes_written,
                duration_ms = report.duration_ms,
                "generation completed"
            );
            Ok(GenerationResult { out_dir, report })
        } else {
            warn!(
                run_id = %run_id,
                failed = report.errors.len(),
                "generation finished with failed classes"
            );
            Err(GenerationError::Failed(report))
        }
    }

    fn validate_options(&self) -> Result<(), GenerationError> {
        if self.options.rows == 0 {
            return Err(GenerationError::InvalidOptions(
                "rows per class must be at least 1".to_string(),
            ));
        }
        if !self.options.quote.is_ascii() {
            return Err(GenerationError::InvalidOptions(format!(
                "quote character '{}' is not ASCII",
                self.options.quote
            )));
        }
        Ok(())
    }

    fn anchor(&self) -> DateTime<Utc> {
        self.options.anchor.unwrap_or_else(|| {
            let now = Utc::now();
            DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
        })
    }

    fn write_class(
        &self,
        out_dir: &Path,
        built: &ClassFixtures,
    ) -> Result<ClassReport, GenerationError> {
        let mut files: Vec<FileReport> = Vec::new();
        for fixture in &built.fixtures {
            let stem = fixture.kind.file_stem();
            let records = fixture.len() as u64;

            let csv = render_csv(fixture, self.options.quote)?;
            files.push(write_artifact(
                out_dir,
                &format!("{}/{stem}.csv", built.dir_name),
                &csv,
                records,
            )?);

            if fixture.kind.writes_json() {
                let json = render_json(&fixture.to_json())?;
                files.push(write_artifact(
                    out_dir,
                    &format!("{}/{stem}.json", built.dir_name),
                    &json,
                    records,
                )?);
            }
            debug!(class = %built.class_name, fixture = stem, records, "fixture written");
        }

        let mapping = render_json(&built.mapping)?;
        files.push(write_artifact(
            out_dir,
            &format!("{}/{MAPPING_FILE}", built.dir_name),
            &mapping,
            1,
        )?);

        Ok(ClassReport {
            class: built.class_name.clone(),
            rows: built.rows as u64,
            invalid_cases: built.count(FixtureKind::Invalid),
            patch_cases: built.count(FixtureKind::InvalidPatch),
            search_cases: built.count(FixtureKind::Search),
            files,
        })
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during generation".to_string()
    }
}

fn log_issue(issue: &GenerationIssue) {
    warn!(
        code = %issue.code,
        path = issue.path.as_deref().unwrap_or(""),
        class = issue.class.as_deref().unwrap_or(""),
        message = %issue.message
    );
}
