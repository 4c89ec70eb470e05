//! Export coordinator
//!
//! One operation per record category: load the input document, extract the records, and write
//! them to a CSV file. A category with no records writes nothing and reports
//! [`CategoryOutcome::NoEntries`]. The [`Exporter`] runs a selection of categories against a
//! configuration, one after another or as parallel blocking tasks.

use crate::config::HealthportConfig;
use crate::core::document::load_document;
use crate::core::export::summary::{CategoryFailure, CategoryOutcome, ExportSummary, FailureKind};
use crate::core::extract::{
    extract_attribute_records, extract_clinical_observations, AttributeSpec, ClinicalOptions,
    ACTIVITY_SUMMARY, PHYSIOLOGICAL_RECORD, WORKOUT,
};
use crate::core::table::OutputTable;
use crate::domain::{FieldExtractionError, FlatRecord, HealthportError, RecordCategory, Result};
use crate::{log_category_complete, log_category_start, log_error_with_context};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Exports the clinical observations of the CDA document at `input` to `output`
///
/// Observations whose fields cannot be computed are skipped and reported in the outcome.
///
/// # Errors
///
/// Returns a load error if the document cannot be read or parsed, and a write error if the
/// CSV file cannot be written.
pub fn export_clinical_observations(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ClinicalOptions,
) -> Result<CategoryOutcome> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let category = RecordCategory::ClinicalObservations;
    let started = Instant::now();
    log_category_start!(category, input);

    let document = load_document(input)?;
    let extraction = extract_clinical_observations(&document, options)?;

    finish(
        category,
        extraction.records,
        extraction.failures,
        output,
        started,
    )
}

/// Exports `<Record>` elements of the flat export at `input` to `output`
pub fn export_records(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<CategoryOutcome> {
    export_attributes(
        RecordCategory::Records,
        &PHYSIOLOGICAL_RECORD,
        input.as_ref(),
        output.as_ref(),
    )
}

/// Exports `<Workout>` elements of the flat export at `input` to `output`
pub fn export_workouts(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<CategoryOutcome> {
    export_attributes(
        RecordCategory::Workouts,
        &WORKOUT,
        input.as_ref(),
        output.as_ref(),
    )
}

/// Exports `<ActivitySummary>` elements of the flat export at `input` to `output`
pub fn export_activity_summaries(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<CategoryOutcome> {
    export_attributes(
        RecordCategory::ActivitySummaries,
        &ACTIVITY_SUMMARY,
        input.as_ref(),
        output.as_ref(),
    )
}

fn export_attributes(
    category: RecordCategory,
    spec: &AttributeSpec,
    input: &Path,
    output: &Path,
) -> Result<CategoryOutcome> {
    let started = Instant::now();
    log_category_start!(category, input);

    let document = load_document(input)?;
    let records = extract_attribute_records(&document, spec);

    finish(category, records, Vec::new(), output, started)
}

/// Writes the records, or reports that there were none
fn finish(
    category: RecordCategory,
    records: Vec<FlatRecord>,
    skipped: Vec<FieldExtractionError>,
    output: &Path,
    started: Instant,
) -> Result<CategoryOutcome> {
    if records.is_empty() {
        let outcome = CategoryOutcome::NoEntries { category, skipped };
        tracing::info!(category = %category, "{outcome}");
        return Ok(outcome);
    }

    let written = OutputTable::new(records)?.write(output)?;
    log_category_complete!(category, written, output, started.elapsed());

    Ok(CategoryOutcome::Exported {
        category,
        records: written,
        path: output.to_path_buf(),
        skipped,
    })
}

/// Runs category exports against a configuration
pub struct Exporter {
    config: Arc<HealthportConfig>,
}

impl Exporter {
    /// Create a new exporter
    pub fn new(config: HealthportConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Directory that receives the CSV files
    pub fn output_directory(&self) -> PathBuf {
        self.config.output.directory()
    }

    /// Exports one category using the configured paths
    ///
    /// The output directory must already exist.
    pub fn export_category(&self, category: RecordCategory) -> Result<CategoryOutcome> {
        export_configured(&self.config, category)
    }

    /// Exports each category once, in the given order, and summarizes the run
    ///
    /// A category that fails is recorded in the summary; the remaining categories still run.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration does not validate (for example two
    /// categories sharing one output file), and an I/O error if the output directory cannot be
    /// created. Nothing is written in either case.
    pub async fn run(&self, categories: &[RecordCategory]) -> Result<ExportSummary> {
        let started = Instant::now();
        let categories = unique(categories);

        self.config.validate().map_err(|e| {
            HealthportError::Configuration(format!("Configuration validation failed: {e}"))
        })?;

        let directory = self.output_directory();
        fs::create_dir_all(&directory).map_err(|e| {
            HealthportError::Io(format!(
                "Failed to create output directory {}: {e}",
                directory.display()
            ))
        })?;

        tracing::info!(
            categories = ?categories.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            input = %self.config.input.path.display(),
            output = %directory.display(),
            concurrent = self.config.export.concurrent,
            "Starting conversion"
        );

        let results = if self.config.export.concurrent {
            self.run_concurrent(&categories).await
        } else {
            categories
                .iter()
                .map(|category| (*category, self.export_category(*category)))
                .collect()
        };

        let mut summary = ExportSummary::new();
        for (category, result) in results {
            match result {
                Ok(outcome) => summary.add_outcome(outcome),
                Err(error) => {
                    log_error_with_context!(&error, category.as_str());
                    summary.add_failure(failure(category, &error));
                }
            }
        }

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn run_concurrent(
        &self,
        categories: &[RecordCategory],
    ) -> Vec<(RecordCategory, Result<CategoryOutcome>)> {
        let handles: Vec<_> = categories
            .iter()
            .map(|category| {
                let category = *category;
                let config = Arc::clone(&self.config);
                let handle =
                    tokio::task::spawn_blocking(move || export_configured(&config, category));
                (category, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (category, handle) in handles {
            let result = handle.await.unwrap_or_else(|e| {
                Err(HealthportError::Other(format!(
                    "{} export task failed: {e}",
                    category.label()
                )))
            });
            results.push((category, result));
        }
        results
    }
}

fn export_configured(
    config: &HealthportConfig,
    category: RecordCategory,
) -> Result<CategoryOutcome> {
    let input = config.input.document_for(category);
    let output = config
        .output
        .directory()
        .join(config.output.file_for(category));

    match category {
        RecordCategory::ClinicalObservations => {
            let options = ClinicalOptions {
                namespace: config.input.cda_namespace.clone(),
                include_measurement: config.export.include_measurement,
            };
            export_clinical_observations(input, output, &options)
        }
        RecordCategory::Records => export_records(input, output),
        RecordCategory::Workouts => export_workouts(input, output),
        RecordCategory::ActivitySummaries => export_activity_summaries(input, output),
    }
}

fn failure(category: RecordCategory, error: &HealthportError) -> CategoryFailure {
    let (kind, message) = match error {
        HealthportError::Load(inner) => (FailureKind::Load, inner.to_string()),
        HealthportError::Write(inner) => (FailureKind::Write, inner.to_string()),
        other => (FailureKind::Other, other.to_string()),
    };
    CategoryFailure {
        category,
        kind,
        message,
    }
}

fn unique(categories: &[RecordCategory]) -> Vec<RecordCategory> {
    let mut seen = Vec::with_capacity(categories.len());
    for category in categories {
        if !seen.contains(category) {
            seen.push(*category);
        }
    }
    seen
}
