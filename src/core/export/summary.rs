//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting conversion results.

use crate::core::extract::clinical::summarize_failures;
use crate::domain::{FieldExtractionError, RecordCategory};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Number of skipped-observation causes listed per category
const LISTED_CAUSES: usize = 3;

/// Result of exporting one category
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryOutcome {
    /// A CSV file was written
    Exported {
        category: RecordCategory,
        records: usize,
        path: PathBuf,
        skipped: Vec<FieldExtractionError>,
    },

    /// Nothing matched; no file was written
    NoEntries {
        category: RecordCategory,
        skipped: Vec<FieldExtractionError>,
    },
}

impl CategoryOutcome {
    pub fn category(&self) -> RecordCategory {
        match self {
            CategoryOutcome::Exported { category, .. }
            | CategoryOutcome::NoEntries { category, .. } => *category,
        }
    }

    /// Number of rows written
    pub fn records(&self) -> usize {
        match self {
            CategoryOutcome::Exported { records, .. } => *records,
            CategoryOutcome::NoEntries { .. } => 0,
        }
    }

    /// Output file, if one was written
    pub fn path(&self) -> Option<&Path> {
        match self {
            CategoryOutcome::Exported { path, .. } => Some(path),
            CategoryOutcome::NoEntries { .. } => None,
        }
    }

    /// Observations skipped during extraction
    pub fn skipped(&self) -> &[FieldExtractionError] {
        match self {
            CategoryOutcome::Exported { skipped, .. }
            | CategoryOutcome::NoEntries { skipped, .. } => skipped,
        }
    }

    pub fn is_exported(&self) -> bool {
        matches!(self, CategoryOutcome::Exported { .. })
    }

    /// Short aggregate of the skipped observations, `None` when nothing was skipped
    pub fn skipped_summary(&self) -> Option<String> {
        summarize_failures(self.skipped(), LISTED_CAUSES)
    }
}

impl fmt::Display for CategoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryOutcome::Exported {
                category,
                records,
                path,
                ..
            } => write!(
                f,
                "Exported {records} {} entries to {}",
                category.label(),
                path.display()
            ),
            CategoryOutcome::NoEntries { category, .. } => {
                write!(f, "No {} entries found.", category.label())
            }
        }
    }
}

/// A category that could not be exported at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFailure {
    pub category: RecordCategory,
    pub kind: FailureKind,
    pub message: String,
}

/// What stopped a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The input document could not be loaded
    Load,
    /// The output file could not be written
    Write,
    /// Anything else (invalid options, task failure)
    Other,
}

impl fmt::Display for CategoryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} export failed: {}",
            self.category.label(),
            self.message
        )
    }
}

/// Summary of a conversion run
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Per-category results, in the order the categories were requested
    pub outcomes: Vec<CategoryOutcome>,

    /// Categories that failed
    pub failures: Vec<CategoryFailure>,

    /// Duration of the run
    pub duration: Duration,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn add_outcome(&mut self, outcome: CategoryOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn add_failure(&mut self, failure: CategoryFailure) {
        self.failures.push(failure);
    }

    /// Rows written across all categories
    pub fn total_records(&self) -> usize {
        self.outcomes.iter().map(CategoryOutcome::records).sum()
    }

    /// Observations skipped across all categories
    pub fn total_skipped(&self) -> usize {
        self.outcomes.iter().map(|o| o.skipped().len()).sum()
    }

    /// Files written
    pub fn files_written(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_exported()).count()
    }

    /// Check if every category completed (no failures)
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit code for this run
    ///
    /// `3` when an input document could not be loaded, `5` for any other category failure,
    /// `1` when observations were skipped, `0` otherwise. Categories without entries count as
    /// success.
    pub fn exit_code(&self) -> i32 {
        if self.failures.iter().any(|f| f.kind == FailureKind::Load) {
            3
        } else if !self.failures.is_empty() {
            5
        } else if self.total_skipped() > 0 {
            1
        } else {
            0
        }
    }

    /// Human-readable lines, one per category plus skipped-observation notes
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for outcome in &self.outcomes {
            lines.push(outcome.to_string());
            if let Some(skipped) = outcome.skipped_summary() {
                lines.push(format!("  {skipped}"));
            }
        }
        for failure in &self.failures {
            lines.push(failure.to_string());
        }
        lines
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            categories = self.outcomes.len() + self.failures.len(),
            files_written = self.files_written(),
            records = self.total_records(),
            skipped = self.total_skipped(),
            failed = self.failures.len(),
            duration_ms = self.duration.as_millis(),
            "Conversion completed"
        );

        for outcome in &self.outcomes {
            if let Some(skipped) = outcome.skipped_summary() {
                tracing::warn!(category = %outcome.category(), "{skipped}");
            }
        }

        for failure in &self.failures {
            tracing::error!(
                category = %failure.category,
                kind = ?failure.kind,
                message = %failure.message,
                "Category export failed"
            );
        }
    }
}
