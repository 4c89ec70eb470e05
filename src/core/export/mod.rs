//! Category export orchestration
//!
//! This module provides the conversion entry points for Healthport:
//! - One export operation per record category
//! - The [`Exporter`] that runs a selection of categories from configuration
//! - Summary and reporting

pub mod coordinator;
pub mod summary;

pub use coordinator::{
    export_activity_summaries, export_clinical_observations, export_records, export_workouts,
    Exporter,
};
pub use summary::{CategoryFailure, CategoryOutcome, ExportSummary, FailureKind};
