//! Convert command implementation
//!
//! This module implements the `convert` command, which turns the XML files of an Apple Health
//! export into one CSV file per record category.

use crate::cli::load_settings;
use crate::config::HealthportConfig;
use crate::core::export::Exporter;
use crate::domain::RecordCategory;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the convert command
#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Directory holding export_cda.xml and export.xml
    pub input_path: Option<PathBuf>,

    /// Base output directory; files go to its configured subdirectory
    pub output_path: Option<PathBuf>,

    /// Convert clinical observations from the CDA document
    #[arg(long)]
    pub cda: bool,

    /// Convert Record entries from the flat export
    #[arg(long)]
    pub flat: bool,

    /// Convert Workout entries
    #[arg(long)]
    pub workouts: bool,

    /// Convert ActivitySummary entries
    #[arg(long)]
    pub active_summary: bool,

    /// Convert every category
    #[arg(long, conflicts_with_all = ["cda", "flat", "workouts", "active_summary"])]
    pub all: bool,

    /// Run the categories in parallel
    #[arg(long)]
    pub concurrent: bool,

    /// Add the measurement column to clinical observations
    #[arg(long)]
    pub include_measurement: bool,
}

impl ConvertArgs {
    /// Execute the convert command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!("Starting convert command");

        let mut config = match load_settings(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("{e}");
                return Ok(2); // Configuration error exit code
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let categories = self.selected_categories(&config.export.categories);
        let exporter = Exporter::new(config);

        let summary = match exporter.run(&categories).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(error = %e, "Conversion failed");
                eprintln!("Conversion failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        for line in summary.report_lines() {
            println!("{line}");
        }

        Ok(summary.exit_code())
    }

    /// Applies the positional paths and flags on top of the configuration
    pub fn apply_overrides(&self, config: &mut HealthportConfig) {
        if let Some(input) = &self.input_path {
            tracing::debug!(input = %input.display(), "Overriding input path from CLI");
            config.input.path = input.clone();
        }
        if let Some(output) = &self.output_path {
            tracing::debug!(output = %output.display(), "Overriding output path from CLI");
            config.output.path = output.clone();
        }
        if self.concurrent {
            config.export.concurrent = true;
        }
        if self.include_measurement {
            config.export.include_measurement = true;
        }
    }

    /// Categories chosen by the flags, or `configured` when no flag is set
    pub fn selected_categories(&self, configured: &[RecordCategory]) -> Vec<RecordCategory> {
        if self.all {
            return RecordCategory::ALL.to_vec();
        }

        let flagged: Vec<RecordCategory> = [
            (self.cda, RecordCategory::ClinicalObservations),
            (self.flat, RecordCategory::Records),
            (self.workouts, RecordCategory::Workouts),
            (self.active_summary, RecordCategory::ActivitySummaries),
        ]
        .into_iter()
        .filter_map(|(selected, category)| selected.then_some(category))
        .collect();

        if flagged.is_empty() {
            configured.to_vec()
        } else {
            flagged
        }
    }
}
