//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Healthport configuration.

use crate::cli::load_settings;
use crate::config::HealthportConfig;
use crate::domain::RecordCategory;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let source = config_path.unwrap_or("<defaults>");
        tracing::info!(config_path = %source, "Validating configuration");

        println!("🔍 Validating configuration: {source}");
        println!();

        // Loading applies overrides and validation
        let config = match load_settings(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        for line in Self::summary_lines(&config) {
            println!("{line}");
        }
        println!();
        Ok(0)
    }

    fn summary_lines(config: &HealthportConfig) -> Vec<String> {
        let mut lines = vec![
            "Configuration Summary:".to_string(),
            format!("  Log Level: {}", config.application.log_level),
            format!("  Input Directory: {}", config.input.path.display()),
            format!("  Output Directory: {}", config.output.directory().display()),
            format!(
                "  Categories: {}",
                config
                    .export
                    .categories
                    .iter()
                    .map(RecordCategory::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            format!("  Concurrent: {}", config.export.concurrent),
            format!("  Measurement Column: {}", config.export.include_measurement),
        ];
        for category in &config.export.categories {
            lines.push(format!(
                "  {}: {} -> {}",
                category.as_str(),
                config.input.document_for(*category).display(),
                config.output.file_for(*category)
            ));
        }
        if config.logging.local_enabled {
            lines.push(format!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            ));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines_for_defaults() {
        let lines = ValidateArgs::summary_lines(&HealthportConfig::default());

        assert_eq!(lines[0], "Configuration Summary:");
        assert!(lines.iter().any(|l| l.contains(
            "Categories: clinical_observations, records, workouts, activity_summaries"
        )));
        assert!(lines
            .iter()
            .any(|l| l.contains("workouts:") && l.ends_with("apple_health_workout.csv")));
        assert!(!lines.iter().any(|l| l.contains("Log Files")));
    }
}
