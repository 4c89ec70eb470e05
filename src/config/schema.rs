//! Configuration schema types
//!
//! Every section and every key has a default, so an empty file (or no file at all) describes
//! a complete configuration.

use crate::core::extract::CDA_NAMESPACE;
use crate::domain::{RecordCategory, DEFAULT_CDA_FILE, DEFAULT_EXPORT_FILE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Healthport configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Where the export documents are read from
    #[serde(default)]
    pub input: InputConfig,

    /// Where the CSV files are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Category selection and extraction options
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HealthportConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.input.validate()?;
        self.output.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Input documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding the unpacked export
    #[serde(default = "default_input_path")]
    pub path: PathBuf,

    /// Clinical document file name, relative to `path`
    #[serde(default = "default_cda_file")]
    pub cda_file: String,

    /// Flat export file name, relative to `path`
    #[serde(default = "default_export_file")]
    pub export_file: String,

    /// Namespace URI of the clinical document elements
    #[serde(default = "default_cda_namespace")]
    pub cda_namespace: String,
}

impl InputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("input.path cannot be empty".to_string());
        }
        if self.cda_file.trim().is_empty() {
            return Err("input.cda_file cannot be empty".to_string());
        }
        if self.export_file.trim().is_empty() {
            return Err("input.export_file cannot be empty".to_string());
        }
        if self.cda_namespace.trim().is_empty() {
            return Err("input.cda_namespace cannot be empty".to_string());
        }
        Ok(())
    }

    /// Input document for a category
    pub fn document_for(&self, category: RecordCategory) -> PathBuf {
        if category.uses_cda_document() {
            self.path.join(&self.cda_file)
        } else {
            self.path.join(&self.export_file)
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            cda_file: default_cda_file(),
            export_file: default_export_file(),
            cda_namespace: default_cda_namespace(),
        }
    }
}

/// Output location and file names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base output directory
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Directory below `path` that receives the CSV files
    #[serde(default = "default_output_subdirectory")]
    pub subdirectory: String,

    #[serde(default = "default_cda_output")]
    pub cda_file: String,

    #[serde(default = "default_record_output")]
    pub record_file: String,

    #[serde(default = "default_workout_output")]
    pub workout_file: String,

    #[serde(default = "default_activity_summary_output")]
    pub activity_summary_file: String,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("output.path cannot be empty".to_string());
        }
        let files = [
            ("cda_file", &self.cda_file),
            ("record_file", &self.record_file),
            ("workout_file", &self.workout_file),
            ("activity_summary_file", &self.activity_summary_file),
        ];
        for (index, (key, name)) in files.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(format!("output.{key} cannot be empty"));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(format!(
                    "output.{key} must be a file name, not a path: '{name}'"
                ));
            }
            if let Some((other, _)) = files[..index].iter().find(|(_, earlier)| earlier == name) {
                return Err(format!(
                    "output.{key} and output.{other} both name '{name}'; \
                     each category needs its own file"
                ));
            }
        }
        Ok(())
    }

    /// Directory the CSV files are written to
    pub fn directory(&self) -> PathBuf {
        if self.subdirectory.is_empty() {
            self.path.clone()
        } else {
            self.path.join(&self.subdirectory)
        }
    }

    /// Output file name for a category
    pub fn file_for(&self, category: RecordCategory) -> &str {
        match category {
            RecordCategory::ClinicalObservations => &self.cda_file,
            RecordCategory::Records => &self.record_file,
            RecordCategory::Workouts => &self.workout_file,
            RecordCategory::ActivitySummaries => &self.activity_summary_file,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            subdirectory: default_output_subdirectory(),
            cda_file: default_cda_output(),
            record_file: default_record_output(),
            workout_file: default_workout_output(),
            activity_summary_file: default_activity_summary_output(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Categories exported when the command line selects none
    #[serde(default = "default_categories")]
    pub categories: Vec<RecordCategory>,

    /// Run the categories as parallel blocking tasks
    #[serde(default)]
    pub concurrent: bool,

    /// Add the `measurement` column to clinical observations
    #[serde(default)]
    pub include_measurement: bool,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.categories.is_empty() {
            return Err("export.categories cannot be empty".to_string());
        }
        for (index, category) in self.categories.iter().enumerate() {
            if self.categories[..index].contains(category) {
                return Err(format!("export.categories lists '{category}' more than once"));
            }
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            concurrent: false,
            include_measurement: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err(
                "logging.local_path cannot be empty when local logging is enabled".to_string(),
            );
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_input_path() -> PathBuf {
    PathBuf::from("apple_health_export")
}

fn default_cda_file() -> String {
    DEFAULT_CDA_FILE.to_string()
}

fn default_export_file() -> String {
    DEFAULT_EXPORT_FILE.to_string()
}

fn default_cda_namespace() -> String {
    CDA_NAMESPACE.to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_subdirectory() -> String {
    "parsed".to_string()
}

fn default_cda_output() -> String {
    RecordCategory::ClinicalObservations
        .default_output_file()
        .to_string()
}

fn default_record_output() -> String {
    RecordCategory::Records.default_output_file().to_string()
}

fn default_workout_output() -> String {
    RecordCategory::Workouts.default_output_file().to_string()
}

fn default_activity_summary_output() -> String {
    RecordCategory::ActivitySummaries
        .default_output_file()
        .to_string()
}

fn default_categories() -> Vec<RecordCategory> {
    RecordCategory::ALL.to_vec()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
