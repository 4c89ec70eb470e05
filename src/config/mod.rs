//! Configuration management for Healthport.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Healthport uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `HEALTHPORT_*` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use healthport::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("healthport.toml")?;
//!
//! println!("Input: {}", config.input.path.display());
//! println!("Output: {}", config.output.directory().display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`InputConfig`] - export directory and document file names
//! - [`OutputConfig`] - output directory and CSV file names
//! - [`ExportConfig`] - categories, concurrency, optional columns
//! - [`LoggingConfig`] - local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [input]
//! path = "${HOME}/apple_health_export"
//!
//! [output]
//! path = "."
//! subdirectory = "parsed"
//!
//! [export]
//! categories = ["clinical_observations", "records", "workouts", "activity_summaries"]
//! concurrent = false
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_default_config, parse_config};
pub use schema::{
    ApplicationConfig, ExportConfig, HealthportConfig, InputConfig, LoggingConfig, OutputConfig,
};
