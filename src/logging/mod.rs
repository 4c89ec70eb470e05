//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels
//! - Console output
//! - JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use healthport::logging::init_logging;
//! use healthport::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(category = "workouts", "Conversion started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a category export
///
/// # Example
///
/// ```no_run
/// use healthport::log_category_start;
/// use healthport::domain::RecordCategory;
/// use std::path::Path;
///
/// log_category_start!(RecordCategory::Workouts, Path::new("apple_health_export/export.xml"));
/// ```
#[macro_export]
macro_rules! log_category_start {
    ($category:expr, $input:expr) => {
        tracing::info!(
            category = %$category,
            input = %$input.display(),
            "Starting category export"
        );
    };
}

/// Log the completion of a category export
///
/// # Example
///
/// ```no_run
/// use healthport::log_category_complete;
/// use healthport::domain::RecordCategory;
/// use std::path::Path;
/// use std::time::Duration;
///
/// log_category_complete!(
///     RecordCategory::Records,
///     1200,
///     Path::new("parsed/apple_health_record.csv"),
///     Duration::from_millis(850)
/// );
/// ```
#[macro_export]
macro_rules! log_category_complete {
    ($category:expr, $records:expr, $path:expr, $duration:expr) => {
        tracing::info!(
            category = %$category,
            records = $records,
            path = %$path.display(),
            duration_ms = $duration.as_millis(),
            "Category export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use healthport::log_error_with_context;
/// use healthport::domain::HealthportError;
///
/// let error = HealthportError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
