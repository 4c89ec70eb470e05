//! Domain models and types for Healthport.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Record model** ([`FlatRecord`]): one exported row, ordered field name to value
//! - **Categories** ([`RecordCategory`]): the four exported record kinds
//! - **Error types** ([`HealthportError`], [`LoadError`], [`WriteError`],
//!   [`FieldExtractionError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, HealthportError>`]:
//!
//! ```rust,no_run
//! use healthport::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = healthport::config::load_config("healthport.toml")?;
//!     Ok(())
//! }
//! ```

pub mod category;
pub mod errors;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use category::{RecordCategory, DEFAULT_CDA_FILE, DEFAULT_EXPORT_FILE};
pub use errors::{FieldExtractionError, HealthportError, LoadError, WriteError};
pub use record::FlatRecord;
pub use result::Result;
