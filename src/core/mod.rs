//! Core conversion logic for Healthport.
//!
//! # Modules
//!
//! - [`document`] - XML loading into a namespace-aware element tree
//! - [`extract`] - record extractors for the clinical and flat schemas
//! - [`time`] - CDA timestamp normalization
//! - [`table`] - CSV output
//! - [`export`] - per-category export operations and the run coordinator
//!
//! # Conversion Workflow
//!
//! For each requested category:
//!
//! 1. **Load**: parse the category's input document (`export_cda.xml` or `export.xml`)
//! 2. **Extract**: build one flat record per matching element
//! 3. **Write**: write the records to `<output>/<subdirectory>/<file>.csv`, or report that the
//!    category had no entries
//! 4. **Report**: summarize exported counts and skipped observations
//!
//! # Example
//!
//! ```rust,no_run
//! use healthport::config::HealthportConfig;
//! use healthport::core::export::Exporter;
//! use healthport::domain::RecordCategory;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let exporter = Exporter::new(HealthportConfig::default());
//! let summary = exporter.run(&RecordCategory::ALL).await?;
//!
//! for line in summary.report_lines() {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod export;
pub mod extract;
pub mod table;
pub mod time;
