// Healthport - Apple Health export to CSV converter
// Copyright (c) 2025 Healthport Contributors
// Licensed under the MIT License

//! # Healthport - Apple Health export to CSV
//!
//! Healthport converts the XML files of an Apple Health export into flat CSV tables for
//! analysis.
//!
//! ## Overview
//!
//! An export contains two documents with different shapes:
//! - **`export_cda.xml`**: an HL7 CDA clinical document with nested
//!   `component/observation` entries
//! - **`export.xml`**: a flat document where every record is a single element with attributes
//!
//! Four record categories are produced, each to its own CSV file:
//! clinical observations, physiological records, workouts and daily activity summaries.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Loading, extraction, timestamp normalization, CSV output, orchestration
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use healthport::core::export::{export_workouts, CategoryOutcome};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = export_workouts(
//!     "apple_health_export/export.xml",
//!     "parsed/apple_health_workout.csv",
//! )?;
//!
//! match &outcome {
//!     CategoryOutcome::Exported { records, .. } => println!("{records} workouts"),
//!     CategoryOutcome::NoEntries { .. } => println!("{outcome}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], built on [`domain::HealthportError`]. A
//! document that cannot be loaded fails its category; a clinical observation whose fields
//! cannot be read is skipped and reported, and extraction continues.
//!
//! ## Logging
//!
//! Healthport uses structured logging with the `tracing` crate. Call
//! [`logging::init_logging`] once at startup to install the console and file layers.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
