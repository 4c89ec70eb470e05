//! Record extractors
//!
//! - [`clinical`] - `component/observation` entries of the clinical document
//! - [`attribute`] - one routine for every flat attribute record kind
//! - [`navigate`] - optional-element chaining shared by the extractors

pub mod attribute;
pub mod clinical;
pub mod navigate;

pub use attribute::{
    extract_attribute_records, AttributeSpec, ACTIVITY_SUMMARY, PHYSIOLOGICAL_RECORD, WORKOUT,
};
pub use clinical::{
    extract_clinical_observations, summarize_failures, ClinicalExtraction, ClinicalOptions,
    CDA_NAMESPACE, CLINICAL_COLUMNS, MEASUREMENT_COLUMN,
};
pub use navigate::Probe;
