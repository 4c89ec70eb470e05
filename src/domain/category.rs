//! Record categories
//!
//! Each category is exported to its own CSV file. The clinical category reads the nested CDA
//! document; the other three read the flat attribute-record export.

use super::errors::HealthportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A record category exported to one CSV file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordCategory {
    /// Nested `component/observation` entries from the CDA document
    #[serde(alias = "cda")]
    ClinicalObservations,
    /// `Record` elements from the flat export
    #[serde(alias = "flat", alias = "record")]
    Records,
    /// `Workout` elements from the flat export
    #[serde(alias = "workout")]
    Workouts,
    /// `ActivitySummary` elements from the flat export
    #[serde(alias = "active_summary", alias = "activity_summary")]
    ActivitySummaries,
}

impl RecordCategory {
    /// All categories in export order
    pub const ALL: [RecordCategory; 4] = [
        RecordCategory::ClinicalObservations,
        RecordCategory::Records,
        RecordCategory::Workouts,
        RecordCategory::ActivitySummaries,
    ];

    /// Configuration/CLI name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordCategory::ClinicalObservations => "clinical_observations",
            RecordCategory::Records => "records",
            RecordCategory::Workouts => "workouts",
            RecordCategory::ActivitySummaries => "activity_summaries",
        }
    }

    /// Human-readable label used in "exported" and "no entries" messages
    pub fn label(&self) -> &'static str {
        match self {
            RecordCategory::ClinicalObservations => "CDA observation",
            RecordCategory::Records => "Record",
            RecordCategory::Workouts => "Workout",
            RecordCategory::ActivitySummaries => "ActivitySummary",
        }
    }

    /// Whether the category is read from the CDA document rather than the flat export
    pub fn uses_cda_document(&self) -> bool {
        matches!(self, RecordCategory::ClinicalObservations)
    }

    /// Default output file name
    pub fn default_output_file(&self) -> &'static str {
        match self {
            RecordCategory::ClinicalObservations => "apple_health_parsed_cda.csv",
            RecordCategory::Records => "apple_health_record.csv",
            RecordCategory::Workouts => "apple_health_workout.csv",
            RecordCategory::ActivitySummaries => "apple_health_active_summary.csv",
        }
    }

    /// Default input file name, relative to the input directory
    pub fn default_input_file(&self) -> &'static str {
        if self.uses_cda_document() {
            DEFAULT_CDA_FILE
        } else {
            DEFAULT_EXPORT_FILE
        }
    }
}

/// Default file name of the CDA document inside an export directory
pub const DEFAULT_CDA_FILE: &str = "export_cda.xml";

/// Default file name of the flat export inside an export directory
pub const DEFAULT_EXPORT_FILE: &str = "export.xml";

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordCategory {
    type Err = HealthportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "clinical_observations" | "cda" => Ok(Self::ClinicalObservations),
            "records" | "record" | "flat" => Ok(Self::Records),
            "workouts" | "workout" => Ok(Self::Workouts),
            "activity_summaries" | "activity_summary" | "active_summary" => {
                Ok(Self::ActivitySummaries)
            }
            _ => Err(HealthportError::Configuration(format!(
                "Invalid record category: {s}. Expected one of: clinical_observations, records, workouts, activity_summaries"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("cda", RecordCategory::ClinicalObservations ; "cda alias")]
    #[test_case("clinical_observations", RecordCategory::ClinicalObservations ; "clinical")]
    #[test_case("flat", RecordCategory::Records ; "flat alias")]
    #[test_case("Records", RecordCategory::Records ; "mixed case")]
    #[test_case("workouts", RecordCategory::Workouts ; "workouts")]
    #[test_case("active-summary", RecordCategory::ActivitySummaries ; "cli flag spelling")]
    fn test_category_from_str(input: &str, expected: RecordCategory) {
        assert_eq!(RecordCategory::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_category_from_str_invalid() {
        let err = RecordCategory::from_str("vitals").unwrap_err();
        assert!(err.to_string().contains("Invalid record category"));
    }

    #[test]
    fn test_category_round_trips_through_display() {
        for category in RecordCategory::ALL {
            assert_eq!(
                RecordCategory::from_str(&category.to_string()).unwrap(),
                category
            );
        }
    }

    #[test]
    fn test_default_files() {
        assert_eq!(
            RecordCategory::ClinicalObservations.default_input_file(),
            "export_cda.xml"
        );
        assert_eq!(RecordCategory::Workouts.default_input_file(), "export.xml");
        assert_eq!(
            RecordCategory::Records.default_output_file(),
            "apple_health_record.csv"
        );
    }

    #[test]
    fn test_category_deserialize_alias() {
        #[derive(Deserialize)]
        struct Wrapper {
            categories: Vec<RecordCategory>,
        }

        let parsed: Wrapper = toml::from_str(r#"categories = ["cda", "workouts"]"#).unwrap();
        assert_eq!(
            parsed.categories,
            vec![RecordCategory::ClinicalObservations, RecordCategory::Workouts]
        );
    }
}
