//! Flat attribute extraction
//!
//! The flat export schema stores each record as one element directly below the root, with every
//! value held in an attribute. A single routine handles all such record kinds; an
//! [`AttributeSpec`] names the tag and the attributes to read, in column order.

use crate::core::document::{Document, QName};
use crate::domain::{FlatRecord, RecordCategory};

/// Tag name and ordered attribute list for one flat record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Unnamespaced element name
    pub tag: &'static str,

    /// Attributes to read; also the output columns, in order
    pub fields: &'static [&'static str],
}

/// Physiological samples (`<Record>`)
pub const PHYSIOLOGICAL_RECORD: AttributeSpec = AttributeSpec {
    tag: "Record",
    fields: &[
        "type",
        "unit",
        "value",
        "sourceName",
        "sourceVersion",
        "creationDate",
        "startDate",
        "endDate",
    ],
};

/// Workouts (`<Workout>`)
pub const WORKOUT: AttributeSpec = AttributeSpec {
    tag: "Workout",
    fields: &[
        "workoutActivityType",
        "duration",
        "durationUnit",
        "sourceName",
        "startDate",
        "endDate",
    ],
};

/// Daily activity rings (`<ActivitySummary>`)
pub const ACTIVITY_SUMMARY: AttributeSpec = AttributeSpec {
    tag: "ActivitySummary",
    fields: &[
        "dateComponents",
        "activeEnergyBurned",
        "activeEnergyBurnedGoal",
        "activeEnergyBurnedUnit",
        "appleExerciseTime",
        "appleExerciseTimeGoal",
        "appleStandHours",
        "appleStandHoursGoal",
    ],
};

impl AttributeSpec {
    /// Configuration for a flat category, `None` for clinical observations
    pub fn for_category(category: RecordCategory) -> Option<Self> {
        match category {
            RecordCategory::ClinicalObservations => None,
            RecordCategory::Records => Some(PHYSIOLOGICAL_RECORD),
            RecordCategory::Workouts => Some(WORKOUT),
            RecordCategory::ActivitySummaries => Some(ACTIVITY_SUMMARY),
        }
    }
}

/// Extracts one record per root child named `spec.tag`
///
/// Only direct children of the root without a namespace match. Every record carries exactly
/// `spec.fields`, in order; a missing attribute becomes an empty string.
///
/// # Examples
///
/// ```
/// use healthport::core::document::parse_document;
/// use healthport::core::extract::attribute::{extract_attribute_records, WORKOUT};
///
/// let xml = r#"<HealthData>
///   <Workout workoutActivityType="HKWorkoutActivityTypeRunning" duration="31.5"/>
/// </HealthData>"#;
/// let document = parse_document(xml, "export.xml").unwrap();
///
/// let records = extract_attribute_records(&document, &WORKOUT);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].get("duration"), Some("31.5"));
/// assert_eq!(records[0].get("endDate"), Some(""));
/// ```
pub fn extract_attribute_records(document: &Document, spec: &AttributeSpec) -> Vec<FlatRecord> {
    let tag = QName::local(spec.tag);

    let records: Vec<FlatRecord> = document
        .root()
        .find_all(&tag)
        .map(|element| {
            spec.fields
                .iter()
                .map(|field| (*field, element.attribute(field).unwrap_or("")))
                .collect()
        })
        .collect();

    tracing::debug!(
        path = %document.path().display(),
        tag = spec.tag,
        records = records.len(),
        "Attribute extraction finished"
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::parse_document;
    use test_case::test_case;

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<HealthData locale="en_US">
  <ExportDate value="2023-01-02 10:00:00 +0000"/>
  <Record type="HKQuantityTypeIdentifierHeartRate" unit="count/min" value="72" sourceName="Watch" sourceVersion="1.0" creationDate="2023-01-01 00:00:00" startDate="2023-01-01 00:00:00" endDate="2023-01-01 00:01:00"/>
  <Record type="HKQuantityTypeIdentifierStepCount" unit="count" value="12" sourceName="Phone" startDate="2023-01-01 08:00:00" endDate="2023-01-01 08:05:00"/>
  <Workout workoutActivityType="HKWorkoutActivityTypeWalking" duration="20" durationUnit="min" sourceName="Watch" startDate="2023-01-01 09:00:00" endDate="2023-01-01 09:20:00">
    <Record type="Nested" value="ignored"/>
  </Workout>
  <ActivitySummary dateComponents="2023-01-01" activeEnergyBurned="410" activeEnergyBurnedGoal="500" activeEnergyBurnedUnit="Cal" appleExerciseTime="32" appleExerciseTimeGoal="30" appleStandHours="10" appleStandHoursGoal="12"/>
</HealthData>"#;

    #[test]
    fn test_records_keep_configured_order() {
        let document = parse_document(EXPORT, "export.xml").unwrap();
        let records = extract_attribute_records(&document, &PHYSIOLOGICAL_RECORD);

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].keys().collect::<Vec<_>>(),
            PHYSIOLOGICAL_RECORD.fields.to_vec()
        );
        assert_eq!(
            records[0].values().collect::<Vec<_>>(),
            vec![
                "HKQuantityTypeIdentifierHeartRate",
                "count/min",
                "72",
                "Watch",
                "1.0",
                "2023-01-01 00:00:00",
                "2023-01-01 00:00:00",
                "2023-01-01 00:01:00",
            ]
        );
    }

    #[test]
    fn test_missing_attribute_is_empty() {
        let document = parse_document(EXPORT, "export.xml").unwrap();
        let records = extract_attribute_records(&document, &PHYSIOLOGICAL_RECORD);

        let steps = &records[1];
        assert_eq!(steps.len(), PHYSIOLOGICAL_RECORD.fields.len());
        assert_eq!(steps.get("sourceVersion"), Some(""));
        assert_eq!(steps.get("creationDate"), Some(""));
        assert_eq!(steps.get("value"), Some("12"));
    }

    #[test]
    fn test_nested_elements_do_not_match() {
        let document = parse_document(EXPORT, "export.xml").unwrap();
        let records = extract_attribute_records(&document, &PHYSIOLOGICAL_RECORD);

        assert!(records.iter().all(|r| r.get("type") != Some("Nested")));
    }

    #[test_case(WORKOUT, 1, "workoutActivityType", "HKWorkoutActivityTypeWalking" ; "workout")]
    #[test_case(ACTIVITY_SUMMARY, 1, "appleStandHoursGoal", "12" ; "activity summary")]
    fn test_configurations(spec: AttributeSpec, count: usize, field: &str, expected: &str) {
        let document = parse_document(EXPORT, "export.xml").unwrap();
        let records = extract_attribute_records(&document, &spec);

        assert_eq!(records.len(), count);
        assert_eq!(records[0].get(field), Some(expected));
        assert!(records[0].has_keys(spec.fields));
    }

    #[test]
    fn test_namespaced_elements_do_not_match() {
        let xml = r#"<HealthData xmlns="urn:other"><Record type="x"/></HealthData>"#;
        let document = parse_document(xml, "export.xml").unwrap();

        assert!(extract_attribute_records(&document, &PHYSIOLOGICAL_RECORD).is_empty());
    }

    #[test]
    fn test_no_matching_elements() {
        let document = parse_document("<HealthData/>", "export.xml").unwrap();

        assert!(extract_attribute_records(&document, &WORKOUT).is_empty());
    }

    #[test]
    fn test_for_category() {
        assert_eq!(
            AttributeSpec::for_category(RecordCategory::Records),
            Some(PHYSIOLOGICAL_RECORD)
        );
        assert_eq!(
            AttributeSpec::for_category(RecordCategory::Workouts),
            Some(WORKOUT)
        );
        assert_eq!(
            AttributeSpec::for_category(RecordCategory::ActivitySummaries),
            Some(ACTIVITY_SUMMARY)
        );
        assert!(AttributeSpec::for_category(RecordCategory::ClinicalObservations).is_none());
    }
}
