//! Clinical observation extraction
//!
//! Reads `component/observation` entries from a CDA document (HL7 v3 namespace). Every field
//! is optional; a missing element or attribute becomes an empty string. Each observation is
//! extracted behind its own error boundary: a failure skips that observation only and is
//! collected into [`ClinicalExtraction::failures`].

use super::navigate::Probe;
use crate::core::document::{Document, Element, ElementPath, NamespaceMap, QName};
use crate::core::time::normalize_timestamp;
use crate::domain::{FieldExtractionError, FlatRecord, Result};

/// HL7 v3 namespace used by CDA documents
pub const CDA_NAMESPACE: &str = "urn:hl7-org:v3";

/// Prefix the lookups below are written against
const CDA_PREFIX: &str = "cda";

/// Default output columns, in order
pub const CLINICAL_COLUMNS: [&str; 10] = [
    "type",
    "value",
    "unit",
    "source",
    "sourceVersion",
    "startDate",
    "endDate",
    "startTime",
    "endTime",
    "status",
];

/// Optional column holding the code element's `displayName`, placed after `type`
pub const MEASUREMENT_COLUMN: &str = "measurement";

/// Extraction settings for the clinical category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalOptions {
    /// Namespace URI of the CDA elements
    pub namespace: String,

    /// Emit the `measurement` column
    pub include_measurement: bool,
}

impl Default for ClinicalOptions {
    fn default() -> Self {
        Self {
            namespace: CDA_NAMESPACE.to_string(),
            include_measurement: false,
        }
    }
}

impl ClinicalOptions {
    /// Column names produced with these options
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = CLINICAL_COLUMNS.to_vec();
        if self.include_measurement {
            columns.insert(1, MEASUREMENT_COLUMN);
        }
        columns
    }
}

/// Outcome of one clinical extraction run
#[derive(Debug, Clone, Default)]
pub struct ClinicalExtraction {
    /// One record per successfully processed observation
    pub records: Vec<FlatRecord>,

    /// Observations skipped because a field could not be computed
    pub failures: Vec<FieldExtractionError>,

    /// Components found anywhere in the document
    pub components: usize,

    /// Components without an observation child
    pub components_without_observation: usize,
}

impl ClinicalExtraction {
    /// Brief aggregate of the failures, `None` when nothing was skipped
    ///
    /// At most `limit` causes are listed; the rest are counted.
    pub fn failure_summary(&self, limit: usize) -> Option<String> {
        summarize_failures(&self.failures, limit)
    }
}

/// `"N observation(s) skipped: cause; cause (and K more)"`, `None` for no failures
pub fn summarize_failures(failures: &[FieldExtractionError], limit: usize) -> Option<String> {
    if failures.is_empty() {
        return None;
    }

    let listed: Vec<String> = failures
        .iter()
        .take(limit)
        .map(ToString::to_string)
        .collect();
    let mut summary = format!(
        "{} observation(s) skipped: {}",
        failures.len(),
        listed.join("; ")
    );
    if failures.len() > limit {
        summary.push_str(&format!(" (and {} more)", failures.len() - limit));
    }
    Some(summary)
}

/// Qualified names and paths used while reading observations
struct CdaLookups {
    component: QName,
    observation: QName,
    text: QName,
    code: QName,
    value: QName,
    status_code: QName,
    kind: ElementPath,
    source_name: ElementPath,
    source_version: ElementPath,
    low: ElementPath,
    high: ElementPath,
}

impl CdaLookups {
    fn new(namespace: &str) -> Result<Self> {
        let ns = NamespaceMap::new().with(CDA_PREFIX, namespace);
        let name = |step: &str| QName::parse(step, &ns);
        let path = |path: &str| ElementPath::parse(path, &ns);

        Ok(Self {
            component: name("cda:component")?,
            observation: name("cda:observation")?,
            text: name("cda:text")?,
            code: name("cda:code")?,
            value: name("cda:value")?,
            status_code: name("cda:statusCode")?,
            kind: path("cda:type")?,
            source_name: path("cda:sourceName")?,
            source_version: path("cda:sourceVersion")?,
            low: path("cda:effectiveTime/cda:low")?,
            high: path("cda:effectiveTime/cda:high")?,
        })
    }
}

/// Extracts one record per `component/observation` found anywhere in the document
///
/// Components without an observation are skipped silently. An observation whose fields cannot
/// be computed is skipped and reported in [`ClinicalExtraction::failures`].
///
/// # Errors
///
/// Returns a validation error only if `options.namespace` is empty.
///
/// # Examples
///
/// ```
/// use healthport::core::document::parse_document;
/// use healthport::core::extract::clinical::{extract_clinical_observations, ClinicalOptions};
///
/// let xml = r#"<ClinicalDocument xmlns="urn:hl7-org:v3">
///   <component><observation><value value="98.6" unit="degF"/></observation></component>
/// </ClinicalDocument>"#;
/// let document = parse_document(xml, "export_cda.xml").unwrap();
///
/// let extraction = extract_clinical_observations(&document, &ClinicalOptions::default()).unwrap();
/// assert_eq!(extraction.records.len(), 1);
/// assert_eq!(extraction.records[0].get("unit"), Some("degF"));
/// assert_eq!(extraction.records[0].get("startDate"), Some(""));
/// ```
pub fn extract_clinical_observations(
    document: &Document,
    options: &ClinicalOptions,
) -> Result<ClinicalExtraction> {
    if options.namespace.trim().is_empty() {
        return Err(crate::domain::HealthportError::Validation(
            "CDA namespace cannot be empty".to_string(),
        ));
    }

    let lookups = CdaLookups::new(&options.namespace)?;
    let mut extraction = ClinicalExtraction::default();

    for (index, component) in document
        .root()
        .descendants(&lookups.component)
        .into_iter()
        .enumerate()
    {
        extraction.components += 1;

        let Some(observation) = component.child(&lookups.observation) else {
            extraction.components_without_observation += 1;
            continue;
        };

        match extract_observation(observation, index + 1, &lookups, options) {
            Ok(record) => extraction.records.push(record),
            Err(failure) => {
                tracing::warn!(
                    ordinal = failure.ordinal,
                    field = %failure.field,
                    reason = %failure.reason,
                    "Skipping observation"
                );
                extraction.failures.push(failure);
            }
        }
    }

    tracing::debug!(
        path = %document.path().display(),
        components = extraction.components,
        without_observation = extraction.components_without_observation,
        records = extraction.records.len(),
        skipped = extraction.failures.len(),
        "Clinical extraction finished"
    );

    Ok(extraction)
}

/// Builds the record for one observation
fn extract_observation(
    element: &Element,
    ordinal: usize,
    lookups: &CdaLookups,
    options: &ClinicalOptions,
) -> std::result::Result<FlatRecord, FieldExtractionError> {
    let observation = Probe::new(element);
    let text = observation.child(&lookups.text);
    let value = observation.child(&lookups.value);

    let kind = read_text(text.path(&lookups.kind), ordinal, "type")?;
    let source = read_text(text.path(&lookups.source_name), ordinal, "source")?;
    let source_version = read_text(text.path(&lookups.source_version), ordinal, "sourceVersion")?;

    let (start_date, start_time) =
        normalize_timestamp(observation.path(&lookups.low).attr("value"));
    let (end_date, end_time) = normalize_timestamp(observation.path(&lookups.high).attr("value"));

    let mut record = FlatRecord::with_capacity(CLINICAL_COLUMNS.len() + 1);
    record.push("type", kind);
    if options.include_measurement {
        record.push(
            MEASUREMENT_COLUMN,
            observation.child(&lookups.code).attr("displayName"),
        );
    }
    record.push("value", value.attr("value"));
    record.push("unit", value.attr("unit"));
    record.push("source", source);
    record.push("sourceVersion", source_version);
    record.push("startDate", start_date);
    record.push("endDate", end_date);
    record.push("startTime", start_time);
    record.push("endTime", end_time);
    record.push("status", observation.child(&lookups.status_code).attr("code"));

    Ok(record)
}

fn read_text(
    probe: Probe<'_>,
    ordinal: usize,
    field: &str,
) -> std::result::Result<String, FieldExtractionError> {
    probe
        .text()
        .map_err(|e| FieldExtractionError::new(ordinal, field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::parse_document;

    fn cda(body: &str) -> Document {
        let xml = format!(
            r#"<?xml version="1.0"?>
<ClinicalDocument xmlns="urn:hl7-org:v3" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
{body}
</ClinicalDocument>"#
        );
        parse_document(&xml, "export_cda.xml").unwrap()
    }

    const FULL_OBSERVATION: &str = r#"
<entry><organizer><component>
  <observation classCode="OBS" moodCode="EVN">
    <code code="8310-5" displayName="Body temperature"/>
    <text>
      <sourceName>Health</sourceName>
      <sourceVersion>17.1</sourceVersion>
      <value>98.6</value>
      <type>HKQuantityTypeIdentifierBodyTemperature</type>
      <unit>degF</unit>
    </text>
    <statusCode code="completed"/>
    <effectiveTime>
      <low value="20231105073000+0100"/>
      <high value="20231105073500+0100"/>
    </effectiveTime>
    <value xsi:type="PQ" value="98.6" unit="degF"/>
  </observation>
</component></organizer></entry>"#;

    #[test]
    fn test_full_observation() {
        let document = cda(FULL_OBSERVATION);
        let extraction =
            extract_clinical_observations(&document, &ClinicalOptions::default()).unwrap();

        assert_eq!(extraction.records.len(), 1);
        let record = &extraction.records[0];
        assert!(record.has_keys(&CLINICAL_COLUMNS));
        assert_eq!(
            record.values().collect::<Vec<_>>(),
            vec![
                "HKQuantityTypeIdentifierBodyTemperature",
                "98.6",
                "degF",
                "Health",
                "17.1",
                "2023-11-05",
                "2023-11-05",
                "07:30:00",
                "07:35:00",
                "completed",
            ]
        );
    }

    #[test]
    fn test_measurement_column_optional() {
        let document = cda(FULL_OBSERVATION);
        let options = ClinicalOptions {
            include_measurement: true,
            ..ClinicalOptions::default()
        };
        let extraction = extract_clinical_observations(&document, &options).unwrap();

        let record = &extraction.records[0];
        assert!(record.has_keys(&options.columns()));
        assert_eq!(record.keys().nth(1), Some("measurement"));
        assert_eq!(record.get("measurement"), Some("Body temperature"));
    }

    #[test]
    fn test_observation_without_effective_time() {
        let document = cda(
            r#"<component><observation><value value="98.6" unit="degF"/></observation></component>"#,
        );
        let extraction =
            extract_clinical_observations(&document, &ClinicalOptions::default()).unwrap();

        assert_eq!(extraction.records.len(), 1);
        let record = &extraction.records[0];
        assert_eq!(record.get("value"), Some("98.6"));
        assert_eq!(record.get("unit"), Some("degF"));
        for field in ["startDate", "endDate", "startTime", "endTime"] {
            assert_eq!(record.get(field), Some(""), "{field}");
        }
        assert!(record.has_keys(&CLINICAL_COLUMNS));
    }

    #[test]
    fn test_component_without_observation_is_skipped() {
        let document = cda(
            r#"<component><section/></component>
<component><observation><statusCode code="completed"/></observation></component>"#,
        );
        let extraction =
            extract_clinical_observations(&document, &ClinicalOptions::default()).unwrap();

        assert_eq!(extraction.components, 2);
        assert_eq!(extraction.components_without_observation, 1);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].get("status"), Some("completed"));
        assert!(extraction.failures.is_empty());
    }

    #[test]
    fn test_malformed_timestamps_yield_empty_fields() {
        let document = cda(
            r#"<component><observation><effectiveTime>
  <low value="2023"/><high value="20231332120000"/>
</effectiveTime></observation></component>"#,
        );
        let extraction =
            extract_clinical_observations(&document, &ClinicalOptions::default()).unwrap();

        let record = &extraction.records[0];
        assert_eq!(record.get("startDate"), Some(""));
        assert_eq!(record.get("endTime"), Some(""));
    }

    #[test]
    fn test_type_text_ends_at_first_child() {
        let document = cda(
            r#"<component><observation>
  <text><type>Heart<sub/>Tail</type><sourceName>Watch<br/> (2)</sourceName></text>
</observation></component>"#,
        );
        let extraction =
            extract_clinical_observations(&document, &ClinicalOptions::default()).unwrap();

        let record = &extraction.records[0];
        assert_eq!(record.get("type"), Some("Heart"));
        assert_eq!(record.get("source"), Some("Watch"));
    }

    #[test]
    fn test_failing_observation_is_isolated() {
        let document = cda(
            r#"<component><observation><text><type>Good</type></text></observation></component>
<component><observation><text><type>Bad &bogus; entity</type></text></observation></component>
<component><observation><text><type>AlsoGood</type></text></observation></component>"#,
        );
        let extraction =
            extract_clinical_observations(&document, &ClinicalOptions::default()).unwrap();

        let kinds: Vec<_> = extraction
            .records
            .iter()
            .map(|r| r.get("type").unwrap().to_string())
            .collect();
        assert_eq!(kinds, vec!["Good", "AlsoGood"]);
        assert_eq!(extraction.failures.len(), 1);
        assert_eq!(extraction.failures[0].ordinal, 2);
        assert_eq!(extraction.failures[0].field, "type");

        let summary = extraction.failure_summary(5).unwrap();
        assert!(summary.starts_with("1 observation(s) skipped"));
    }

    #[test]
    fn test_failure_summary_limit() {
        let mut extraction = ClinicalExtraction::default();
        assert!(extraction.failure_summary(2).is_none());

        for ordinal in 1..=4 {
            extraction
                .failures
                .push(FieldExtractionError::new(ordinal, "type", "bad"));
        }
        let summary = extraction.failure_summary(2).unwrap();
        assert!(summary.starts_with("4 observation(s) skipped"));
        assert!(summary.ends_with("(and 2 more)"));
    }

    #[test]
    fn test_unnamespaced_components_are_ignored() {
        let xml = r#"<ClinicalDocument><component><observation/></component></ClinicalDocument>"#;
        let document = parse_document(xml, "plain.xml").unwrap();
        let extraction =
            extract_clinical_observations(&document, &ClinicalOptions::default()).unwrap();

        assert_eq!(extraction.components, 0);
        assert!(extraction.records.is_empty());
    }

    #[test]
    fn test_nested_components_are_all_visited() {
        let document = cda(
            r#"<component><structuredBody>
  <component><observation><text><type>Inner</type></text></observation></component>
</structuredBody></component>"#,
        );
        let extraction =
            extract_clinical_observations(&document, &ClinicalOptions::default()).unwrap();

        assert_eq!(extraction.components, 2);
        assert_eq!(extraction.components_without_observation, 1);
        assert_eq!(extraction.records[0].get("type"), Some("Inner"));
    }

    #[test]
    fn test_custom_namespace() {
        let xml = r#"<doc xmlns="urn:custom"><component><observation><statusCode code="active"/></observation></component></doc>"#;
        let document = parse_document(xml, "custom.xml").unwrap();
        let options = ClinicalOptions {
            namespace: "urn:custom".to_string(),
            include_measurement: false,
        };

        let extraction = extract_clinical_observations(&document, &options).unwrap();
        assert_eq!(extraction.records[0].get("status"), Some("active"));
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let document = cda("");
        let options = ClinicalOptions {
            namespace: " ".to_string(),
            include_measurement: false,
        };
        assert!(extract_clinical_observations(&document, &options).is_err());
    }
}
