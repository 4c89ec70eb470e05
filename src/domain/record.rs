//! Flat record model
//!
//! A [`FlatRecord`] is one exported row: an ordered mapping from field name to string value.
//! The empty string is the only representation of an absent value.

/// One exported row, ordered by insertion
///
/// # Examples
///
/// ```
/// use healthport::domain::FlatRecord;
///
/// let mut record = FlatRecord::new();
/// record.push("type", "HeartRate");
/// record.push("value", "72");
///
/// assert_eq!(record.get("value"), Some("72"));
/// assert_eq!(record.keys().collect::<Vec<_>>(), vec!["type", "value"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    fields: Vec<(String, String)>,
}

impl FlatRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record with room for `capacity` fields
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends a field, or overwrites the value in place if the name is already present
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Value of a field, if the record has it
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    /// Field values in key order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    /// (name, value) pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `names` matches this record's field names exactly, order included
    pub fn has_keys<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.fields.len() == names.len()
            && self
                .keys()
                .zip(names.iter())
                .all(|(key, name)| key == name.as_ref())
    }
}

impl<K, V> FromIterator<(K, V)> for FlatRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = FlatRecord::new();
        for (name, value) in iter {
            record.push(name, value);
        }
        record
    }
}
