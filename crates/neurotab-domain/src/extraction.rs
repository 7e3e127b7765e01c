//! Extraction results - per chunk and per paper

use crate::schema::ExtractionSchema;
use std::collections::{HashMap, HashSet};

/// Values decoded from one LLM response for one chunk
///
/// Only holds fields that produced at least one value. A chunk whose response
/// could not be decoded is represented by [`PartialExtraction::empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialExtraction {
    values: HashMap<String, Vec<String>>,
}

impl PartialExtraction {
    /// Create an extraction with no values
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add one value to a field
    pub fn push(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.entry(field.into()).or_default().push(value.into());
    }

    /// Add several values to a field
    pub fn extend<I, S>(&mut self, field: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.values.entry(field.into()).or_default();
        entry.extend(values.into_iter().map(Into::into));
    }

    /// Builder-style variant of [`PartialExtraction::extend`]
    pub fn with<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extend(field, values);
        self
    }

    /// Values contributed to a field (empty if none)
    pub fn get(&self, field: &str) -> &[String] {
        self.values.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether no field has any value
    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }

    /// Total number of values across all fields
    pub fn value_count(&self) -> usize {
        self.values.values().map(Vec::len).sum()
    }

    /// Iterate over fields and their values (unspecified order)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Deduplicated union of every chunk's values for one paper
///
/// Holds exactly the fields of the schema it was created for, in schema order.
/// Each field's values form an unordered set compared by exact string equality,
/// so "fMRI" and "FMRI" are distinct members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateExtraction {
    fields: Vec<String>,
    values: HashMap<String, HashSet<String>>,
}

impl AggregateExtraction {
    /// Create an empty aggregate for the schema's fields
    pub fn new(schema: &ExtractionSchema) -> Self {
        let fields: Vec<String> = schema.field_names().map(str::to_string).collect();
        let values = fields
            .iter()
            .map(|name| (name.clone(), HashSet::new()))
            .collect();
        Self { fields, values }
    }

    /// Insert a value into a field. Returns `false` if the field is not in the
    /// schema or the value was already present.
    pub fn insert(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.values.get_mut(field) {
            Some(set) => set.insert(value.into()),
            None => false,
        }
    }

    /// Set of values for a field, or `None` if the field is not in the schema
    pub fn get(&self, field: &str) -> Option<&HashSet<String>> {
        self.values.get(field)
    }

    /// Field names in schema order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Iterate fields in schema order with their value sets
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashSet<String>)> {
        self.fields
            .iter()
            .filter_map(|name| self.values.get(name).map(|set| (name.as_str(), set)))
    }

    /// Values of a field joined by `delimiter`. Member order is unspecified.
    pub fn joined(&self, field: &str, delimiter: &str) -> String {
        self.values
            .get(field)
            .map(|set| {
                set.iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(delimiter)
            })
            .unwrap_or_default()
    }

    /// Values of a field in sorted order, for stable display
    pub fn sorted(&self, field: &str) -> Vec<&str> {
        let mut values: Vec<&str> = self
            .values
            .get(field)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        values.sort_unstable();
        values
    }

    /// Total number of distinct values across all fields
    pub fn value_count(&self) -> usize {
        self.values.values().map(HashSet::len).sum()
    }

    /// Whether every field is empty
    pub fn is_empty(&self) -> bool {
        self.values.values().all(HashSet::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaField;

    fn two_field_schema() -> ExtractionSchema {
        ExtractionSchema::new(vec![
            SchemaField::new("subjects", ["humans"]),
            SchemaField::new("template_space", ["MNI"]),
        ])
    }

    #[test]
    fn test_partial_push_and_get() {
        let mut partial = PartialExtraction::empty();
        assert!(partial.is_empty());

        partial.push("subjects", "humans");
        partial.extend("subjects", ["mice"]);

        assert_eq!(partial.get("subjects"), &["humans", "mice"]);
        assert!(partial.get("template_space").is_empty());
        assert_eq!(partial.value_count(), 2);
    }

    #[test]
    fn test_partial_with_empty_values_is_empty() {
        let partial = PartialExtraction::empty().with("subjects", Vec::<String>::new());
        assert!(partial.is_empty());
    }

    #[test]
    fn test_aggregate_has_schema_fields() {
        let aggregate = AggregateExtraction::new(&two_field_schema());
        assert_eq!(aggregate.fields(), &["subjects", "template_space"]);
        assert!(aggregate.is_empty());
        assert!(aggregate.get("subjects").unwrap().is_empty());
        assert!(aggregate.get("unknown").is_none());
    }

    #[test]
    fn test_aggregate_insert_deduplicates() {
        let mut aggregate = AggregateExtraction::new(&two_field_schema());
        assert!(aggregate.insert("subjects", "humans"));
        assert!(!aggregate.insert("subjects", "humans"));
        assert!(aggregate.insert("subjects", "Humans"));
        assert!(!aggregate.insert("unknown", "x"));

        assert_eq!(aggregate.value_count(), 2);
        assert_eq!(aggregate.sorted("subjects"), vec!["Humans", "humans"]);
    }

    #[test]
    fn test_joined_contains_every_member() {
        let mut aggregate = AggregateExtraction::new(&two_field_schema());
        aggregate.insert("subjects", "humans");
        aggregate.insert("subjects", "mice");

        let joined = aggregate.joined("subjects", ";");
        let members: HashSet<&str> = joined.split(';').collect();
        assert_eq!(members, HashSet::from(["humans", "mice"]));
        assert_eq!(aggregate.joined("template_space", ";"), "");
    }

    #[test]
    fn test_iter_follows_schema_order() {
        let aggregate = AggregateExtraction::new(&two_field_schema());
        let names: Vec<_> = aggregate.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["subjects", "template_space"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn aggregate_is_the_set_of_inserted_values(
                values in prop::collection::vec("[a-zA-Z0-9 ]{1,12}", 0..20)
            ) {
                let mut aggregate = AggregateExtraction::new(&two_field_schema());
                for value in &values {
                    aggregate.insert("subjects", value.clone());
                }

                let expected: HashSet<&str> = values.iter().map(String::as_str).collect();
                let joined = aggregate.joined("subjects", ";");
                let members: HashSet<&str> = if joined.is_empty() {
                    HashSet::new()
                } else {
                    joined.split(';').collect()
                };
                prop_assert_eq!(members, expected.clone());
                prop_assert_eq!(aggregate.value_count(), expected.len());
            }
        }
    }
}
