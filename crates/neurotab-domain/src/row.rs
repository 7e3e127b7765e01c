//! Output row - the flattened per-paper record

use crate::extraction::AggregateExtraction;
use crate::paper::PaperRecord;
use crate::schema::{ExtractionSchema, RESERVED_COLUMNS};
use serde::{Deserialize, Serialize};

/// Delimiter used to join multi-valued fields into one cell
///
/// Literal `;` characters inside values are not escaped.
pub const MULTI_VALUE_DELIMITER: &str = ";";

/// One flattened record: `pmcid`, `title`, then one joined cell per schema field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    /// Paper identifier
    pub pmcid: String,

    /// Paper title
    pub title: String,

    /// Joined field values, aligned with the schema's field order
    pub values: Vec<String>,
}

impl OutputRow {
    /// Flatten a paper's aggregate into a row
    pub fn from_aggregate(paper: &PaperRecord, aggregate: &AggregateExtraction) -> Self {
        let values = aggregate
            .fields()
            .iter()
            .map(|field| aggregate.joined(field, MULTI_VALUE_DELIMITER))
            .collect();

        Self {
            pmcid: paper.pmcid.clone(),
            title: paper.title.clone(),
            values,
        }
    }

    /// Column names for a schema: `pmcid`, `title`, then the fields in order
    pub fn header(schema: &ExtractionSchema) -> Vec<String> {
        RESERVED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(schema.field_names().map(str::to_string))
            .collect()
    }

    /// Cells in column order
    pub fn cells(&self) -> Vec<&str> {
        [self.pmcid.as_str(), self.title.as_str()]
            .into_iter()
            .chain(self.values.iter().map(String::as_str))
            .collect()
    }

    /// Joined cell for a named field
    pub fn value(&self, schema: &ExtractionSchema, field: &str) -> Option<&str> {
        schema
            .field_names()
            .position(|name| name == field)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaField;

    fn schema() -> ExtractionSchema {
        ExtractionSchema::new(vec![
            SchemaField::new("subjects", ["humans"]),
            SchemaField::new("imaging_modalities", ["DTI"]),
        ])
    }

    #[test]
    fn test_header_order() {
        assert_eq!(
            OutputRow::header(&schema()),
            vec!["pmcid", "title", "subjects", "imaging_modalities"]
        );
    }

    #[test]
    fn test_from_aggregate() {
        let schema = schema();
        let paper = PaperRecord::new("PMC1").with_title("A paper");
        let mut aggregate = AggregateExtraction::new(&schema);
        aggregate.insert("imaging_modalities", "DTI");

        let row = OutputRow::from_aggregate(&paper, &aggregate);
        assert_eq!(row.pmcid, "PMC1");
        assert_eq!(row.title, "A paper");
        assert_eq!(row.values, vec!["".to_string(), "DTI".to_string()]);
        assert_eq!(row.value(&schema, "imaging_modalities"), Some("DTI"));
        assert_eq!(row.value(&schema, "missing"), None);
        assert_eq!(row.cells(), vec!["PMC1", "A paper", "", "DTI"]);
    }
}
