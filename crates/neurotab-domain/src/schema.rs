//! Extraction schema - the fields the LLM is asked to populate

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Column names written before the schema fields in every output row
pub const RESERVED_COLUMNS: [&str; 2] = ["pmcid", "title"];

/// Errors raised when a schema is malformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema declares no fields
    #[error("Schema has no fields")]
    Empty,

    /// A field has an empty or whitespace-only name
    #[error("Field #{0} has an empty name")]
    EmptyFieldName(usize),

    /// A field name has leading or trailing whitespace
    #[error("Field name '{0}' has leading or trailing whitespace")]
    PaddedFieldName(String),

    /// The same field name is declared twice
    #[error("Duplicate field: {0}")]
    DuplicateField(String),

    /// A field name collides with a fixed output column
    #[error("Field name '{0}' is reserved for a fixed output column")]
    ReservedField(String),

    /// TOML could not be parsed or produced
    #[error("Schema TOML error: {0}")]
    Toml(String),
}

/// One categorical attribute extracted from each paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name, used as JSON key and CSV column
    pub name: String,

    /// Illustrative values shown to the LLM (not exhaustive)
    #[serde(default)]
    pub examples: Vec<String>,

    /// Field-specific extraction rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl SchemaField {
    /// Create a field with example values
    pub fn new<I, S>(name: impl Into<String>, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            examples: examples.into_iter().map(Into::into).collect(),
            rule: None,
        }
    }

    /// Attach a field-specific rule
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }
}

/// Ordered list of fields plus the instruction text around them
///
/// Field order is significant: it fixes the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSchema {
    /// Opening sentence of the system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,

    /// Rules that apply to every field
    #[serde(default)]
    pub rules: Vec<String>,

    /// Fields in output order
    pub fields: Vec<SchemaField>,
}

impl ExtractionSchema {
    /// Create a schema from fields with no preamble or general rules
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self {
            preamble: None,
            rules: Vec::new(),
            fields,
        }
    }

    /// Set the preamble
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    /// Append a general rule
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rules.push(rule.into());
        self
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether a field with this exact name exists
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check field names are present, unpadded, unique and not reserved
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::new();
        for (idx, field) in self.fields.iter().enumerate() {
            let name = field.name.trim();
            if name.is_empty() {
                return Err(SchemaError::EmptyFieldName(idx));
            }
            if name != field.name {
                return Err(SchemaError::PaddedFieldName(field.name.clone()));
            }
            if RESERVED_COLUMNS.contains(&name) {
                return Err(SchemaError::ReservedField(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateField(name.to_string()));
            }
        }
        Ok(())
    }

    /// Load and validate a schema from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, SchemaError> {
        let schema: Self =
            toml::from_str(toml_str).map_err(|e| SchemaError::Toml(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Serialize the schema to a TOML string
    pub fn to_toml(&self) -> Result<String, SchemaError> {
        toml::to_string_pretty(self).map_err(|e| SchemaError::Toml(e.to_string()))
    }

    /// Look up a built-in schema by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "white-matter" | "whitematter" | "full" => Some(Self::white_matter()),
            "core" | "basic" => Some(Self::core()),
            _ => None,
        }
    }

    /// Names accepted by [`ExtractionSchema::preset`]
    pub fn preset_names() -> &'static [&'static str] {
        &["white-matter", "core"]
    }

    /// The production 11-field schema for white matter imaging papers
    pub fn white_matter() -> Self {
        let fields = vec![
            SchemaField::new("subjects", ["humans", "mice", "rats", "monkeys"])
                .with_rule("Subjects should be the species/organisms studied, e.g humans, mice, rats, monkeys"),
            SchemaField::new(
                "patient_groups",
                ["Alzheimer's disease", "Bipolar", "Healthy controls"],
            )
            .with_rule("Patient groups should be conditions or diseases affecting humans e.g Alzheimer's disease, Bipolar disorder, Healthy controls"),
            SchemaField::new(
                "imaging_modalities",
                ["Anatomical MRI", "fMRI", "DTI", "PET", "CT", "SPECT", "MEG", "EEG"],
            )
            .with_rule("Imaging modalities should be only brain imaging modalities related to structural and functional brain imaging"),
            SchemaField::new(
                "whitematter_tracts",
                [
                    "Corpus Callosum",
                    "Cingulum",
                    "Uncinate Fasciculus",
                    "Superior Longitudinal Fasciculus",
                ],
            )
            .with_rule("For white matter tracts, only return names of specific white matter tracts, not general brain regions"),
            SchemaField::new("analysis_software", ["DIPY", "FSL", "FreeSurfer", "SPM"])
                .with_rule("Analysis software: Extract the specialized neuroimaging analysis software or toolboxes that were used for the neuroimaging analysis, e.g (FSL, FreeSurfer, SPM, AFNI, DIPY). Do NOT include statistical analysis software like SPSS, R, STATA, etc. Only comprehensive software library specifically for analyzing and processing neuroimaging data, such as fMRI, sMRI, and diffusion MRI."),
            SchemaField::new("study_type", ["review", "single study"])
                .with_rule("Study type: \"single study\" for original research, \"review\" for review studies or meta-analysis"),
            SchemaField::new(
                "diffusion_measures",
                ["FA", "MD", "AD", "RD", "MK", "NDI", "ODI"],
            ),
            SchemaField::new("template_space", ["Talairach", "MNI"])
                .with_rule("Template space should be the template space used for the analysis, e.g Talairach, MNI"),
            SchemaField::new(
                "results_method",
                ["t-test", "ANOVA", "MANOVA", "beta effect size", "correlation", "regression"],
            )
            .with_rule("Results method should be the statistical method used for the analysis"),
            SchemaField::new("white_integrity", ["decrease", "increase", "no mention"])
                .with_rule("White matter integrity should be the mention of white matter integrity changes in the text"),
            SchemaField::new(
                "question_of_study",
                ["bipolar patients vs controls", "Alzheimer's patients vs controls"],
            )
            .with_rule("Question of study should be the experimental conditions or comparisons the researchers used"),
        ];

        Self::new(fields)
            .with_preamble("You are an information extraction expert for brain imaging papers.")
            .with_rule("Return values mentioned in the text that clearly belong to each category")
            .with_rule("The lists given above are examples, not exhaustive")
            .with_rule("If none apply, return an empty list for that field")
            .with_rule("Output must be valid JSON only")
    }

    /// The original 4-field schema (modalities, patient groups, tracts, subjects)
    pub fn core() -> Self {
        let fields = vec![
            SchemaField::new(
                "imaging_modalities",
                ["Anatomical MRI", "fMRI", "DTI", "PET", "CT", "SPECT", "MEG", "EEG"],
            )
            .with_rule("Imaging modalities should be only brain imaging modalities related to structural and functional brain imaging"),
            SchemaField::new(
                "patient_groups",
                ["Alzheimer's disease", "Bipolar", "Healthy controls"],
            )
            .with_rule("Patient groups should be conditions or diseases affecting humans"),
            SchemaField::new(
                "whitematter_tracts",
                [
                    "Corpus Callosum",
                    "Cingulum",
                    "Uncinate Fasciculus",
                    "Superior Longitudinal Fasciculus",
                    "Inferior Longitudinal Fasciculus",
                    "Fornix",
                    "Arcuate Fasciculus",
                    "Corticospinal Tract",
                ],
            )
            .with_rule("For white matter tracts, only return names of specific white matter tracts, not general brain regions"),
            SchemaField::new("subjects", ["humans", "mice", "rats", "monkeys"])
                .with_rule("Subjects should be the species/organisms studied"),
        ];

        Self::new(fields)
            .with_preamble("You are an information extraction expert for brain imaging papers.")
            .with_rule("Return values mentioned in the text that clearly belong to each category")
            .with_rule("The lists given above are examples, not exhaustive")
            .with_rule("If none apply, return an empty list for that field")
            .with_rule("Output must be valid JSON only")
    }
}

impl Default for ExtractionSchema {
    fn default() -> Self {
        Self::white_matter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_matter_preset_field_order() {
        let schema = ExtractionSchema::white_matter();
        let names: Vec<_> = schema.field_names().collect();
        assert_eq!(
            names,
            vec![
                "subjects",
                "patient_groups",
                "imaging_modalities",
                "whitematter_tracts",
                "analysis_software",
                "study_type",
                "diffusion_measures",
                "template_space",
                "results_method",
                "white_integrity",
                "question_of_study",
            ]
        );
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_core_preset() {
        let schema = ExtractionSchema::core();
        assert_eq!(schema.len(), 4);
        assert!(schema.contains("whitematter_tracts"));
        assert!(!schema.contains("study_type"));
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(ExtractionSchema::preset("core"), Some(ExtractionSchema::core()));
        assert_eq!(
            ExtractionSchema::preset("White-Matter"),
            Some(ExtractionSchema::white_matter())
        );
        assert!(ExtractionSchema::preset("nope").is_none());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let schema = ExtractionSchema::new(vec![]);
        assert_eq!(schema.validate(), Err(SchemaError::Empty));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let schema = ExtractionSchema::new(vec![
            SchemaField::new("subjects", ["humans"]),
            SchemaField::new("subjects", ["mice"]),
        ]);
        assert_eq!(
            schema.validate(),
            Err(SchemaError::DuplicateField("subjects".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_reserved_and_blank_names() {
        let schema = ExtractionSchema::new(vec![SchemaField::new("title", ["x"])]);
        assert!(matches!(schema.validate(), Err(SchemaError::ReservedField(_))));

        let schema = ExtractionSchema::new(vec![
            SchemaField::new("subjects", ["x"]),
            SchemaField::new("  ", Vec::<String>::new()),
        ]);
        assert_eq!(schema.validate(), Err(SchemaError::EmptyFieldName(1)));
    }

    #[test]
    fn test_toml_round_trip() {
        let schema = ExtractionSchema::white_matter();
        let toml_str = schema.to_toml().unwrap();
        let parsed = ExtractionSchema::from_toml(&toml_str).unwrap();
        assert_eq!(schema, parsed);
    }

    #[test]
    fn test_from_toml_minimal() {
        let toml_str = r#"
            [[fields]]
            name = "subjects"
            examples = ["humans", "mice"]

            [[fields]]
            name = "template_space"
        "#;

        let schema = ExtractionSchema::from_toml(toml_str).unwrap();
        assert_eq!(schema.len(), 2);
        assert!(schema.rules.is_empty());
        assert!(schema.field("template_space").unwrap().examples.is_empty());
    }

    #[test]
    fn test_from_toml_validates() {
        let toml_str = r#"
            [[fields]]
            name = "pmcid"
        "#;
        assert!(matches!(
            ExtractionSchema::from_toml(toml_str),
            Err(SchemaError::ReservedField(_))
        ));
    }

    #[test]
    fn test_validate_rejects_padded_names() {
        let schema = ExtractionSchema::new(vec![SchemaField::new(" subjects", ["humans"])]);
        assert_eq!(
            schema.validate(),
            Err(SchemaError::PaddedFieldName(" subjects".to_string()))
        );

        let toml_str = r#"
            [[fields]]
            name = "subjects "
            examples = ["humans"]
        "#;
        assert!(matches!(
            ExtractionSchema::from_toml(toml_str),
            Err(SchemaError::PaddedFieldName(name)) if name == "subjects "
        ));
    }
}
