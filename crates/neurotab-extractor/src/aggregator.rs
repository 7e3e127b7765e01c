//! Folding chunk results into one record per paper

use neurotab_domain::{AggregateExtraction, ExtractionSchema, PartialExtraction};

/// Accumulates partial extractions into a deduplicated aggregate
///
/// Values are compared by exact string equality. Fields outside the schema
/// are dropped.
#[derive(Debug, Clone)]
pub struct Aggregator {
    aggregate: AggregateExtraction,
    folded: usize,
}

impl Aggregator {
    /// Start an empty aggregate for the schema
    pub fn new(schema: &ExtractionSchema) -> Self {
        Self {
            aggregate: AggregateExtraction::new(schema),
            folded: 0,
        }
    }

    /// Merge one partial extraction. Returns how many values were new.
    pub fn fold(&mut self, partial: &PartialExtraction) -> usize {
        self.folded += 1;
        let mut added = 0;
        for (field, values) in partial.iter() {
            for value in values {
                if self.aggregate.insert(field, value.as_str()) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Number of partials folded so far
    pub fn folded(&self) -> usize {
        self.folded
    }

    /// Finish and return the aggregate
    pub fn finish(self) -> AggregateExtraction {
        self.aggregate
    }
}

/// Fold every partial into one aggregate
pub fn aggregate<'a, I>(schema: &ExtractionSchema, partials: I) -> AggregateExtraction
where
    I: IntoIterator<Item = &'a PartialExtraction>,
{
    let mut aggregator = Aggregator::new(schema);
    for partial in partials {
        aggregator.fold(partial);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurotab_domain::SchemaField;
    use std::collections::HashSet;

    fn schema() -> ExtractionSchema {
        ExtractionSchema::new(vec![
            SchemaField::new("subjects", ["humans"]),
            SchemaField::new("template_space", ["MNI"]),
        ])
    }

    #[test]
    fn test_union_of_chunks() {
        let partials = [
            PartialExtraction::empty().with("subjects", ["humans", "mice"]),
            PartialExtraction::empty().with("subjects", ["mice", "rats"]),
        ];
        let aggregate = aggregate(&schema(), &partials);

        let expected: HashSet<String> =
            ["humans", "mice", "rats"].iter().map(|s| s.to_string()).collect();
        assert_eq!(aggregate.get("subjects"), Some(&expected));
        assert!(aggregate.get("template_space").unwrap().is_empty());
    }

    #[test]
    fn test_empty_partial_contributes_nothing() {
        let mut aggregator = Aggregator::new(&schema());
        aggregator.fold(&PartialExtraction::empty().with("subjects", ["humans"]));

        assert_eq!(aggregator.fold(&PartialExtraction::empty()), 0);
        assert_eq!(aggregator.folded(), 2);

        let aggregate = aggregator.finish();
        assert_eq!(aggregate.value_count(), 1);
    }

    #[test]
    fn test_no_case_normalization() {
        let partials = [PartialExtraction::empty().with("subjects", ["fMRI", "FMRI", "fMRI"])];
        let aggregate = aggregate(&schema(), &partials);
        assert_eq!(aggregate.sorted("subjects"), vec!["FMRI", "fMRI"]);
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let mut aggregator = Aggregator::new(&schema());
        let added = aggregator.fold(&PartialExtraction::empty().with("confidence", ["high"]));
        assert_eq!(added, 0);
        assert!(aggregator.finish().is_empty());
    }

    #[test]
    fn test_no_partials_gives_empty_aggregate() {
        let aggregate = aggregate(&schema(), std::iter::empty());
        assert_eq!(aggregate.fields(), &["subjects", "template_space"]);
        assert!(aggregate.is_empty());
    }
}
