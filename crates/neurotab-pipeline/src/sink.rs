//! CSV output

use crate::error::PipelineError;
use neurotab_domain::{ExtractionSchema, OutputRow};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CSV writer with a fixed header: `pmcid`, `title`, then the schema fields
///
/// The destination is truncated on creation. Cells are quoted as needed by
/// the `csv` crate; `;` inside values is written as is.
pub struct CsvSink {
    writer: csv::Writer<File>,
    path: PathBuf,
    columns: usize,
    rows_written: usize,
}

impl CsvSink {
    /// Create (or overwrite) `path` and write the header
    pub fn create(path: impl AsRef<Path>, schema: &ExtractionSchema) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
        let mut writer = csv::Writer::from_writer(file);

        let header = OutputRow::header(schema);
        writer.write_record(&header)?;

        debug!(path = %path.display(), columns = header.len(), "Opened CSV sink");

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            columns: header.len(),
            rows_written: 0,
        })
    }

    /// Append one row
    pub fn write_row(&mut self, row: &OutputRow) -> Result<(), PipelineError> {
        let cells = row.cells();
        if cells.len() != self.columns {
            return Err(PipelineError::RowWidth {
                expected: self.columns,
                got: cells.len(),
            });
        }
        self.writer.write_record(&cells)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush buffered rows to disk
    pub fn flush(&mut self) -> Result<(), PipelineError> {
        self.writer
            .flush()
            .map_err(|e| PipelineError::io(&self.path, e))
    }

    /// Flush and close, returning the number of rows written
    pub fn finish(mut self) -> Result<usize, PipelineError> {
        self.flush()?;
        Ok(self.rows_written)
    }

    /// Rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write all rows to `path` in one go
pub fn write_rows(
    path: impl AsRef<Path>,
    rows: &[OutputRow],
    schema: &ExtractionSchema,
) -> Result<usize, PipelineError> {
    let mut sink = CsvSink::create(path, schema)?;
    for row in rows {
        sink.write_row(row)?;
    }
    sink.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurotab_domain::SchemaField;
    use tempfile::TempDir;

    fn schema() -> ExtractionSchema {
        ExtractionSchema::new(vec![
            SchemaField::new("subjects", ["humans"]),
            SchemaField::new("template_space", ["MNI"]),
        ])
    }

    fn row(pmcid: &str, title: &str, values: &[&str]) -> OutputRow {
        OutputRow {
            pmcid: pmcid.to_string(),
            title: title.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_header_only_for_empty_batch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let written = write_rows(&path, &[], &schema()).unwrap();
        assert_eq!(written, 0);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "pmcid,title,subjects,template_space\n"
        );
    }

    #[test]
    fn test_quotes_commas_and_newlines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        write_rows(
            &path,
            &[row("PMC1", "Tracts, \"fibres\"\nand more", &["humans;mice", ""])],
            &schema(),
        )
        .unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[1], "Tracts, \"fibres\"\nand more");
        assert_eq!(&record[2], "humans;mice");
        assert_eq!(&record[3], "");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content\nmore\nlines\n").unwrap();

        write_rows(&path, &[row("PMC1", "T", &["", ""])], &schema()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_row_width_mismatch() {
        let dir = TempDir::new().unwrap();
        let mut sink = CsvSink::create(dir.path().join("out.csv"), &schema()).unwrap();
        let result = sink.write_row(&row("PMC1", "T", &["only one"]));
        assert!(matches!(
            result,
            Err(PipelineError::RowWidth {
                expected: 4,
                got: 3
            })
        ));
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let result = CsvSink::create(&path, &schema());
        assert!(matches!(result, Err(PipelineError::Io { .. })));
    }

    #[test]
    fn test_incremental_rows_visible_after_flush() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&path, &schema()).unwrap();

        sink.write_row(&row("PMC1", "T", &["humans", "MNI"])).unwrap();
        sink.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert_eq!(sink.rows_written(), 1);
    }
}
