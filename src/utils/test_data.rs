//! Fixtures shared by unit and integration tests.

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
};

use arrow::{
    array::{Array, ArrayRef, RecordBatch, StringArray},
    csv::{ReaderBuilder, reader::Format},
    datatypes::{DataType, Field, Schema},
    util::display::array_value_to_string,
};
use datafusion::prelude::DataFrame;
use tempfile::TempDir;

use crate::sinks::output_layout::PART_FILE_NAME;

pub type Row = Vec<Option<String>>;

/// A scratch landing zone and curated zone living under one temp directory.
pub struct TestLanding {
    dir: TempDir,
    source_root: PathBuf,
    destination_root: PathBuf,
}

impl Default for TestLanding {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLanding {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let source_root = dir.path().join("landing");
        let destination_root = dir.path().join("curated");
        std::fs::create_dir_all(&source_root).unwrap();
        std::fs::create_dir_all(&destination_root).unwrap();
        Self {
            dir,
            source_root,
            destination_root,
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    pub fn write_source(&self, file_name: &str, contents: &str) -> PathBuf {
        let path = self.source_root.join(file_name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn write_file(&self, file_name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn output_dir(&self, destination: &str) -> PathBuf {
        self.destination_root.join(destination)
    }
}

/// Joins a header and rows into CSV text.
pub fn csv_text(header: &str, rows: &[&str]) -> String {
    let mut text = String::from(header);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

/// A batch of nullable string columns.
pub fn string_batch(columns: &[&str], rows: &[&[Option<&str>]]) -> RecordBatch {
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let arrays: Vec<ArrayRef> = (0..columns.len())
        .map(|idx| {
            let values: Vec<Option<&str>> = rows.iter().map(|row| row[idx]).collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();

    RecordBatch::try_new(schema, arrays).unwrap()
}

fn batch_rows(batch: &RecordBatch) -> Vec<Row> {
    (0..batch.num_rows())
        .map(|row| {
            batch
                .columns()
                .iter()
                .map(|column| {
                    if column.is_null(row) {
                        None
                    } else {
                        Some(array_value_to_string(column, row).unwrap())
                    }
                })
                .collect()
        })
        .collect()
}

pub async fn collect_rows(df: DataFrame) -> Vec<Row> {
    df.collect()
        .await
        .unwrap()
        .iter()
        .flat_map(batch_rows)
        .collect()
}

pub async fn collect_sorted_rows(df: DataFrame) -> Vec<Row> {
    let mut rows = collect_rows(df).await;
    rows.sort();
    rows
}

/// A CSV file read back as strings, empty fields as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl CsvTable {
    pub fn read(path: &Path) -> Self {
        let (header, _) = Format::default()
            .with_header(true)
            .infer_schema(File::open(path).unwrap(), Some(0))
            .unwrap();
        let schema = Arc::new(Schema::new(
            header
                .fields()
                .iter()
                .map(|f| Field::new(f.name(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ));

        let reader = ReaderBuilder::new(schema.clone())
            .with_header(true)
            .build(File::open(path).unwrap())
            .unwrap();

        let rows = reader
            .flat_map(|batch| batch_rows(&batch.unwrap()))
            .collect();

        Self {
            columns: schema.fields().iter().map(|f| f.name().clone()).collect(),
            rows,
        }
    }

    /// Reads the part file of a table directory.
    pub fn read_dir(dir: &Path) -> Self {
        Self::read(&dir.join(PART_FILE_NAME))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Vec<Option<String>> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == name)
            .unwrap_or_else(|| panic!("column '{name}' not found in {:?}", self.columns));
        self.rows.iter().map(|row| row[idx].clone()).collect()
    }

    pub fn sorted_rows(&self) -> Vec<Row> {
        let mut rows = self.rows.clone();
        rows.sort();
        rows
    }
}

/// Builds an expected row from literals.
pub fn row(values: &[Option<&str>]) -> Row {
    values.iter().map(|v| v.map(str::to_string)).collect()
}
