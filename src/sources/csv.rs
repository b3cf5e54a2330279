use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use arrow::{
    array::RecordBatch,
    csv::{ReaderBuilder, reader::Format},
    datatypes::{DataType, Field, Schema, SchemaRef},
};
use async_trait::async_trait;
use datafusion::{catalog::TableProvider, datasource::MemTable, prelude::SessionContext};

use crate::{error::CleanError, sources::data_source::DataSource};

/// A delimited text file with a header row.
///
/// Every column is read as a nullable UTF-8 string; no type inference is
/// attempted. Empty fields come back as nulls, and so do the trailing fields
/// of a row that is shorter than the header.
#[derive(Debug)]
pub struct CsvDataSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvDataSource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        let unavailable = |source| CleanError::SourceUnavailable {
            path: self.path.clone(),
            source,
        };

        let meta = std::fs::metadata(&self.path).map_err(unavailable)?;
        if !meta.is_file() {
            return Err(unavailable(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            ))
            .into());
        }

        Ok(File::open(&self.path).map_err(unavailable)?)
    }
}

#[async_trait]
impl DataSource for CsvDataSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn schema(&self) -> Result<SchemaRef> {
        let file = self.open()?;
        let (header, _) = Format::default()
            .with_header(true)
            .with_delimiter(self.delimiter)
            .infer_schema(file, Some(0))?;

        let fields: Vec<Field> = header
            .fields()
            .iter()
            .map(|field| Field::new(field.name(), DataType::Utf8, true))
            .collect();

        Ok(Arc::new(Schema::new(fields)))
    }

    async fn as_table_provider(&self, _ctx: &SessionContext) -> Result<Arc<dyn TableProvider>> {
        let schema = self.schema()?;
        let file = self.open()?;
        let delimiter = self.delimiter;

        let reader_schema = Arc::clone(&schema);
        let batches = tokio::task::spawn_blocking(move || -> Result<Vec<RecordBatch>> {
            let reader = ReaderBuilder::new(reader_schema)
                .with_header(true)
                .with_delimiter(delimiter)
                .with_truncated_rows(true)
                .build(file)?;
            Ok(reader.collect::<Result<Vec<_>, _>>()?)
        })
        .await??;

        Ok(Arc::new(MemTable::try_new(schema, vec![batches])?))
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::{Array, AsArray};

    use super::*;
    use crate::utils::test_data::TestLanding;

    #[test]
    fn test_name() {
        let source = CsvDataSource::new(PathBuf::from("Customers.csv"));
        assert_eq!(source.name(), "csv");
        assert_eq!(source.path(), Path::new("Customers.csv"));
    }

    #[test]
    fn test_schema_keeps_raw_header_names_as_strings() {
        let landing = TestLanding::new();
        let path = landing.write_source("Customers.csv", "Customer ID, Name,Age\n1,Alice,30\n");

        let schema = CsvDataSource::new(path).schema().unwrap();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["Customer ID", " Name", "Age"]);
        assert!(
            schema
                .fields()
                .iter()
                .all(|f| f.data_type() == &DataType::Utf8 && f.is_nullable())
        );
    }

    #[test]
    fn test_schema_with_custom_delimiter() {
        let landing = TestLanding::new();
        let path = landing.write_source("Stores.csv", "StoreID;Store Name\n1;Main\n");

        let schema = CsvDataSource::new(path)
            .with_delimiter(b';')
            .schema()
            .unwrap();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.field(1).name(), "Store Name");
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let landing = TestLanding::new();
        let source = CsvDataSource::new(landing.source_root().join("Missing.csv"));

        let err = source.schema().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CleanError>(),
            Some(CleanError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_directory_is_source_unavailable() {
        let landing = TestLanding::new();
        let source = CsvDataSource::new(landing.source_root().to_path_buf());

        let err = source.schema().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CleanError>(),
            Some(CleanError::SourceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_as_table_provider_can_be_queried() {
        let landing = TestLanding::new();
        let path = landing.write_source("Products.csv", "ProductID,Name\n1,Widget\n2,\n");

        let ctx = SessionContext::new();
        let provider = CsvDataSource::new(path)
            .as_table_provider(&ctx)
            .await
            .unwrap();
        let batches = ctx.read_table(provider).unwrap().collect().await.unwrap();

        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 2);

        let names = batches[0].column(1).as_string::<i32>();
        assert_eq!(names.value(0), "Widget");
        assert!(names.is_null(1));
    }

    #[tokio::test]
    async fn test_as_table_provider_does_not_leave_tables_registered() {
        let landing = TestLanding::new();
        let path = landing.write_source("Agents.csv", "AgentID\n1\n");

        let ctx = SessionContext::new();
        CsvDataSource::new(path)
            .as_table_provider(&ctx)
            .await
            .unwrap();

        let catalog = ctx.catalog("datafusion").unwrap();
        let schema = catalog.schema("public").unwrap();
        assert!(schema.table_names().is_empty());
    }

    #[tokio::test]
    async fn test_short_rows_are_padded_with_nulls() {
        let landing = TestLanding::new();
        let path = landing.write_source("Customers.csv", "CustomerID,Name,Email
1,Alice,a@x
2,Bob
");

        let ctx = SessionContext::new();
        let provider = CsvDataSource::new(path)
            .as_table_provider(&ctx)
            .await
            .unwrap();
        let batches = ctx.read_table(provider).unwrap().collect().await.unwrap();

        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.column(1).as_string::<i32>().value(1), "Bob");
        let emails = batch.column(2).as_string::<i32>();
        assert_eq!(emails.value(0), "a@x");
        assert!(emails.is_null(1));
    }

    #[tokio::test]
    async fn test_long_rows_are_rejected() {
        let landing = TestLanding::new();
        let path = landing.write_source("Stores.csv", "StoreID,City
1,Austin,extra
");

        let result = CsvDataSource::new(path)
            .as_table_provider(&SessionContext::new())
            .await;
        assert!(result.is_err());
    }
}
