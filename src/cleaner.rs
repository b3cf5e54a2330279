use std::path::PathBuf;

use anyhow::Result;
use arrow::datatypes::SchemaRef;
use datafusion::prelude::SessionContext;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    operations::{
        deduplicate::DeduplicateOperation, drop_null_keys::DropNullKeysOperation,
        normalize_names::NormalizeColumnNamesOperation,
        parse_timestamps::ParseTimestampsOperation,
    },
    pipeline::Pipeline,
    sinks::{
        csv::{CsvSink, CsvSinkOptions},
        data_sink::DataSink,
        output_layout::OutputLayout,
    },
    sources::csv::CsvDataSource,
    tables::TableConfig,
};

#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub delimiter: u8,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            destination_root: PathBuf::new(),
            delimiter: b',',
        }
    }
}

impl CleanOptions {
    pub fn new(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// What a successful clean produced.
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub table: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub files_written: Vec<PathBuf>,
    pub columns: Vec<String>,
    pub rows_written: u64,
}

/// Turns one raw table into one curated table:
/// normalize column names, drop rows missing a key, parse timestamp columns,
/// drop duplicate rows, then overwrite the destination.
pub struct TableCleaner {
    options: CleanOptions,
}

impl TableCleaner {
    pub fn new(options: CleanOptions) -> Self {
        Self { options }
    }

    pub async fn clean(&self, ctx: &SessionContext, table: &TableConfig) -> Result<CleanReport> {
        // checked before anything is deleted
        table.validate()?;

        let source = table.source_path(&self.options.source_root);
        let layout = OutputLayout::for_destination(
            table.destination_path(&self.options.destination_root),
        );

        info!(
            table = %table.name,
            source = %source.display(),
            destination = %layout.destination().display(),
            "cleaning table"
        );

        match self.clean_into(ctx, table, source.clone(), &layout).await {
            Ok(report) => {
                info!(
                    table = %table.name,
                    rows = report.rows_written,
                    "table cleaned"
                );
                Ok(report)
            }
            Err(err) => {
                // a stale or half-written destination must not look like this run's output
                if let Err(cleanup) = layout.discard().await {
                    warn!(
                        table = %table.name,
                        error = %cleanup,
                        "failed to remove partial output"
                    );
                }
                Err(err.context(format!("failed to clean table '{}'", table.name)))
            }
        }
    }

    async fn clean_into(
        &self,
        ctx: &SessionContext,
        table: &TableConfig,
        source: PathBuf,
        layout: &OutputLayout,
    ) -> Result<CleanReport> {
        let data_file = layout.prepare().await?;

        let sink_path = data_file.clone();
        let sink_options = CsvSinkOptions::new().with_delimiter(self.options.delimiter);

        let mut pipeline = Pipeline::new()
            .with_source(Box::new(
                CsvDataSource::new(source.clone()).with_delimiter(self.options.delimiter),
            ))
            .with_operation(Box::new(NormalizeColumnNamesOperation::new()))
            .with_operation(Box::new(DropNullKeysOperation::new(
                table.key_columns.clone(),
            )));

        // the key filter sees raw values, so an unparseable key timestamp is
        // kept as null rather than dropped
        if !table.timestamp_columns.is_empty() {
            pipeline = pipeline.with_operation(Box::new(ParseTimestampsOperation::new(
                table.timestamp_columns.clone(),
            )));
        }

        // rows can only be compared once every value is in its final form
        let result = pipeline
            .with_operation(Box::new(DeduplicateOperation::new()))
            .with_sink_factory(Box::new(move |schema: SchemaRef| {
                let sink: Box<dyn DataSink> =
                    Box::new(CsvSink::create(sink_path, &schema, &sink_options)?);
                Ok(sink)
            }))
            .execute(ctx)
            .await?;

        layout.commit().await?;

        Ok(CleanReport {
            table: table.name.clone(),
            source,
            destination: layout.destination().to_path_buf(),
            files_written: result.files_written,
            columns: result.columns,
            rows_written: result.rows_written,
        })
    }
}
