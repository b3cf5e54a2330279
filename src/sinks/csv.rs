use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Result, anyhow};
use arrow::{
    array::RecordBatch,
    csv::{Writer, WriterBuilder},
    datatypes::SchemaRef,
};
use async_trait::async_trait;

use crate::sinks::data_sink::{DataSink, SinkResult};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub struct CsvSinkOptions {
    delimiter: u8,
}

impl Default for CsvSinkOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvSinkOptions {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Writes record batches as delimited text with a header row. Nulls are
/// written as empty fields and timestamps as `2024-01-01 10:00:00[.ffffff]`.
pub struct CsvSink {
    path: PathBuf,
    schema: SchemaRef,
    rows_written: u64,
    started: bool,
    writer: Option<Writer<BufWriter<File>>>,
}

impl CsvSink {
    pub fn create(path: PathBuf, schema: &SchemaRef, options: &CsvSinkOptions) -> Result<Self> {
        let file = BufWriter::new(File::create(&path)?);
        let writer = WriterBuilder::new()
            .with_header(true)
            .with_delimiter(options.delimiter)
            .with_timestamp_format(TIMESTAMP_FORMAT.to_string())
            .build(file);

        Ok(Self {
            path,
            schema: schema.clone(),
            rows_written: 0,
            started: false,
            writer: Some(writer),
        })
    }

    fn writer(&mut self) -> Result<&mut Writer<BufWriter<File>>> {
        self.writer
            .as_mut()
            .ok_or_else(|| anyhow!("CSV sink for {} is already finished", self.path.display()))
    }
}

#[async_trait]
impl DataSink for CsvSink {
    async fn write_batch(&mut self, batch: RecordBatch) -> Result<()> {
        let rows = batch.num_rows() as u64;
        self.writer()?.write(&batch)?;
        self.started = true;
        self.rows_written += rows;
        Ok(())
    }

    async fn finish(&mut self) -> Result<SinkResult> {
        // the header is only emitted alongside the first batch
        if !self.started {
            let empty = RecordBatch::new_empty(self.schema.clone());
            self.writer()?.write(&empty)?;
            self.started = true;
        }

        let writer = self
            .writer
            .take()
            .ok_or_else(|| anyhow!("CSV sink for {} is already finished", self.path.display()))?;
        writer.into_inner().flush()?;

        Ok(SinkResult {
            files_written: vec![self.path.clone()],
            rows_written: self.rows_written,
            columns: self
                .schema
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect(),
        })
    }
}
