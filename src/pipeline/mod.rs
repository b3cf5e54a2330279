use anyhow::{Result, anyhow};
use arrow::datatypes::SchemaRef;
use datafusion::prelude::{SessionConfig, SessionContext};
use std::sync::Arc;
use tracing::debug;

use crate::{
    operations::data_operation::DataOperation,
    sinks::data_sink::{DataSink, SinkResult},
    sources::data_source::DataSource,
};

/// Builds the sink once the final schema of the frame is known.
pub type SinkFactory = Box<dyn FnOnce(SchemaRef) -> Result<Box<dyn DataSink>> + Send>;

/// Reads one source, applies operations in order, and drains the result into one sink.
#[derive(Default)]
pub struct Pipeline {
    source: Option<Box<dyn DataSource>>,
    operations: Vec<Box<dyn DataOperation>>,
    sink_factory: Option<SinkFactory>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Box<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_operation(mut self, operation: Box<dyn DataOperation>) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_sink_factory(mut self, sink_factory: SinkFactory) -> Self {
        self.sink_factory = Some(sink_factory);
        self
    }

    pub async fn execute(self, ctx: &SessionContext) -> Result<SinkResult> {
        let source = self
            .source
            .ok_or_else(|| anyhow!("Pipeline has no source"))?;
        let sink_factory = self
            .sink_factory
            .ok_or_else(|| anyhow!("Pipeline has no sink"))?;

        let table_provider = source.as_table_provider(ctx).await?;
        let mut df = ctx.read_table(table_provider)?;

        for operation in &self.operations {
            debug!(operation = operation.name(), "applying operation");
            df = operation.apply(df).await?;
        }

        let schema = Arc::clone(df.schema().inner());
        let mut sink = sink_factory(schema)?;
        sink.write_stream(df.execute_stream().await?).await
    }
}

pub fn build_session_context(target_partitions: Option<usize>) -> SessionContext {
    let mut cfg = SessionConfig::new();
    if let Some(partitions) = target_partitions {
        cfg = cfg.with_target_partitions(partitions);
    }
    SessionContext::new_with_config(cfg)
}
