use std::sync::Arc;

use anyhow::Result;
use arrow::datatypes::SchemaRef;
use async_trait::async_trait;
use datafusion::{catalog::TableProvider, prelude::SessionContext};

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    /// Schema the table will be read with, as seen before any cleaning.
    fn schema(&self) -> Result<SchemaRef>;

    async fn as_table_provider(&self, ctx: &SessionContext) -> Result<Arc<dyn TableProvider>>;
}
