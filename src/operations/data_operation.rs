use anyhow::Result;
use async_trait::async_trait;
use datafusion::prelude::DataFrame;

#[async_trait]
pub trait DataOperation: Send + Sync {
    fn name(&self) -> &str;

    async fn apply(&self, df: DataFrame) -> Result<DataFrame>;
}

/// Unqualified names of the frame's columns, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect()
}
