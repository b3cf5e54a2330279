use anyhow::Result;
use async_trait::async_trait;
use datafusion::prelude::DataFrame;

use crate::operations::data_operation::DataOperation;

/// Collapses rows that are equal in every column down to one. Survivor order is
/// whatever the engine produces.
pub struct DeduplicateOperation;

impl DeduplicateOperation {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeduplicateOperation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataOperation for DeduplicateOperation {
    fn name(&self) -> &str {
        "deduplicate"
    }

    async fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        Ok(df.distinct()?)
    }
}

#[cfg(test)]
mod tests {
    use datafusion::prelude::SessionContext;

    use super::*;
    use crate::utils::test_data::{collect_sorted_rows, row, string_batch};

    #[tokio::test]
    async fn test_exact_duplicates_collapse() {
        let ctx = SessionContext::new();
        let batch = string_batch(
            &["CustomerID", "Name"],
            &[
                &[Some("1"), Some("Alice")],
                &[Some("1"), Some("Alice")],
                &[Some("2"), None],
                &[Some("2"), None],
                &[Some("1"), Some("alice")],
            ],
        );
        let df = ctx.read_batch(batch).unwrap();

        let df = DeduplicateOperation::new().apply(df).await.unwrap();

        assert_eq!(
            collect_sorted_rows(df).await,
            vec![
                row(&[Some("1"), Some("Alice")]),
                row(&[Some("1"), Some("alice")]),
                row(&[Some("2"), None]),
            ]
        );
    }

    #[tokio::test]
    async fn test_is_idempotent() {
        let ctx = SessionContext::new();
        let batch = string_batch(
            &["ProductID", "Name"],
            &[
                &[Some("1"), Some("Widget")],
                &[Some("1"), Some("Widget")],
                &[Some("2"), Some("Gadget")],
            ],
        );
        let df = ctx.read_batch(batch).unwrap();

        let once = DeduplicateOperation::new().apply(df).await.unwrap();
        let twice = DeduplicateOperation::new()
            .apply(once.clone())
            .await
            .unwrap();

        assert_eq!(
            collect_sorted_rows(once).await,
            collect_sorted_rows(twice).await
        );
    }

    #[tokio::test]
    async fn test_rows_differing_in_one_column_survive() {
        let ctx = SessionContext::new();
        let batch = string_batch(
            &["StoreID", "City"],
            &[&[Some("1"), Some("Austin")], &[Some("1"), Some("Boston")]],
        );
        let df = ctx.read_batch(batch).unwrap();

        let df = DeduplicateOperation::new().apply(df).await.unwrap();

        assert_eq!(collect_sorted_rows(df).await.len(), 2);
    }
}
