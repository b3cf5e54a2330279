use anyhow::Result;
use async_trait::async_trait;
use datafusion::{
    common::Column,
    prelude::{DataFrame, Expr, col, lit},
};

use crate::{
    error::{CleanError, ColumnRole},
    operations::data_operation::{DataOperation, column_names},
};

/// Drops every row that is missing a value in any of the key columns.
///
/// Null and the empty string both count as missing. Nulls in other columns
/// are left alone.
pub struct DropNullKeysOperation {
    key_columns: Vec<String>,
}

impl DropNullKeysOperation {
    pub fn new(key_columns: Vec<String>) -> Self {
        Self { key_columns }
    }
}

#[async_trait]
impl DataOperation for DropNullKeysOperation {
    fn name(&self) -> &str {
        "drop_null_keys"
    }

    async fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        let available = column_names(&df);
        for key in &self.key_columns {
            if !available.contains(key) {
                return Err(CleanError::MissingColumn {
                    role: ColumnRole::Key,
                    column: key.clone(),
                    available,
                }
                .into());
            }
        }

        let Some(predicate) = self
            .key_columns
            .iter()
            .map(|key| is_present(key))
            .reduce(Expr::and)
        else {
            return Ok(df);
        };

        Ok(df.filter(predicate)?)
    }
}

fn is_present(name: &str) -> Expr {
    let column = col(Column::new_unqualified(name));
    column.clone().is_not_null().and(column.not_eq(lit("")))
}
