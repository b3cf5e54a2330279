use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use datafusion::{
    common::Column,
    prelude::{DataFrame, Expr, col},
};
use tracing::debug;

use crate::{
    error::CleanError,
    operations::data_operation::{DataOperation, column_names},
    utils::columns::{is_normalized, normalize_column_name},
};

/// Trims column names and replaces interior spaces with underscores.
///
/// Columns are renamed one at a time, each rename producing a fresh
/// projection, so a rename can never pick up another column's data.
pub struct NormalizeColumnNamesOperation;

impl NormalizeColumnNamesOperation {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NormalizeColumnNamesOperation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataOperation for NormalizeColumnNamesOperation {
    fn name(&self) -> &str {
        "normalize_column_names"
    }

    async fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        let original = column_names(&df);
        check_for_collisions(&original)?;

        let mut df = df;
        for (idx, name) in original.iter().enumerate() {
            if is_normalized(name) {
                continue;
            }
            let normalized = normalize_column_name(name);
            debug!(from = %name, to = %normalized, "renaming column");
            df = rename_column_at(df, idx, &normalized)?;
        }

        Ok(df)
    }
}

fn check_for_collisions(names: &[String]) -> Result<()> {
    let mut seen: HashMap<String, &String> = HashMap::new();
    for name in names {
        let normalized = normalize_column_name(name);
        if let Some(first) = seen.get(&normalized) {
            return Err(CleanError::ColumnNameCollision {
                first: (*first).clone(),
                second: name.clone(),
                normalized,
            }
            .into());
        }
        seen.insert(normalized, name);
    }
    Ok(())
}

fn rename_column_at(df: DataFrame, idx: usize, new_name: &str) -> Result<DataFrame> {
    let projection: Vec<Expr> = df
        .schema()
        .iter()
        .enumerate()
        .map(|(i, (qualifier, field))| {
            let column = col(Column::new(qualifier.cloned(), field.name()));
            if i == idx {
                column.alias(new_name)
            } else {
                column
            }
        })
        .collect();

    Ok(df.select(projection)?)
}
