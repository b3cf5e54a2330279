use anyhow::Result;
use arrow::datatypes::{DataType, TimeUnit};
use async_trait::async_trait;
use datafusion::{
    common::Column,
    functions::string::expr_fn::btrim,
    logical_expr::try_cast,
    prelude::{DataFrame, col},
};

use crate::{
    error::{CleanError, ColumnRole},
    operations::data_operation::{DataOperation, column_names},
};

pub const TIMESTAMP_TYPE: DataType = DataType::Timestamp(TimeUnit::Microsecond, None);

/// Reinterprets string columns as timestamps.
///
/// Accepts ISO-8601 style text (`2024-01-01`, `2024-01-01 10:00:00`,
/// `2024-01-01T10:00:00.123Z`, `2024-01-01T10:00:00+02:00`) with surrounding
/// whitespace ignored. Anything else becomes null. Columns keep their position.
pub struct ParseTimestampsOperation {
    columns: Vec<String>,
}

impl ParseTimestampsOperation {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }
}

#[async_trait]
impl DataOperation for ParseTimestampsOperation {
    fn name(&self) -> &str {
        "parse_timestamps"
    }

    async fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        let available = column_names(&df);
        if let Some(missing) = self.columns.iter().find(|c| !available.contains(c)) {
            return Err(CleanError::MissingColumn {
                role: ColumnRole::Timestamp,
                column: missing.clone(),
                available,
            }
            .into());
        }

        let mut df = df;
        for name in &self.columns {
            let raw = col(Column::new_unqualified(name));
            df = df.with_column(name, try_cast(btrim(vec![raw]), TIMESTAMP_TYPE))?;
        }

        Ok(df)
    }
}
