use anyhow::Result;
use datafusion::prelude::SessionContext;
use tracing::{error, info, warn};

use crate::{
    RunCommand,
    cleaner::{CleanOptions, CleanReport, TableCleaner},
    commands::report::print_reports,
    pipeline::build_session_context,
    tables::{Catalog, TableConfig},
};

pub async fn run(args: RunCommand) -> Result<()> {
    let RunCommand {
        source_root,
        destination_root,
        manifest,
        tables,
        keep_going,
        delimiter,
        target_partitions,
        report,
    } = args;

    let catalog = Catalog::load(manifest.as_deref())?;
    let selected = catalog.select(&tables)?;

    let ctx = build_session_context(target_partitions);
    let cleaner = TableCleaner::new(
        CleanOptions::new(source_root, destination_root).with_delimiter(delimiter),
    );

    let outcome = clean_tables(&ctx, &cleaner, &selected, keep_going).await;
    print_reports(&outcome.reports, report)?;
    outcome.into_result()
}

/// What happened to each table of a run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub total: usize,
    pub reports: Vec<CleanReport>,
    pub failures: Vec<(String, anyhow::Error)>,
    pub skipped: Vec<String>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ok when every table was cleaned; otherwise the first failure, wrapped
    /// with a summary of the run.
    pub fn into_result(mut self) -> Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }

        let failed: Vec<String> = self.failures.iter().map(|(name, _)| name.clone()).collect();
        let (_, first) = self.failures.remove(0);
        Err(first.context(format!(
            "{} of {} tables failed ({})",
            failed.len(),
            self.total,
            failed.join(", ")
        )))
    }
}

/// Cleans tables one after another. Stops at the first failure unless
/// `keep_going` is set.
pub async fn clean_tables(
    ctx: &SessionContext,
    cleaner: &TableCleaner,
    tables: &[&TableConfig],
    keep_going: bool,
) -> RunOutcome {
    let mut outcome = RunOutcome {
        total: tables.len(),
        ..RunOutcome::default()
    };

    for (idx, table) in tables.iter().enumerate() {
        match cleaner.clean(ctx, table).await {
            Ok(report) => outcome.reports.push(report),
            Err(err) => {
                error!(table = %table.name, error = format!("{err:#}"), "table failed");
                outcome.failures.push((table.name.clone(), err));

                if !keep_going {
                    outcome.skipped = tables[idx + 1..]
                        .iter()
                        .map(|t| t.name.clone())
                        .collect();
                    break;
                }
            }
        }
    }

    if !outcome.skipped.is_empty() {
        warn!(tables = ?outcome.skipped, "skipped after failure");
    }
    info!(
        succeeded = outcome.reports.len(),
        failed = outcome.failures.len(),
        skipped = outcome.skipped.len(),
        "run finished"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::CleanError,
        utils::test_data::{TestLanding, csv_text},
    };

    fn three_tables() -> Catalog {
        Catalog {
            tables: vec![
                TableConfig::new("customers", "Customers.csv", "Customers", &["CustomerID"]),
                TableConfig::new("stores", "Stores.csv", "Stores", &["StoreID"]),
                TableConfig::new("agents", "Agents.csv", "Agents", &["AgentID"]),
            ],
        }
    }

    fn landing_without_stores() -> TestLanding {
        let landing = TestLanding::new();
        landing.write_source("Customers.csv", &csv_text("CustomerID", &["1"]));
        landing.write_source("Agents.csv", &csv_text("AgentID", &["7"]));
        landing
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let landing = landing_without_stores();
        let catalog = three_tables();
        let cleaner = TableCleaner::new(CleanOptions::new(
            landing.source_root(),
            landing.destination_root(),
        ));

        let outcome = clean_tables(
            &SessionContext::new(),
            &cleaner,
            &catalog.select(&[]).unwrap(),
            false,
        )
        .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.failures[0].0, "stores");
        assert_eq!(outcome.skipped, vec!["agents"]);
        assert!(!landing.output_dir("Agents").exists());

        let err = outcome.into_result().unwrap_err();
        assert!(err.to_string().contains("1 of 3 tables failed (stores)"));
        assert!(matches!(
            err.downcast_ref::<CleanError>(),
            Some(CleanError::SourceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_keep_going_attempts_every_table() {
        let landing = landing_without_stores();
        let catalog = three_tables();
        let cleaner = TableCleaner::new(CleanOptions::new(
            landing.source_root(),
            landing.destination_root(),
        ));

        let outcome = clean_tables(
            &SessionContext::new(),
            &cleaner,
            &catalog.select(&[]).unwrap(),
            true,
        )
        .await;

        assert_eq!(outcome.reports.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.skipped.is_empty());
        assert!(landing.output_dir("Agents").exists());
    }

    #[tokio::test]
    async fn test_all_tables_succeed() {
        let landing = landing_without_stores();
        landing.write_source("Stores.csv", &csv_text("StoreID", &["3"]));
        let catalog = three_tables();
        let cleaner = TableCleaner::new(CleanOptions::new(
            landing.source_root(),
            landing.destination_root(),
        ));

        let outcome = clean_tables(
            &SessionContext::new(),
            &cleaner,
            &catalog.select(&[]).unwrap(),
            false,
        )
        .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.reports.len(), 3);
        outcome.into_result().unwrap();
    }
}
