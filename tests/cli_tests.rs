use assert_cmd::Command;
use curator::utils::test_data::{CsvTable, TestLanding, csv_text, row};
use predicates::prelude::*;

fn curator() -> Command {
    Command::cargo_bin("curator").unwrap()
}

#[test]
fn test_help_command() {
    curator()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("tables"));
}

#[test]
fn test_version_command() {
    curator()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("curator"));
}

#[test]
fn test_run_requires_roots() {
    curator()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--source-root"));
}

#[test]
fn test_tables_lists_builtin_catalog() {
    curator()
        .args(["tables", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"loyalty_transactions\""))
        .stdout(predicate::str::contains("CustomerServiceInteractions.csv"));
}

#[test]
fn test_clean_single_file() {
    let landing = TestLanding::new();
    let source = landing.write_source(
        "OnlineTransactions.csv",
        &csv_text(
            "OrderID, DateTime",
            &["100,2024-01-01 10:00:00", ",2024-01-02 11:00:00"],
        ),
    );
    let destination = landing.output_dir("OnlineTransactions");

    curator()
        .arg("clean")
        .arg("--from")
        .arg(&source)
        .arg("--to")
        .arg(&destination)
        .args(["--key", "OrderID", "--timestamp", "DateTime", "--report", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rows_written\": 1"));

    let out = CsvTable::read_dir(&destination);
    assert_eq!(
        out.rows,
        vec![row(&[Some("100"), Some("2024-01-01 10:00:00")])]
    );
}

#[test]
fn test_run_reports_failure_exit_code() {
    let landing = TestLanding::new();
    landing.write_source("Customers.csv", &csv_text("CustomerID,Name", &["1,Alice"]));

    curator()
        .arg("run")
        .arg("--source-root")
        .arg(landing.source_root())
        .arg("--destination-root")
        .arg(landing.destination_root())
        .args(["--table", "customers", "--table", "stores"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 tables failed (stores)"));

    assert!(landing.output_dir("Customers").join("_SUCCESS").exists());
    assert!(!landing.output_dir("Stores").exists());
}

#[test]
fn test_run_text_report() {
    let landing = TestLanding::new();
    landing.write_source("Stores.csv", &csv_text("Store ID,City", &["1,Austin", "1,Austin"]));

    curator()
        .arg("run")
        .arg("--source-root")
        .arg(landing.source_root())
        .arg("--destination-root")
        .arg(landing.destination_root())
        .arg("--manifest")
        .arg(landing.write_file(
            "tables.json",
            r#"{"tables": [{"name": "stores", "source_file": "Stores.csv", "destination_path": "Stores", "key_columns": ["Store_ID"]}]}"#,
        ))
        .assert()
        .success()
        .stdout(predicate::str::contains("stores"))
        .stdout(predicate::str::contains("Rows Written"));
}
