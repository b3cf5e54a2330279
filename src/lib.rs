pub mod cleaner;
pub mod commands;
pub mod error;
pub mod operations;
pub mod pipeline;
pub mod sinks;
pub mod sources;
pub mod tables;
pub mod utils;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::ValueHint};
use std::{
    fmt::{self, Formatter},
    path::PathBuf,
};

/// Parse a usize that must be at least 1.
fn parse_at_least_one(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    if n == 0 {
        Err("value must be at least 1".into())
    } else {
        Ok(n)
    }
}

/// Parse a single-byte field delimiter. Accepts `\t` and `tab` for tabs.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    if matches!(s, "\\t" | "tab") {
        return Ok(b'\t');
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '\n' && c != '\r' && c != '"' => Ok(c as u8),
        (Some(_), None) => Err(format!("'{s}' cannot be used as a delimiter")),
        _ => Err(format!(
            "delimiter must be a single ASCII character, got '{s}'"
        )),
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Maximum worker threads for the tokio async runtime.
    ///
    /// Defaults to the number of CPU cores.
    #[arg(long, short = 't', global = true, value_parser = parse_at_least_one)]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean every table in the catalog from the landing zone into the curated zone.
    ///
    /// Examples:
    ///   # All nine built-in tables
    ///   curator run --source-root landing/ --destination-root curated/
    ///
    ///   # Just two of them, carrying on past failures
    ///   curator run --source-root landing/ --destination-root curated/ \
    ///     --table customers --table stores --keep-going
    ///
    ///   # Tables declared in a manifest
    ///   curator run --source-root landing/ --destination-root curated/ --manifest tables.json
    #[command(verbatim_doc_comment)]
    Run(RunCommand),

    /// Clean a single CSV file.
    ///
    /// Examples:
    ///   # Directory output (part-00000.csv + _SUCCESS)
    ///   curator clean --from Orders.csv --to curated/Orders --key OrderID --timestamp PlacedAt
    ///
    ///   # Single-file output
    ///   curator clean --from Orders.csv --to orders.csv --key OrderID,LineNo
    #[command(verbatim_doc_comment)]
    Clean(CleanCommand),

    /// List the tables a run would process.
    Tables(TablesCommand),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[value(rename_all = "lowercase")]
pub enum ReportFormat {
    None,
    #[default]
    Text,
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::None => write!(f, "none"),
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[value(rename_all = "lowercase")]
pub enum ListFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for ListFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ListFormat::Text => write!(f, "text"),
            ListFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug)]
pub struct RunCommand {
    /// Directory holding the raw CSV files.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub source_root: PathBuf,

    /// Directory the curated tables are written under.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub destination_root: PathBuf,

    /// JSON manifest declaring the tables. Defaults to the built-in customer-360 catalog.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub manifest: Option<PathBuf>,

    /// Only clean these tables (repeatable). Tables still run in catalog order.
    #[arg(long = "table", value_name = "NAME")]
    pub tables: Vec<String>,

    /// Keep cleaning the remaining tables after one fails.
    #[arg(long, default_value_t = false)]
    pub keep_going: bool,

    /// Field delimiter for both reading and writing.
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Number of DataFusion partitions used while cleaning.
    #[arg(long, value_parser = parse_at_least_one)]
    pub target_partitions: Option<usize>,

    /// How to report what was written.
    #[arg(long, value_enum, default_value_t)]
    pub report: ReportFormat,
}

impl Default for RunCommand {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            destination_root: PathBuf::new(),
            manifest: None,
            tables: Vec::new(),
            keep_going: false,
            delimiter: b',',
            target_partitions: None,
            report: ReportFormat::None,
        }
    }
}

#[derive(Args, Debug)]
pub struct CleanCommand {
    /// Raw CSV file to clean.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub from: PathBuf,

    /// Output location. A path ending in `.csv` is written as a single file,
    /// anything else as a directory.
    #[arg(long, value_hint = ValueHint::AnyPath)]
    pub to: PathBuf,

    /// Column(s) every kept row must have (repeatable, or comma-separated).
    #[arg(long = "key", value_name = "COL[,COL...]", required = true)]
    pub keys: Vec<String>,

    /// Column(s) to parse as timestamps (repeatable, or comma-separated).
    #[arg(long = "timestamp", value_name = "COL[,COL...]")]
    pub timestamps: Vec<String>,

    /// Table name used in logs and the report. Defaults to the source file stem.
    #[arg(long)]
    pub name: Option<String>,

    /// Field delimiter for both reading and writing.
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Number of DataFusion partitions used while cleaning.
    #[arg(long, value_parser = parse_at_least_one)]
    pub target_partitions: Option<usize>,

    /// How to report what was written.
    #[arg(long, value_enum, default_value_t)]
    pub report: ReportFormat,
}

impl Default for CleanCommand {
    fn default() -> Self {
        Self {
            from: PathBuf::new(),
            to: PathBuf::new(),
            keys: Vec::new(),
            timestamps: Vec::new(),
            name: None,
            delimiter: b',',
            target_partitions: None,
            report: ReportFormat::None,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct TablesCommand {
    /// JSON manifest declaring the tables. Defaults to the built-in customer-360 catalog.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub manifest: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub format: ListFormat,
}
