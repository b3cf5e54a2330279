use anyhow::Result;
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};

use crate::{ReportFormat, cleaner::CleanReport};

pub fn print_reports(reports: &[CleanReport], format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::None => {}
        ReportFormat::Text => {
            if reports.is_empty() {
                return Ok(());
            }
            println!("{}", render_text(reports));
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reports)?);
        }
    }
    Ok(())
}

fn render_text(reports: &[CleanReport]) -> String {
    let mut builder = Builder::default();

    let header = ["Table", "Destination", "Columns", "Rows Written"];
    builder.push_record(header.iter().map(|h| h.bold().to_string()));

    for report in reports {
        builder.push_record([
            report.table.green().to_string(),
            report.destination.display().to_string(),
            report.columns.len().to_string(),
            report.rows_written.to_string().cyan().to_string(),
        ]);
    }

    builder.build().with(Style::rounded()).to_string()
}
