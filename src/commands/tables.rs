use anyhow::Result;
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};

use crate::{ListFormat, TablesCommand, tables::Catalog};

pub fn run(args: TablesCommand) -> Result<()> {
    let catalog = Catalog::load(args.manifest.as_deref())?;
    println!("{}", render(&catalog, args.format)?);
    Ok(())
}

fn render(catalog: &Catalog, format: ListFormat) -> Result<String> {
    match format {
        ListFormat::Json => Ok(serde_json::to_string_pretty(catalog)?),
        ListFormat::Text => {
            let mut builder = Builder::default();
            builder.push_record(
                ["Table", "Source", "Destination", "Key Columns", "Timestamp Columns"]
                    .iter()
                    .map(|h| h.bold().to_string()),
            );
            for table in &catalog.tables {
                builder.push_record([
                    table.name.green().to_string(),
                    table.source_file.clone(),
                    table.destination_path.clone(),
                    table.key_columns.join(", "),
                    table.timestamp_columns.join(", "),
                ]);
            }
            Ok(builder.build().with(Style::rounded()).to_string())
        }
    }
}
