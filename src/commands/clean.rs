use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::{
    CleanCommand,
    cleaner::{CleanOptions, TableCleaner},
    commands::report::print_reports,
    pipeline::build_session_context,
    tables::TableConfig,
    utils::columns::split_column_list,
};

pub async fn run(args: CleanCommand) -> Result<()> {
    let (table, destination_root) = table_config(&args)?;

    let ctx = build_session_context(args.target_partitions);
    let cleaner = TableCleaner::new(
        CleanOptions::new(PathBuf::new(), destination_root).with_delimiter(args.delimiter),
    );

    let report = cleaner.clean(&ctx, &table).await?;
    print_reports(&[report], args.report)
}

/// The table described by the arguments, plus the root its destination is
/// resolved against. `--to` is split into its parent and its last component
/// so the cleaner only ever rewrites that last component.
fn table_config(args: &CleanCommand) -> Result<(TableConfig, PathBuf)> {
    let key_columns = flatten_column_lists(&args.keys);
    if key_columns.is_empty() {
        bail!("at least one --key column is required");
    }

    let Some(destination_name) = args.to.file_name() else {
        bail!(
            "--to '{}' must name a file or directory to write",
            args.to.display()
        );
    };
    let destination_root = args
        .to
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let name = args.name.clone().unwrap_or_else(|| {
        args.from
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "table".to_string())
    });

    let table = TableConfig {
        name,
        source_file: args.from.to_string_lossy().to_string(),
        destination_path: destination_name.to_string_lossy().to_string(),
        key_columns,
        timestamp_columns: flatten_column_lists(&args.timestamps),
    };
    table.validate()?;
    Ok((table, destination_root))
}

// --key may be repeated and each occurrence may itself be a comma-separated list
fn flatten_column_lists(lists: &[String]) -> Vec<String> {
    split_column_list(&lists.join(","))
}
