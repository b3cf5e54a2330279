use anyhow::Result;
use clap::Parser;
use curator::{Cli, Commands, commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = cli.threads {
        builder.worker_threads(threads);
    }
    let runtime = builder.build()?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Run(args) => commands::run::run(args).await,
            Commands::Clean(args) => commands::clean::run(args).await,
            Commands::Tables(args) => commands::tables::run(args),
        }
    })
}

// logs go to stderr so reports on stdout stay machine-readable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
