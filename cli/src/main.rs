//! `bqxfer` command line tool.
//!
//! `bqxfer load` uploads a local file into a table, `bqxfer dump` writes the
//! result of a query to a local file.

mod args;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use bqxfer::loader::LoadOptions;

use crate::args::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.global.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Load(args) => {
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupted, stopping the load");
                    on_signal.cancel();
                }
            });
            let options = LoadOptions {
                cancel,
                ..Default::default()
            };
            let config = args.into_config(&cli.global, options);
            let table = format!("{}:{}.{}", config.project_id, config.dataset_id, config.table_id);
            let job = bqxfer::loader::load(config)
                .await
                .with_context(|| format!("load into {table} failed"))?;
            tracing::info!(job = %job, "loaded {table}");
        }
        Commands::Dump(args) => {
            let config = args.into_config(&cli.global);
            let summary = bqxfer::dumper::dump(config).await.context("dump failed")?;
            tracing::info!(
                rows = summary.total_rows,
                output = %summary.output_path.display(),
                "dump finished"
            );
        }
    }
    Ok(())
}
