use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use khaload::convert::{convert_orders, fix_feedback};
use khaload::{Backend, load_config, run};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "khaload",
    version,
    about = "Loads the KhaBench dataset into its benchmark databases"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Document,
    Graph,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Document => Backend::Document,
            BackendArg::Graph => Backend::Graph,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Clear the target store and run every loader
    Load {
        #[arg(long, value_enum)]
        backend: BackendArg,
        /// YAML, TOML, JSON or RON settings; defaults apply without one
        #[arg(long, env = "KHALOAD_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Rewrite JSON-lines orders as invoice XML
    ConvertOrders {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Drop feedback rows without customer or product and fill empty reviews
    FixFeedback {
        #[arg(long)]
        input: PathBuf,
        /// Defaults to rewriting the input
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Load { backend, config } => {
            let config = load_config(config.as_deref()).context("invalid settings")?;
            let summary = run(backend.into(), &config)?;
            if summary.is_clean() {
                info!("All {} loaders finished cleanly.", summary.outcomes.len());
                Ok(ExitCode::SUCCESS)
            } else {
                error!(
                    "Load finished with {} failed loaders, see the log for rejected batches.",
                    summary.failures.len()
                );
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::ConvertOrders { input, output } => {
            convert_orders(&input, &output)
                .with_context(|| format!("could not convert {input:?}"))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::FixFeedback { input, output } => {
            let output = output.unwrap_or_else(|| input.clone());
            fix_feedback(&input, &output).with_context(|| format!("could not fix {input:?}"))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
