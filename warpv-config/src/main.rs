mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use warpv_config::Section;

#[derive(Parser)]
#[command(name = "warpv-config", about = "WARP-V core configurator: derive, validate and export settings")]
#[command(version)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Catalog YAML replacing the built-in parameters and presets
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay edits in order and show the reconciled settings.
    Derive {
        /// Edits such as depth=4 execute_stage=9 depth=6 (key= clears).
        #[arg(required = true)]
        events: Vec<String>,
        /// Print the document JSON instead of the report.
        #[arg(long)]
        json: bool,
    },
    /// Replay edits, validate and write the document JSON.
    Export {
        /// Edits such as depth=4 branch_pred=ideal.
        #[arg(required = true)]
        events: Vec<String>,
        /// Output path for the document.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Validate an exported {general, pipeline} JSON document.
    Validate {
        /// Document to check.
        document: PathBuf,
        /// Also write a JSON report here.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Show the stage assignments of every depth preset.
    Presets,
    /// List catalog parameters.
    Params {
        /// Only list one form section (multi-core, pipeline, components, hazards).
        #[arg(short, long)]
        section: Option<Section>,
    },
    /// Write the default catalog YAML.
    Init {
        /// Destination (defaults to ~/.config/warpv-config/catalog.yaml).
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let produced = match &cli.command {
        Command::Derive { events, json } => cli::derive::run(cli.catalog.as_deref(), events, *json)?,
        Command::Export { events, output } => {
            cli::derive::export(cli.catalog.as_deref(), events, output)?
        }
        Command::Validate { document, report } => {
            cli::validate::run(cli.catalog.as_deref(), document, report.as_deref())?
        }
        Command::Presets => {
            cli::catalog::presets(cli.catalog.as_deref())?;
            true
        }
        Command::Params { section } => {
            cli::catalog::params(cli.catalog.as_deref(), *section)?;
            true
        }
        Command::Init { path } => {
            cli::catalog::init(path.as_deref())?;
            true
        }
    };

    if !produced {
        std::process::exit(1);
    }
    Ok(())
}
