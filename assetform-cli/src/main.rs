//! assetform
//!
//! Command-line host for asset form definitions.
//!
//! # Usage
//!
//! ```bash
//! assetform check forms/allocation.json
//! assetform inspect forms/allocation.json --values draft.json
//! assetform submit forms/allocation.json --values draft.json
//! assetform options forms/allocation.json locationId --values draft.json
//! ```

mod commands;
mod config;
mod error;
mod paths;

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use config::Settings;
use error::CliError;

#[derive(Parser)]
#[command(name = "assetform")]
#[command(version)]
#[command(about = "Check, inspect and submit asset form definitions", long_about = None)]
struct Cli {
    /// Settings file (defaults to config.toml in the platform config dir)
    #[arg(long, env = "ASSETFORM_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a form definition
    Check { form: PathBuf },
    /// Show visibility, gates and option requests for a set of values
    Inspect {
        form: PathBuf,
        #[arg(long)]
        values: Option<PathBuf>,
    },
    /// Validate values and print the submitted snapshot
    Submit {
        form: PathBuf,
        #[arg(long)]
        values: PathBuf,
    },
    /// Fetch the options of a remote field
    Options {
        form: PathBuf,
        field: String,
        #[arg(long)]
        values: Option<PathBuf>,
    },
}

fn init_logging(level: LevelFilter) {
    let Some(path) = paths::prepare_log_file() else {
        return;
    };
    match File::create(&path) {
        Ok(file) => {
            if WriteLogger::init(level, Config::default(), file).is_err() {
                eprintln!("Warning: logger already initialized");
            }
        }
        Err(e) => eprintln!("Warning: cannot create {}: {}", path.display(), e),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = match cli.config.or_else(paths::config_file) {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        settings.level_filter()
    };
    init_logging(level);

    match cli.command {
        Commands::Check { form } => commands::check(&form),
        Commands::Inspect { form, values } => commands::inspect(&form, values.as_deref()),
        Commands::Submit { form, values } => commands::submit(&form, &values),
        Commands::Options {
            form,
            field,
            values,
        } => commands::options(&settings, &form, &field, values.as_deref()).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
