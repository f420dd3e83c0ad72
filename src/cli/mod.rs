use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use dustspec::catalog::EventCatalog;
use dustspec::clock;

mod args;
mod batch;
mod event;
mod info;
mod ingest;
mod quiet;

mod config;
mod preset;

pub use args::PipelineArgs;
pub use config::Config;
pub use preset::Preset;

/// dustspec - Spectral signatures of dust devil pressure events
#[derive(Parser)]
#[command(name = "dustspec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load paths and pipeline settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Event catalog CSV
    #[arg(long, value_name = "FILE", global = true)]
    catalog: Option<PathBuf>,

    /// Directory of ps_calib_NNNN.csv files
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Which population a batch runs over. Exactly one must be given.
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// Events with a pressure drop below this value (Pa, negative)
    #[arg(long, value_name = "PA", allow_hyphen_values = true)]
    pub pressure_drop: Option<f64>,

    /// Events warmer than this (K); requires --wind
    #[arg(long, value_name = "K", requires = "wind")]
    pub temperature: Option<f64>,

    /// Events calmer than this (m/s); requires --temperature
    #[arg(long, value_name = "M/S", requires = "temperature")]
    pub wind: Option<f64>,

    /// Events in the 30-degree season bin containing this solar longitude
    #[arg(long, value_name = "LS")]
    pub season: Option<u16>,

    /// Explicit event IDs
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub ids: Option<Vec<u32>>,

    /// Eventless sols, windowed at this local hour
    #[arg(long, value_name = "HOUR")]
    pub quiet_hour: Option<u32>,

    /// With --quiet-hour, use every eventless sol instead of the curated list
    #[arg(long, requires = "quiet_hour")]
    pub all_quiet_sols: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a raw instrument table into a per-sol pressure file
    Ingest {
        /// Raw instrument CSV
        #[arg(value_name = "RAW")]
        raw: PathBuf,

        /// Output path (defaults to ps_calib_NNNN.csv next to the input)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Analyse a single cataloged event
    Event {
        /// Event ID
        #[arg(value_name = "ID")]
        id: u32,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Analyse a single eventless sol at a fixed local hour
    Quiet {
        /// Sol number
        #[arg(value_name = "SOL", value_parser = clap::value_parser!(u32).range(..=i64::from(clock::MAX_SOL)))]
        sol: u32,

        /// Local hour the window starts at
        #[arg(long, default_value_t = 12)]
        hour: u32,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Aggregate a population of events or quiet sols
    Batch {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Also write one CSV per contributing case
        #[arg(long)]
        per_case: bool,
    },

    /// Summarise the event catalog
    Info,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

/// Paths and file configuration shared by every command.
pub struct Session {
    pub file: Option<Config>,
    catalog: Option<PathBuf>,
    data_dir: Option<PathBuf>,
}

impl Session {
    fn new(cli_catalog: Option<PathBuf>, cli_data_dir: Option<PathBuf>, config: Option<&Path>) -> Result<Self> {
        let file = Config::load_optional(config)?;
        let catalog = cli_catalog.or_else(|| file.as_ref().and_then(|f| f.paths.catalog.clone()));
        let data_dir = cli_data_dir.or_else(|| file.as_ref().and_then(|f| f.paths.data_dir.clone()));
        Ok(Self {
            file,
            catalog,
            data_dir,
        })
    }

    /// Load the catalog, failing when no path was configured.
    pub fn require_catalog(&self) -> Result<EventCatalog> {
        match &self.catalog {
            Some(path) => EventCatalog::from_path(path)
                .with_context(|| format!("Failed to load catalog: {}", path.display())),
            None => bail!("No catalog given; pass --catalog or set paths.catalog in the config file"),
        }
    }

    /// Load the catalog when a path was configured.
    pub fn optional_catalog(&self) -> Result<Option<EventCatalog>> {
        if self.catalog.is_some() {
            self.require_catalog().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Data directory, defaulting to the working directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let session = Session::new(cli.catalog, cli.data_dir, cli.config.as_deref())?;
    match cli.command {
        Commands::Ingest { raw, output } => ingest::run(raw, output),
        Commands::Event { id, pipeline } => event::run(&session, id, &pipeline),
        Commands::Quiet { sol, hour, pipeline } => quiet::run(&session, sol, hour, &pipeline),
        Commands::Batch {
            selection,
            pipeline,
            per_case,
        } => batch::run(&session, &selection, &pipeline, per_case),
        Commands::Info => info::run(&session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_batch_flags() {
        let cli = Cli::try_parse_from([
            "dustspec",
            "--catalog",
            "catalog.csv",
            "batch",
            "--pressure-drop",
            "-2.5",
            "--preset",
            "near-moving",
            "--per-case",
        ])
        .unwrap();
        match cli.command {
            Commands::Batch {
                selection, per_case, ..
            } => {
                assert_eq!(selection.pressure_drop, Some(-2.5));
                assert!(per_case);
            }
            _ => panic!("expected batch"),
        }
        assert_eq!(cli.catalog, Some(PathBuf::from("catalog.csv")));
    }

    #[test]
    fn test_quiet_sol_is_bounded() {
        assert!(Cli::try_parse_from(["dustspec", "quiet", "4294967295"]).is_err());
        assert!(Cli::try_parse_from(["dustspec", "quiet", "100000"]).is_err());
        assert!(Cli::try_parse_from(["dustspec", "quiet", "99999", "--hour", "9"]).is_ok());
    }

    #[test]
    fn test_temperature_requires_wind() {
        let result = Cli::try_parse_from(["dustspec", "batch", "--temperature", "250"]);
        assert!(result.is_err());
    }
}
