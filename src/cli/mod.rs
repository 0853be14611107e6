use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use std::path::PathBuf;

use prism_combine::combine::{CombineConfig, StoreBackend};
use prism_combine::output::DEFAULT_OUTPUT;
use prism_combine::resolver::ResolverConfig;
use prism_combine::table::{InputFile, LoaderConfig};
use prism_combine::CombineError;

mod combine;
mod discover;
mod info;
mod validate;

mod config;
mod mode;

use config::Config;
pub use mode::Mode;

/// prism-combine - Merge PRISM peptide identifications into one table per peptide
#[derive(Parser)]
#[command(name = "prism-combine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Run mode selecting delimiter and Q filter defaults.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// Tab-delimited input, Q < 0.01
    Fdr,
    /// Comma-delimited input, no Q filter
    Unfiltered,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Fdr => Mode::Fdr,
            ModeArg::Unfiltered => Mode::Unfiltered,
        }
    }
}

/// Store backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreArg {
    /// Hash-indexed tables in memory
    Memory,
    /// SQLite database (on disk with --db)
    Sqlite,
}

/// Options shared by the combine, discover and validate commands.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Tab-delimited sample description (Source_File, Sample_Name, Sample_Replica, Sample_Type)
    #[arg(short = 's', long = "description", value_name = "FILE")]
    description: PathBuf,

    /// Provenance labels, one per input file (defaults to the file name's first token)
    #[arg(short = 'p', long = "labels", value_name = "LABEL", num_args = 1..)]
    labels: Vec<String>,

    /// Input field delimiter (a character, "tab", "comma" or "semicolon")
    #[arg(short = 'd', long, value_name = "DELIM")]
    delimiter: Option<String>,

    /// SQLite database file (implies --store sqlite, replaced if it exists)
    #[arg(long = "db", value_name = "PATH")]
    database: Option<PathBuf>,

    /// Store backend
    #[arg(long, value_enum)]
    store: Option<StoreArg>,

    /// Q-value threshold, or "none" to keep every peptide with a Q value
    #[arg(short = 'q', long = "q-threshold", value_name = "Q|none")]
    q_threshold: Option<String>,

    /// Output file, gzip-compressed when the name ends in .gz
    #[arg(short = 'o', long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Keep decoy identifications
    #[arg(long)]
    keep_decoys: bool,

    /// Decoy column value marking a decoy
    #[arg(long, value_name = "VALUE")]
    decoy_sentinel: Option<String>,

    /// netMHC rank below which an allele counts as a binder
    #[arg(long = "binding-rank", value_name = "RANK")]
    binding_rank_threshold: Option<f64>,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run mode (fdr, unfiltered)
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine identification tables into one row per peptide
    Combine {
        /// Identification tables (gzip optional)
        #[arg(short = 'i', long = "inputs", value_name = "FILES", num_args = 1.., required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Combine every {category}.*.<ext> table found in a directory
    Discover {
        /// Directory holding the identification tables
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// File extension to look for (default: csv)
        #[arg(long = "ext", value_name = "EXT")]
        extension: Option<String>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Check inputs and sample description without writing output
    Validate {
        /// Identification tables (gzip optional)
        #[arg(short = 'i', long = "inputs", value_name = "FILES", num_args = 1.., required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Display a summary of a combined output table
    Info {
        /// Combined table path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
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
    match cli.command {
        Commands::Combine { inputs, run } => combine::run(inputs, run),
        Commands::Discover { dir, extension, run } => discover::run(dir, extension, run),
        Commands::Validate { inputs, run } => validate::run(inputs, run),
        Commands::Info { file } => info::run(file),
    }
}

/// Parse a Q threshold flag: a number or `none`.
fn parse_q_threshold(raw: &str) -> Result<Option<f64>, CombineError> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    raw.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| CombineError::Config(format!("invalid Q threshold '{}': expected a number or \"none\"", raw)))
}

impl RunArgs {
    /// Read the config file named by `--config`, or an empty one.
    fn file_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::from_file(path),
            None => Ok(Config::default()),
        }
    }

    /// Merge mode defaults, config file and flags into a run configuration.
    ///
    /// Flags win over the config file, which wins over the mode.
    fn build(&self, inputs: Vec<InputFile>, file: &Config, default_mode: Mode) -> Result<CombineConfig> {
        let section = &file.combine;

        let mode = match (self.mode, &section.mode) {
            (Some(arg), _) => Mode::from(arg),
            (None, Some(name)) => name.parse::<Mode>().map_err(CombineError::Config)?,
            (None, None) => default_mode,
        };

        let delimiter = match self.delimiter.as_deref().or(section.delimiter.as_deref()) {
            Some(raw) => LoaderConfig::parse_delimiter(raw).map_err(CombineError::from)?,
            None => mode.delimiter(),
        };

        let q_threshold = match (&self.q_threshold, &section.q_threshold) {
            (Some(raw), _) => parse_q_threshold(raw)?,
            (None, Some(setting)) => setting.threshold()?,
            (None, None) => mode.q_threshold(),
        };

        let mut resolver = ResolverConfig {
            q_threshold,
            ..ResolverConfig::default()
        };
        if let Some(rank) = self.binding_rank_threshold.or(section.binding_rank_threshold) {
            resolver.binding_rank_threshold = rank;
        }

        let mut loader = LoaderConfig {
            delimiter,
            drop_decoys: !(self.keep_decoys || section.keep_decoys.unwrap_or(false)),
            ..LoaderConfig::default()
        };
        if let Some(sentinel) = self.decoy_sentinel.clone().or_else(|| section.decoy_sentinel.clone()) {
            loader.decoy_sentinel = sentinel;
        }

        let database = self.database.clone().or_else(|| section.database.clone());
        let store = match (self.store, &section.store) {
            (Some(arg), _) => Some(arg),
            (None, Some(name)) => Some(match name.to_lowercase().as_str() {
                "memory" => StoreArg::Memory,
                "sqlite" => StoreArg::Sqlite,
                other => {
                    return Err(CombineError::Config(format!(
                        "unknown store '{}'. Valid options: memory, sqlite",
                        other
                    ))
                    .into())
                }
            }),
            (None, None) => None,
        };
        let backend = match (store, database) {
            (Some(StoreArg::Memory), Some(path)) => {
                return Err(CombineError::Config(format!(
                    "database {} given with the memory store",
                    path.display()
                ))
                .into())
            }
            (Some(StoreArg::Memory), None) => StoreBackend::Memory,
            (Some(StoreArg::Sqlite), path) | (None, path @ Some(_)) => StoreBackend::Sqlite { path },
            (None, None) => StoreBackend::default(),
        };

        let output = self
            .output
            .clone()
            .or_else(|| section.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        debug!(
            "Mode {}: delimiter {:?}, Q threshold {:?}, store {}",
            mode, delimiter as char, q_threshold, backend
        );

        Ok(CombineConfig {
            inputs,
            description: self.description.clone(),
            loader,
            resolver,
            backend,
            output,
        })
    }
}
