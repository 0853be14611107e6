//! End-to-end combine run: load, join, resolve, write.
//!
//! All fatal conditions (bad configuration, missing files, column clashes,
//! incomplete sample description) surface from [`prepare`] before any peptide
//! is resolved, and the output file only appears once fully written.

use std::fmt;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::CombineError;
use crate::output::{write_table, OutputSchema, OutputStats, DEFAULT_OUTPUT};
use crate::resolver::{PeptideResolver, ResolverConfig};
use crate::store::{MemoryStore, RelationalStore, SqliteStore};
use crate::table::{InputFile, LoadSummary, LoaderConfig, SampleDescription, TableLoader};

/// Storage backend of a run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Hash-indexed in-memory store
    #[default]
    Memory,
    /// SQLite store; transient when no path is given
    Sqlite {
        /// Database file, replaced if it exists
        path: Option<PathBuf>,
    },
}

impl StoreBackend {
    /// Open an empty store of this kind.
    pub fn open(&self) -> Result<Box<dyn RelationalStore>, CombineError> {
        let store: Box<dyn RelationalStore> = match self {
            StoreBackend::Memory => Box::new(MemoryStore::new()),
            StoreBackend::Sqlite { path: None } => Box::new(SqliteStore::open_in_memory()?),
            StoreBackend::Sqlite { path: Some(path) } => Box::new(SqliteStore::open(path)?),
        };
        Ok(store)
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => f.write_str("memory"),
            StoreBackend::Sqlite { path: None } => f.write_str("sqlite (in-memory)"),
            StoreBackend::Sqlite { path: Some(path) } => write!(f, "sqlite ({})", path.display()),
        }
    }
}

/// Settings of a combine run
#[derive(Debug, Clone)]
pub struct CombineConfig {
    /// Identification tables with their provenance labels
    pub inputs: Vec<InputFile>,
    /// Sample description file
    pub description: PathBuf,
    /// Table reading settings
    pub loader: LoaderConfig,
    /// Per-peptide resolution settings
    pub resolver: ResolverConfig,
    /// Store backend
    pub backend: StoreBackend,
    /// Output file; gzip-compressed when it ends in `.gz`
    pub output: PathBuf,
}

impl CombineConfig {
    /// Configuration with default settings.
    pub fn new(inputs: Vec<InputFile>, description: impl Into<PathBuf>) -> Self {
        Self {
            inputs,
            description: description.into(),
            loader: LoaderConfig::default(),
            resolver: ResolverConfig::default(),
            backend: StoreBackend::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }

    /// Check settings that do not require reading any file.
    pub fn check(&self) -> Result<(), CombineError> {
        if let Some(q) = self.resolver.q_threshold {
            if !q.is_finite() {
                return Err(CombineError::Config(format!("Q threshold must be a finite number, got {}", q)));
            }
        }
        if !self.resolver.binding_rank_threshold.is_finite() {
            return Err(CombineError::Config(format!(
                "binding rank threshold must be a finite number, got {}",
                self.resolver.binding_rank_threshold
            )));
        }
        if let Some(parent) = output_dir(&self.output) {
            if !parent.is_dir() {
                return Err(CombineError::Config(format!(
                    "output directory does not exist: {}",
                    parent.display()
                )));
            }
        }
        Ok(())
    }
}

fn output_dir(output: &Path) -> Option<&Path> {
    output.parent().filter(|p| !p.as_os_str().is_empty())
}

/// A loaded and joined store ready for resolution.
pub struct Prepared {
    /// Store holding `data`, `description` and `ext_data`
    pub store: Box<dyn RelationalStore>,
    /// Output layout
    pub schema: OutputSchema,
    /// Loader accounting
    pub load: LoadSummary,
    /// Rows of `ext_data`
    pub joined_rows: usize,
}

/// Load inputs, join them with the sample description and derive the output
/// layout. Every fatal error of a run is raised here.
pub fn prepare(config: &CombineConfig) -> Result<Prepared, CombineError> {
    config.check()?;
    let description = SampleDescription::from_tsv_file(&config.description)?;
    info!(
        "Read {} sample description rows from {}",
        description.len(),
        config.description.display()
    );

    let (table, load) = TableLoader::new(config.loader.clone()).load(&config.inputs)?;

    let mut store = config.backend.open()?;
    info!("Using {} store", config.backend);
    store.load(table, &description)?;
    let joined_rows = store.build_ext_data()?;

    let ext_schema = store.ext_schema()?;
    let schema = OutputSchema::for_ext_schema(&ext_schema, store.sample_layout()?)?;
    info!(
        "Output has {} columns ({} allele columns, {} samples, {} intensity columns)",
        schema.len(),
        schema.allele_columns().len(),
        schema.layout().len(),
        schema.layout().cell_count()
    );

    Ok(Prepared {
        store,
        schema,
        load,
        joined_rows,
    })
}

/// Statistics of a finished combine run
#[derive(Debug, Clone)]
pub struct CombineStats {
    /// Loader accounting
    pub load: LoadSummary,
    /// Rows of `ext_data`
    pub joined_rows: usize,
    /// Distinct peptide sequences
    pub peptides: usize,
    /// Peptides written to the output
    pub peptides_written: usize,
    /// Peptides dropped by the quality gate
    pub peptides_dropped: usize,
    /// Output file statistics
    pub output: OutputStats,
}

impl fmt::Display for CombineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files read: {}", self.load.files)?;
        writeln!(f, "Identifications loaded: {}", self.load.rows)?;
        if self.load.decoys_dropped > 0 {
            writeln!(f, "Decoys dropped: {}", self.load.decoys_dropped)?;
        }
        if self.load.malformed_dropped > 0 {
            writeln!(f, "Malformed rows dropped: {}", self.load.malformed_dropped)?;
        }
        writeln!(f, "Distinct peptides: {}", self.peptides)?;
        writeln!(f, "Peptides written: {}", self.peptides_written)?;
        writeln!(f, "Peptides below quality threshold: {}", self.peptides_dropped)?;
        write!(
            f,
            "Output: {} columns, {} bytes{}",
            self.output.columns,
            self.output.file_size_bytes,
            if self.output.compressed { " (gzip)" } else { "" }
        )
    }
}

/// Run a complete combine pass.
pub fn run(config: &CombineConfig) -> Result<CombineStats, CombineError> {
    let prepared = prepare(config)?;

    let groups = prepared.store.peptide_groups()?;
    info!("Resolving {} peptides", groups.len());
    let resolution = PeptideResolver::new(config.resolver, &prepared.schema).resolve_all(&groups);

    let output = write_table(&config.output, &prepared.schema, &resolution.rows)?;

    Ok(CombineStats {
        load: prepared.load,
        joined_rows: prepared.joined_rows,
        peptides: groups.len(),
        peptides_written: resolution.rows.len(),
        peptides_dropped: resolution.dropped,
        output,
    })
}
