use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::columns::{normalize_column_name, DATABASES_PRISM, DECOY, REQUIRED_DATA_COLUMNS, SEQUENCE, SOURCE_FILE};
use super::compression::open_reader;
use super::error::LoaderError;
use super::{Table, Value};

/// One identification table to load, with an optional provenance label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Path of the (optionally gzipped) delimited file
    pub path: PathBuf,
    /// Provenance label; derived from the file name when absent
    pub label: Option<String>,
}

impl InputFile {
    /// Input without an explicit label.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            label: None,
        }
    }

    /// Input with an explicit label.
    pub fn with_label(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: Some(label.into()),
        }
    }

    /// Explicit label or the one derived from the file name.
    pub fn resolved_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| derive_label(&self.path))
    }

    /// Pair files with explicit labels.
    ///
    /// An empty label list derives every label from its file name; otherwise
    /// there must be exactly one label per file.
    pub fn pair(paths: Vec<PathBuf>, labels: Vec<String>) -> Result<Vec<InputFile>, LoaderError> {
        if paths.is_empty() {
            return Err(LoaderError::NoInputs);
        }
        if labels.is_empty() {
            return Ok(paths.into_iter().map(InputFile::new).collect());
        }
        if labels.len() != paths.len() {
            return Err(LoaderError::LabelCountMismatch {
                labels: labels.len(),
                files: paths.len(),
            });
        }
        Ok(paths
            .into_iter()
            .zip(labels)
            .map(|(path, label)| InputFile::with_label(path, label))
            .collect())
    }
}

/// Provenance label of a file: its name without directory, truncated at the
/// first `.` (`out/prio1.runA.csv.gz` -> `prio1`).
pub fn derive_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.find('.') {
        Some(pos) => name[..pos].to_string(),
        None => name,
    }
}

/// Settings for reading identification tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Field delimiter
    pub delimiter: u8,
    /// Drop rows flagged as decoys
    pub drop_decoys: bool,
    /// Value of the `Decoy` column marking a decoy (compared case-insensitively)
    pub decoy_sentinel: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            drop_decoys: true,
            decoy_sentinel: "true".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Parse a delimiter given on the command line or in a config file.
    ///
    /// Accepts a single ASCII character as well as the spellings `\t`, `tab`,
    /// `comma` and `semicolon`.
    pub fn parse_delimiter(raw: &str) -> Result<u8, LoaderError> {
        match raw {
            "\\t" | "tab" | "TAB" => Ok(b'\t'),
            "comma" => Ok(b','),
            "semicolon" => Ok(b';'),
            s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
            s => Err(LoaderError::InvalidDelimiter(s.to_string())),
        }
    }
}

/// Row accounting of a load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Number of files read
    pub files: usize,
    /// Rows kept in the union
    pub rows: usize,
    /// Rows dropped as decoys
    pub decoys_dropped: usize,
    /// Rows dropped for an empty Sequence or Source_File
    pub malformed_dropped: usize,
}

/// Reads identification tables into one normalized union table.
#[derive(Debug)]
pub struct TableLoader {
    config: LoaderConfig,
    table: Table,
    /// normalized column name -> original header it came from
    origins: HashMap<String, String>,
    summary: LoadSummary,
}

impl TableLoader {
    /// Create a loader with the given settings.
    pub fn new(config: LoaderConfig) -> Self {
        let mut table = Table::default();
        table.ensure_column(DATABASES_PRISM);
        Self {
            config,
            table,
            origins: HashMap::new(),
            summary: LoadSummary::default(),
        }
    }

    /// Load and union all inputs.
    pub fn load(mut self, inputs: &[InputFile]) -> Result<(Table, LoadSummary), LoaderError> {
        if inputs.is_empty() {
            return Err(LoaderError::NoInputs);
        }
        for input in inputs {
            self.load_file(input)?;
        }
        self.summary.rows = self.table.len();
        info!(
            "Loaded {} rows with {} columns from {} files",
            self.summary.rows,
            self.table.columns().len(),
            self.summary.files
        );
        if self.summary.decoys_dropped > 0 {
            info!("Dropped {} decoy rows", self.summary.decoys_dropped);
        }
        if self.summary.malformed_dropped > 0 {
            warn!(
                "Dropped {} rows without {} or {}",
                self.summary.malformed_dropped, SEQUENCE, SOURCE_FILE
            );
        }
        Ok((self.table, self.summary))
    }

    fn load_file(&mut self, input: &InputFile) -> Result<(), LoaderError> {
        let path = input.path.as_path();
        if !path.exists() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }
        let label = input.resolved_label();
        let reader = open_reader(path).map_err(|e| LoaderError::io(path, e))?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .quote(b'"')
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| LoaderError::csv(path, e))?
            .iter()
            .map(str::to_string)
            .collect();
        let mapping = self.map_headers(&headers, path)?;

        let find = |column: &str| {
            headers
                .iter()
                .position(|h| normalize_column_name(h) == column)
        };
        let sequence_pos = find(SEQUENCE);
        let source_pos = find(SOURCE_FILE);
        let decoy_pos = if self.config.drop_decoys { find(DECOY) } else { None };
        let label_pos = self.table.ensure_column(DATABASES_PRISM);

        let mut kept = 0usize;
        for record in csv_reader.records() {
            let record = record.map_err(|e| LoaderError::csv(path, e))?;

            if let Some(pos) = decoy_pos {
                let flag = record.get(pos).unwrap_or_default().trim();
                if flag.eq_ignore_ascii_case(&self.config.decoy_sentinel) {
                    self.summary.decoys_dropped += 1;
                    continue;
                }
            }

            let is_blank = |pos: Option<usize>| {
                pos.and_then(|p| record.get(p))
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            };
            if is_blank(sequence_pos) || is_blank(source_pos) {
                self.summary.malformed_dropped += 1;
                continue;
            }

            let mut row = vec![Value::Null; self.table.columns().len()];
            for (i, field) in record.iter().enumerate() {
                let Some(Some(target)) = mapping.get(i) else {
                    continue;
                };
                row[*target] = if Some(i) == sequence_pos || Some(i) == source_pos {
                    Value::text(field.trim())
                } else {
                    Value::parse(field)
                };
            }
            row[label_pos] = Value::Text(label.clone());
            self.table.push_row(row);
            kept += 1;
        }

        self.summary.files += 1;
        info!("Read {} rows from {} (label {})", kept, path.display(), label);
        Ok(())
    }

    /// Map the headers of one file onto union columns, rejecting collisions.
    ///
    /// Returns, per header position, the union column it fills; `None` for the
    /// provenance column, which is always overwritten by the file label.
    fn map_headers(&mut self, headers: &[String], path: &Path) -> Result<Vec<Option<usize>>, LoaderError> {
        let mut seen_in_file: HashMap<String, &str> = HashMap::new();
        let mut mapping = Vec::with_capacity(headers.len());

        for (i, header) in headers.iter().enumerate() {
            let mut normalized = normalize_column_name(header);
            if normalized.is_empty() {
                normalized = format!("Unnamed_{}", i);
            }

            if let Some(first) = seen_in_file.insert(normalized.clone(), header) {
                return Err(LoaderError::ColumnCollision {
                    normalized,
                    first: first.to_string(),
                    second: header.clone(),
                });
            }
            match self.origins.get(&normalized) {
                Some(first) if first != header => {
                    return Err(LoaderError::ColumnCollision {
                        normalized,
                        first: first.clone(),
                        second: header.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    self.origins.insert(normalized.clone(), header.clone());
                }
            }

            if normalized == DATABASES_PRISM {
                debug!("Overwriting {} column of {}", DATABASES_PRISM, path.display());
                mapping.push(None);
                continue;
            }
            mapping.push(Some(self.table.ensure_column(&normalized)));
        }

        for required in REQUIRED_DATA_COLUMNS {
            if !seen_in_file.contains_key(required) {
                return Err(LoaderError::MissingColumn {
                    path: path.to_path_buf(),
                    column: required.to_string(),
                });
            }
        }

        Ok(mapping)
    }
}
