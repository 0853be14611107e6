//! PRISM search categories and discovery of category-tagged result files.
//!
//! The batch tooling names every PRISM result `{category}.{run}.<ext>`; the
//! category token doubles as the provenance label of the file's rows.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{info, warn};

use super::error::LoaderError;
use super::loader::InputFile;

/// Annotation priority orders PRISM can be run with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchCategory {
    /// Frameshift search
    Frameshift,
    /// Extra sequences first
    Prio1,
    /// Extra sequences after CDS
    Prio2,
    /// Extra sequences after ncRNA
    Prio3,
}

impl SearchCategory {
    /// All categories.
    pub const ALL: [SearchCategory; 4] = [
        SearchCategory::Frameshift,
        SearchCategory::Prio1,
        SearchCategory::Prio2,
        SearchCategory::Prio3,
    ];

    /// Token used in file names.
    pub fn name(&self) -> &'static str {
        match self {
            SearchCategory::Frameshift => "frameshift",
            SearchCategory::Prio1 => "prio1",
            SearchCategory::Prio2 => "prio2",
            SearchCategory::Prio3 => "prio3",
        }
    }

    /// Ordered annotation categories PRISM assigns locations from.
    pub fn search_order(&self) -> &'static [&'static str] {
        match self {
            SearchCategory::Frameshift => &[
                "CDS", "UTR5", "OffFrame", "UTR3", "ncRNA", "Frameshift", "Intronic", "Intergenic",
            ],
            SearchCategory::Prio1 => &[
                "Extra", "CDS", "UTR5", "OffFrame", "UTR3", "ncRNA", "Intronic", "Intergenic",
            ],
            SearchCategory::Prio2 => &[
                "CDS", "Extra", "UTR5", "OffFrame", "UTR3", "ncRNA", "Intronic", "Intergenic",
            ],
            SearchCategory::Prio3 => &[
                "CDS", "UTR5", "OffFrame", "UTR3", "ncRNA", "Extra", "Intronic", "Intergenic",
            ],
        }
    }

    fn expected() -> String {
        Self::ALL.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Find all `{category}.*.<extension>` files (optionally gzipped) in a
/// directory, sorted by file name.
///
/// Every matching file must start with a known category token; the token
/// becomes the file's provenance label. Files without a non-empty run token
/// between category and extension (`prio1.csv`) are skipped with a warning.
pub fn discover_inputs(dir: &Path, extension: &str) -> Result<Vec<InputFile>, LoaderError> {
    let extension = extension.trim_start_matches('.');
    let plain_suffix = format!(".{}", extension);
    let gz_suffix = format!(".{}.gz", extension);

    let entries = std::fs::read_dir(dir).map_err(|e| LoaderError::io(dir, e))?;
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoaderError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stem) = name
            .strip_suffix(&gz_suffix)
            .or_else(|| name.strip_suffix(&plain_suffix))
        else {
            continue;
        };
        if has_run_token(stem) {
            paths.push(path);
        } else {
            warn!("Skipping {}: not named {{category}}.{{run}}.{}", path.display(), extension);
        }
    }
    paths.sort();

    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        let category = category_of(&path)?;
        info!(
            "Found {} ({}: {})",
            path.display(),
            category,
            category.search_order().join(",")
        );
        inputs.push(InputFile::with_label(path, category.name()));
    }

    if inputs.is_empty() {
        return Err(LoaderError::NoInputs);
    }
    Ok(inputs)
}

fn has_run_token(stem: &str) -> bool {
    match stem.split_once('.') {
        Some((category, run)) => !category.is_empty() && !run.is_empty(),
        None => false,
    }
}

/// Category encoded in the leading `.`-token of a file name.
pub fn category_of(path: &Path) -> Result<SearchCategory, LoaderError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let token = name.split('.').next().unwrap_or_default();
    token.parse().map_err(|_| LoaderError::UnknownCategory {
        file: path.to_path_buf(),
        token: token.to_string(),
        expected: SearchCategory::expected(),
    })
}
