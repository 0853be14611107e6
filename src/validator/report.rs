use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

use crate::error::{CombineError, ErrorKind};

/// Number of offending source files printed under a check.
const MAX_LISTED: usize = 5;

/// Outcome of one check
#[derive(Debug, Clone, PartialEq)]
pub enum CheckStatus {
    /// Nothing a combine run would trip over
    Passed,
    /// Combine proceeds, but the result may surprise
    Warning(String),
    /// Combine would abort with an error of `kind`
    Fatal {
        /// Class of the error combine would raise
        kind: ErrorKind,
        /// Human-readable explanation
        message: String,
    },
}

impl CheckStatus {
    /// Whether combine would abort on this check
    pub fn is_fatal(&self) -> bool {
        matches!(self, CheckStatus::Fatal { .. })
    }

    /// Class of the error combine would raise, if any
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            CheckStatus::Fatal { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// One named check with the `Source_File` keys it is about
#[derive(Debug, Clone)]
pub struct ValidationCheck {
    /// Check name
    pub name: String,
    /// Check outcome
    pub status: CheckStatus,
    /// Offending `Source_File` keys, sorted
    pub source_files: Vec<String>,
}

impl ValidationCheck {
    pub(crate) fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Passed,
            source_files: Vec::new(),
        }
    }

    pub(crate) fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warning(message.into()),
            source_files: Vec::new(),
        }
    }

    pub(crate) fn fatal(name: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Fatal {
                kind,
                message: message.into(),
            },
            source_files: Vec::new(),
        }
    }

    /// Fatal check carrying the class of the error a run would raise
    pub(crate) fn from_error(name: impl Into<String>, err: impl Into<CombineError>) -> Self {
        let err = err.into();
        Self::fatal(name, err.kind(), err.to_string())
    }

    pub(crate) fn with_source_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_files = files.into_iter().map(Into::into).collect();
        self
    }
}

/// Dry-run report over the inputs of a combine run.
///
/// Checks are recorded in the order a combine run performs them, so the first
/// fatal check names the error the run would stop with.
#[derive(Debug)]
pub struct ValidationReport {
    /// Checks in the order a combine run performs them
    pub checks: Vec<ValidationCheck>,
    /// Sample description the inputs were checked against
    pub description: String,
    /// Number of identification tables checked
    pub inputs: usize,
}

#[derive(Clone, Copy)]
enum Tone {
    Heading,
    Good,
    Warn,
    Bad,
    Plain,
}

impl ValidationReport {
    /// Empty report for the given sample description and input count
    pub fn new(description: impl Into<String>, inputs: usize) -> Self {
        Self {
            checks: Vec::new(),
            description: description.into(),
            inputs,
        }
    }

    /// Append a check
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    /// Whether any check is fatal
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status.is_fatal())
    }

    /// Whether any check is a warning
    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| matches!(c.status, CheckStatus::Warning(_)))
    }

    /// Class of the error a combine run over these inputs would stop with
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.checks.iter().find_map(|c| c.status.error_kind())
    }

    /// All offending `Source_File` keys across fatal checks, sorted and unique
    pub fn offending_source_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self
            .checks
            .iter()
            .filter(|c| c.status.is_fatal())
            .flat_map(|c| c.source_files.iter().map(String::as_str))
            .collect();
        files.sort_unstable();
        files.dedup();
        files
    }

    fn lines(&self) -> Vec<(Tone, String)> {
        let mut lines = vec![
            (Tone::Heading, "Combine Input Validation".to_string()),
            (Tone::Plain, format!("Sample description: {}", self.description)),
            (Tone::Plain, format!("Input tables: {}", self.inputs)),
            (Tone::Plain, String::new()),
        ];

        let (mut passed, mut warned, mut failed) = (0, 0, 0);
        for check in &self.checks {
            let (tone, line) = match &check.status {
                CheckStatus::Passed => {
                    passed += 1;
                    (Tone::Good, format!("[ok]   {}", check.name))
                }
                CheckStatus::Warning(msg) => {
                    warned += 1;
                    (Tone::Warn, format!("[warn] {}: {}", check.name, msg))
                }
                CheckStatus::Fatal { kind, message } => {
                    failed += 1;
                    (Tone::Bad, format!("[fail] {}: {} ({})", check.name, message, kind))
                }
            };
            lines.push((tone, line));

            for file in check.source_files.iter().take(MAX_LISTED) {
                lines.push((Tone::Plain, format!("         {}", file)));
            }
            if check.source_files.len() > MAX_LISTED {
                lines.push((
                    Tone::Plain,
                    format!("         ... and {} more", check.source_files.len() - MAX_LISTED),
                ));
            }
        }

        lines.push((Tone::Plain, String::new()));
        lines.push((
            Tone::Plain,
            format!("Summary: {} passed, {} warnings, {} failed", passed, warned, failed),
        ));
        lines.push(match self.error_kind() {
            Some(kind) => (Tone::Bad, format!("Validation FAILED: combine would abort with a {}", kind)),
            None if warned > 0 => (Tone::Warn, "Validation PASSED with warnings".to_string()),
            None => (Tone::Good, "Validation PASSED".to_string()),
        });
        lines
    }

    /// Render the report, colored when the feature is enabled
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();
            for (tone, line) in self.lines() {
                let styled = match tone {
                    Tone::Heading => style(line).bold().cyan(),
                    Tone::Good => style(line).green(),
                    Tone::Warn => style(line).yellow(),
                    Tone::Bad => style(line).red().bold(),
                    Tone::Plain => style(line),
                };
                output.push_str(&format!("{}\n", styled));
            }
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, line) in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
