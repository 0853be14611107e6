//! Run modes for common use cases.
//!
//! A mode supplies defaults for the input delimiter and the Q-value filter,
//! matching how PRISM results are usually combined.

use std::fmt;
use std::str::FromStr;

use prism_combine::resolver::DEFAULT_Q_THRESHOLD;

/// Run modes of the combiner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Filtered combine of tab-delimited exports (default for `combine`).
    ///
    /// - Delimiter: tab
    /// - Q threshold: 0.01
    #[default]
    Fdr,

    /// Unfiltered combine of comma-delimited batch results (default for `discover`).
    ///
    /// - Delimiter: comma
    /// - Q threshold: none
    Unfiltered,
}

impl Mode {
    /// Returns the input field delimiter for this mode.
    pub fn delimiter(&self) -> u8 {
        match self {
            Mode::Fdr => b'\t',
            Mode::Unfiltered => b',',
        }
    }

    /// Returns the Q-value threshold for this mode.
    pub fn q_threshold(&self) -> Option<f64> {
        match self {
            Mode::Fdr => Some(DEFAULT_Q_THRESHOLD),
            Mode::Unfiltered => None,
        }
    }

    /// Returns all available mode names.
    pub fn variants() -> &'static [&'static str] {
        &["fdr", "unfiltered"]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Fdr => write!(f, "fdr"),
            Mode::Unfiltered => write!(f, "unfiltered"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fdr" | "filtered" => Ok(Mode::Fdr),
            "unfiltered" | "all" => Ok(Mode::Unfiltered),
            _ => Err(format!(
                "Unknown mode '{}'. Valid options: {}",
                s,
                Mode::variants().join(", ")
            )),
        }
    }
}
