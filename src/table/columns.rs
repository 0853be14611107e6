//! Column names and column-name normalization.
//!
//! Input tables come from different PRISM versions and spreadsheet exports, so
//! their headers are normalized into a small identifier alphabet before any
//! column is looked up by name.

use std::sync::OnceLock;

use regex::Regex;

/// Synthetic 1-based row identifier of the `data` view
pub const REC_ID: &str = "Rec_ID";
/// Peptide sequence (grouping key)
pub const SEQUENCE: &str = "Sequence";
/// Source file of the identification (join key into the sample description)
pub const SOURCE_FILE: &str = "Source_File";
/// False discovery rate estimate
pub const Q: &str = "Q";
/// Average local confidence
pub const ALC: &str = "ALC";
/// Best predicted binding percentile rank
pub const NETMHC_RANK: &str = "netMHC_rank";
/// Allele with the best predicted binding
pub const HLA_ALLELE: &str = "HLA_allele";
/// Annotation category of the peptide location
pub const CATEGORY: &str = "Category";
/// Precursor intensity
pub const INTENSITY: &str = "Intensity";
/// Decoy flag
pub const DECOY: &str = "Decoy";
/// Provenance label stamped by the loader
pub const DATABASES_PRISM: &str = "Databases_PRISM";

/// Sample name from the sample description
pub const SAMPLE_NAME: &str = "Sample_Name";
/// Replica identifier from the sample description
pub const SAMPLE_REPLICA: &str = "Sample_Replica";
/// Sample type from the sample description
pub const SAMPLE_TYPE: &str = "Sample_Type";

/// Columns of the sample description, in file order.
pub const DESCRIPTION_COLUMNS: [&str; 4] = [SOURCE_FILE, SAMPLE_NAME, SAMPLE_REPLICA, SAMPLE_TYPE];

/// Columns every identification table must provide after normalization.
pub const REQUIRED_DATA_COLUMNS: [&str; 3] = [SEQUENCE, SOURCE_FILE, Q];

/// Pattern of per-allele binding prediction columns (e.g. `HLA_A0201`).
pub const ALLELE_COLUMN_PATTERN: &str = r"^HLA_[ABC]";

/// Compiled [`ALLELE_COLUMN_PATTERN`].
pub fn allele_column_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ALLELE_COLUMN_PATTERN).expect("allele column pattern is valid"))
}

/// Whether a normalized column name is an allele prediction column.
pub fn is_allele_column(name: &str) -> bool {
    allele_column_regex().is_match(name)
}

/// Normalize a raw header into the canonical identifier alphabet.
///
/// `% ( ) / * :` are removed, whitespace `.` and `-` become `_`, runs of `_`
/// collapse and leading/trailing `_` are trimmed. The function is idempotent.
pub fn normalize_column_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        match c {
            '%' | '(' | ')' | '/' | '*' | ':' => {}
            '.' | '-' | '_' => push_separator(&mut out),
            c if c.is_whitespace() => push_separator(&mut out),
            c => out.push(c),
        }
    }
    out.trim_matches('_').to_string()
}

fn push_separator(out: &mut String) {
    if !out.ends_with('_') {
        out.push('_');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prism_headers() {
        assert_eq!(normalize_column_name("Top location count (no decoy)"), "Top_location_count_no_decoy");
        assert_eq!(normalize_column_name("netMHC rank"), "netMHC_rank");
        assert_eq!(normalize_column_name("HLA-A*02:01"), "HLA_A0201");
        assert_eq!(normalize_column_name("Area (%)"), "Area");
        assert_eq!(normalize_column_name("m/z"), "mz");
        assert_eq!(normalize_column_name("Source File"), "Source_File");
        assert_eq!(normalize_column_name("-10lgP"), "10lgP");
        assert_eq!(normalize_column_name("a.. b--c"), "a_b_c");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["Top location count (no decoy)", "HLA-B*07:02", " x (%) ", "__a__b__", ""] {
            let once = normalize_column_name(raw);
            assert_eq!(normalize_column_name(&once), once);
        }
    }

    #[test]
    fn test_allele_columns() {
        assert!(is_allele_column("HLA_A0201"));
        assert!(is_allele_column("HLA_C0702"));
        assert!(!is_allele_column("HLA_allele"));
        assert!(!is_allele_column("HLA_DRB1"));
        assert!(!is_allele_column("netMHC_rank"));
    }
}
