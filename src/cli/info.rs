use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use prism_combine::output::TableSummary;

/// Display a summary of a combined table
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        bail!("File does not exist: {}", file.display());
    }

    let summary = TableSummary::read(&file).context("Failed to read combined table")?;

    println!("PRISM Combined Table Information");
    println!("================================");
    print!("{}", summary);

    Ok(())
}
