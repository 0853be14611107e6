use anyhow::Result;
use log::info;
use std::path::PathBuf;

use prism_combine::combine;
use prism_combine::table::category::discover_inputs;
use prism_combine::CombineError;

use super::{Mode, RunArgs};

const DEFAULT_EXTENSION: &str = "csv";

/// Combine every categorized table found in a directory
pub fn run(dir: PathBuf, extension: Option<String>, args: RunArgs) -> Result<()> {
    if !args.labels.is_empty() {
        return Err(CombineError::Config(
            "discover derives labels from file names; --labels cannot be used".to_string(),
        )
        .into());
    }
    let file_config = args.file_config()?;
    let extension = extension
        .or_else(|| file_config.combine.extension.clone())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    info!("Searching {} for *.{} tables", dir.display(), extension);
    let inputs = discover_inputs(&dir, &extension).map_err(CombineError::from)?;
    info!("Found {} tables", inputs.len());

    let config = args.build(inputs, &file_config, Mode::Unfiltered)?;
    let stats = combine::run(&config)?;
    println!("{}", stats);
    println!("Wrote {}", config.output.display());
    Ok(())
}
