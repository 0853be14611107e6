use anyhow::Result;
use log::info;
use std::path::PathBuf;

use prism_combine::combine;
use prism_combine::table::InputFile;
use prism_combine::CombineError;

use super::{Mode, RunArgs};

/// Combine explicitly listed identification tables
pub fn run(inputs: Vec<PathBuf>, args: RunArgs) -> Result<()> {
    let file_config = args.file_config()?;
    let inputs = InputFile::pair(inputs, args.labels.clone()).map_err(CombineError::from)?;
    let config = args.build(inputs, &file_config, Mode::Fdr)?;

    info!("PRISM combine");
    info!("=============");
    for input in &config.inputs {
        info!("Input: {} ({})", input.path.display(), input.resolved_label());
    }
    info!("Sample description: {}", config.description.display());
    info!("Output: {}", config.output.display());

    let stats = combine::run(&config)?;
    println!("{}", stats);
    println!("Wrote {}", config.output.display());
    Ok(())
}
