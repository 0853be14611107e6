use anyhow::Result;
use log::info;
use std::path::PathBuf;

use prism_combine::table::InputFile;
use prism_combine::validator::validate_inputs;
use prism_combine::CombineError;

use super::{Mode, RunArgs};

/// Dry-run a combine and print the validation report
pub fn run(inputs: Vec<PathBuf>, args: RunArgs) -> Result<()> {
    let file_config = args.file_config()?;
    let inputs = InputFile::pair(inputs, args.labels.clone()).map_err(CombineError::from)?;
    let config = args.build(inputs, &file_config, Mode::Fdr)?;

    info!("PRISM combine validator");
    info!("=======================");
    info!("Sample description: {}", config.description.display());
    info!("");

    let report = validate_inputs(&config);

    print!("{}", report.format_colored());

    if let Some(kind) = report.error_kind() {
        std::process::exit(kind.exit_code());
    }

    Ok(())
}
