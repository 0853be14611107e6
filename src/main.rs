//! # prism-combine
//!
//! Command-line front end of the PRISM peptide aggregation engine.
//!
//! ## Usage
//!
//! ```bash
//! # Combine two exports at 1% FDR
//! prism-combine combine -i prio1.run.tsv prio2.run.tsv -s samples.tsv
//!
//! # Combine all *.csv batch results of a directory, unfiltered
//! prism-combine discover results/ -s samples.tsv -o combined.tsv.gz
//!
//! # Check inputs without writing anything
//! prism-combine validate -i prio1.run.tsv -s samples.tsv
//! ```
//!
//! ## Exit status
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0    | success |
//! | 1    | I/O failure |
//! | 2    | configuration error |
//! | 3    | sample description does not cover the identifications |
//! | 75   | store busy, retry later |
//!
//! `validate` exits with the status combine would have exited with.

use clap::Parser;

use prism_combine::CombineError;

mod cli;

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CombineError>()
        .map(|e| e.kind().exit_code())
        .unwrap_or(1)
}

fn main() {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());

    if let Err(err) = cli::dispatch(cli) {
        let kind = err
            .downcast_ref::<CombineError>()
            .map(|e| format!(" ({})", e.kind()))
            .unwrap_or_default();
        eprintln!("Error{}: {:#}", kind, err);
        std::process::exit(exit_code(&err));
    }
}
