#![allow(clippy::too_many_arguments)]

mod compare_floats;
pub mod config;
pub mod core;
pub mod corpus;
pub mod errors;
pub mod input;
pub mod output;
mod output_files;
mod simulation_time;
mod statistics;

pub use crate::config::{load_config, ReportConfig, ReportFlags};
pub use crate::corpus::Corpus;
use crate::errors::{CalculationError, ReportError};
use crate::input::ingest_run_dump;
use crate::output::Output;
use crate::output_files::write_reports;
use std::io::Read;
use tracing::instrument;

/// Aggregate one run's stored results and write the requested reports. Nothing is written
/// unless every series has been processed.
#[instrument(skip_all)]
pub fn run_report(
    input: impl Read,
    config: &ReportConfig,
    output: impl Output,
    flags: &ReportFlags,
) -> Result<Corpus, ReportError> {
    let run_dump = ingest_run_dump(input).map_err(ReportError::InvalidInput)?;

    let corpus = Corpus::from_store(&run_dump, config).map_err(CalculationError::new)?;

    if !output.is_noop() {
        write_reports(&output, &corpus, config, flags).map_err(ReportError::FailureInOutput)?;
    }

    Ok(corpus)
}
