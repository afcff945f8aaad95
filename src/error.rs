//! Operator-facing failure conditions of the analysis pipeline.
//!
//! Everything else travels as a plain [`anyhow::Error`]; these variants exist
//! so `main` can pick a distinct exit code for each of them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// None of the calendar candidates exist in the data directory.
    #[error(
        "could not find calendar.csv, calendar.csv.gz or scraped_calendar.csv in {}",
        dir.display()
    )]
    CalendarNotFound { dir: PathBuf },

    /// A required column is missing from an input file header.
    #[error("{} must have a '{column}' column", file.display())]
    MissingColumn { file: PathBuf, column: &'static str },
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::CalendarNotFound { .. } => 1,
            PipelineError::MissingColumn { .. } => 2,
        }
    }
}

/// Maps any pipeline error to a process exit code (1 unless typed otherwise).
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<PipelineError>()
        .map(PipelineError::exit_code)
        .unwrap_or(1)
}
