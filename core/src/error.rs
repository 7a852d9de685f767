use std::io;

use thiserror::Error;

/// Structural problems with a source table. Any of these aborts the load.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read food table: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

/// Why a single row was skipped while loading. The rest of the table still loads.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecordFault {
    #[error("food name is empty")]
    MissingName,

    #[error("calories per serving is empty")]
    MissingCalories,

    #[error("calories per serving '{0}' is not a number")]
    InvalidCalories(String),

    #[error("calories per serving '{0}' must be a finite, non-negative number")]
    NegativeCalories(String),
}

/// Invalid preference values, rejected before the engine runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("{category} priority must be between 1 and 3 (got {priority})")]
    PriorityOutOfRange {
        category: &'static str,
        priority: u8,
    },

    #[error("top_n must be at least 1")]
    ZeroTopN,

    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidCalories { field: &'static str, value: f64 },
}
