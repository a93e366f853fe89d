/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Error types for parameter-file parsing and emission

use std::io;
use thiserror::Error;

/// Errors that can occur while decoding or encoding parameter cards
#[derive(Error, Debug)]
pub enum CardError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed field '{field}': cannot parse {text:?}")]
    MalformedField { field: &'static str, text: String },

    #[error("missing required field '{field}'")]
    MissingRequiredField { field: &'static str },

    #[error("invalid vary flag for '{field}': {value}")]
    InvalidFlagValue { field: &'static str, value: String },

    #[error("inconsistent radius card: {0}")]
    InconsistentRadius(String),

    #[error("unrecognized card at line {line}: {snippet:?}")]
    UnrecognizedCard { line: usize, snippet: String },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid card: {0}")]
    InvalidCard(String),

    #[error("ambiguous format detection: {0}")]
    FormatDetectionAmbiguous(String),
}

/// Result type for card operations
pub type Result<T> = std::result::Result<T, CardError>;
