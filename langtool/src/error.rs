//! All error types for the langtool crate.
//!
//! Every fallible operation (decoding, encoding, validation, translation,
//! writing) returns [`Error`]. Each variant belongs to one pipeline [`Stage`],
//! so callers can tell which step of a conversion failed.

use std::{fmt::Display, path::PathBuf};

use thiserror::Error;

use crate::formats::LocalizationFormat;

/// The pipeline step an [`Error`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Decode,
    Translate,
    Encode,
    Write,
    Export,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::Decode => "decode",
            Stage::Translate => "translate",
            Stage::Encode => "encode",
            Stage::Write => "write",
            Stage::Export => "export",
        };
        f.write_str(name)
    }
}

/// A single output file that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl Display for WriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to decode {format} file `{origin}`: {message}")]
    Decode {
        format: LocalizationFormat,
        origin: String,
        message: String,
    },

    #[error("failed to encode {format} output: {message}")]
    Encode {
        format: LocalizationFormat,
        message: String,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("translation to `{language}` failed: {message}")]
    Translation { language: String, message: String },

    #[error("{} of {} output file(s) could not be written: {}", failures.len(), failures.len() + written, join_failures(failures))]
    Write {
        failures: Vec<WriteFailure>,
        written: usize,
    },

    #[error("no translatable content found in `{origin}`")]
    NoContent { origin: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn join_failures(failures: &[WriteFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Creates a decode error naming the format and the file (or other origin) being parsed.
    pub fn decode(
        format: LocalizationFormat,
        origin: impl Into<String>,
        message: impl Display,
    ) -> Self {
        Error::Decode {
            format,
            origin: origin.into(),
            message: message.to_string(),
        }
    }

    /// Creates an encode error for the given output format.
    pub fn encode(format: LocalizationFormat, message: impl Display) -> Self {
        Error::Encode {
            format,
            message: message.to_string(),
        }
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Creates a translation error for the given target language.
    pub fn translation(language: impl Into<String>, message: impl Display) -> Self {
        Error::Translation {
            language: language.into(),
            message: message.to_string(),
        }
    }

    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Decode { .. } => Stage::Decode,
            Error::Encode { .. } => Stage::Encode,
            Error::Validation(_) => Stage::Validate,
            Error::Translation { .. } => Stage::Translate,
            Error::Write { .. } | Error::Io(_) => Stage::Write,
            Error::NoContent { .. } => Stage::Decode,
            Error::Json(_) => Stage::Encode,
            Error::Csv(_) => Stage::Export,
        }
    }
}
