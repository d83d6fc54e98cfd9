use std::path::PathBuf;
use thiserror::Error;

/// Error type for catalog operations
#[derive(Debug, Error)]
pub enum TsError {
    /// The file is not well-formed XML
    #[error("Failed to parse TS file {file} at byte {position}:\n{reason}\n\nTip: Verify the XML syntax is correct")]
    Xml {
        file: PathBuf,
        position: u64,
        reason: String,
    },

    /// Well-formed XML that does not follow the TS layout
    #[error("Invalid TS structure in {file}: {reason}\n\nTip: The root element must be <TS> and every <message> needs a <source>")]
    Format { file: PathBuf, reason: String },

    /// Failed to load a settings file
    #[error("Failed to load config {file}:\n{reason}\n\nTip: Check the TOML syntax and the key names")]
    Config { file: PathBuf, reason: String },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Search text was rejected by the regex engine
    #[error("Invalid regular expression '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    /// A location glob could not be compiled
    #[error("Invalid location pattern '{0}'\n\nTip: Use '*' wildcards, e.g. '../src/*.cpp'")]
    InvalidPattern(String),

    /// Failed to serialize a report as JSON
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to emit XML
    #[error("Failed to write TS output: {0}")]
    Write(String),
}

impl TsError {
    /// Create an Xml error from a file path, a byte offset and a reason
    pub fn xml(file: impl Into<PathBuf>, position: u64, reason: impl Into<String>) -> Self {
        Self::Xml {
            file: file.into(),
            position,
            reason: reason.into(),
        }
    }

    /// Create a Format error
    pub fn format(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a Config error
    pub fn config(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidRegex error
    pub fn invalid_regex(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for TsError
pub type Result<T> = std::result::Result<T, TsError>;
