use std::path::PathBuf;
use thiserror::Error;

/// Main error type for codequest operations
#[derive(Error, Debug)]
pub enum QuestError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single source file could not be parsed. Recorded as a warning by the
    /// analyzer; never aborts a run on its own.
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Structural failure of a whole run (no files, no nodes, no entry points).
    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),

    #[error("File system error: {0}")]
    FileSystem(String),
}

impl QuestError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        QuestError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuestError>;
