use std::path::PathBuf;

use thiserror::Error;

/// Conditions that abort a run instead of degrading the report.
#[derive(Error, Debug)]
pub enum ContentDiffError {
    #[error("Monolith file not found: {}", .0.display())]
    MonolithMissing(PathBuf),

    #[error("Invalid pattern for {name}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Variant pattern for \"{0}\" has no owning section in the keyword table")]
    OrphanVariant(String),

    #[error("Rules file {}: {reason}", .path.display())]
    RulesFile { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ContentDiffResult<T> = Result<T, ContentDiffError>;
