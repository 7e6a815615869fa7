use std::path::PathBuf;

use thiserror::Error;

pub mod local;
pub mod record;
pub mod remote;
pub mod resolver;
pub mod ttl;

pub use record::{ParseOutcome, parse_records};
pub use resolver::{Resolution, Resolver};
pub use ttl::DatasetCache;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing column: {0}")]
    MissingColumn(&'static str),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no usable rows ({skipped} skipped)")]
    NoRows { skipped: usize },
}

/// Everything that can go wrong while obtaining the dataset. Remote variants
/// are recoverable by falling back to the local file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("remote source not configured")]
    NotConfigured,
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed remote payload: {0}")]
    Malformed(InputError),
    #[error("local source {path} unavailable: {source}")]
    Local {
        path: PathBuf,
        #[source]
        source: InputError,
    },
}

impl From<reqwest::Error> for SourceError {
    fn from(value: reqwest::Error) -> Self {
        SourceError::Transport(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
