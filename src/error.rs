//! Error types shared by the scraping engine.
//!
//! Every fallible operation in the library returns [`ScrapeError`]. The
//! orchestrator decides what to do with an error by looking at its
//! [`ErrorKind`]: item-level structure problems skip the item, page-level
//! problems skip the page, and nothing escapes a single site's run.

use thiserror::Error;

/// Coarse classification used by the recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, transport or non-success HTTP status.
    Fetch,
    /// An expected container or field is missing from the document.
    Structure,
    /// The response body could not be parsed into the expected shape.
    Parse,
    /// A site profile or configuration file is invalid.
    Config,
    /// The persistence collaborator failed.
    Store,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{0}")]
    Structure(String),

    #[error("could not parse {what}: {reason}")]
    Parse { what: String, reason: String },

    #[error("invalid url {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("store: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch { .. } | Self::Status { .. } => ErrorKind::Fetch,
            Self::Structure(_) | Self::Url { .. } => ErrorKind::Structure,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Config(_) => ErrorKind::Config,
            Self::Store(_) | Self::Io(_) => ErrorKind::Store,
        }
    }
}
