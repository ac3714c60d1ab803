//! Error types for feed ingestion

use std::fmt;
use thiserror::Error;

/// Result type for player pool operations
pub type Result<T> = std::result::Result<T, FeedError>;

/// Which upstream feed a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Projections,
    Slate,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Projections => write!(f, "projection feed"),
            FeedKind::Slate => write!(f, "slate feed"),
        }
    }
}

/// Errors raised while reading the projection and slate feeds.
///
/// All of these are fatal for an optimization run: a malformed feed is never
/// partially trusted.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Malformed {feed}: field `{field}` {detail}")]
    DataFormat { feed: FeedKind, field: String, detail: String },

    #[error("Malformed {feed}: {source}")]
    Json {
        feed: FeedKind,
        #[source]
        source: serde_json::Error,
    },
}

impl FeedError {
    pub(crate) fn data_format(
        feed: FeedKind,
        field: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        FeedError::DataFormat { feed, field: field.into(), detail: detail.into() }
    }

    /// The feed that produced this error
    pub fn feed(&self) -> FeedKind {
        match self {
            FeedError::DataFormat { feed, .. } | FeedError::Json { feed, .. } => *feed,
        }
    }
}
