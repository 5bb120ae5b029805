//! The error type for the record store and the aggregation engine.
//!
//! Every failure is recoverable at the call boundary: store mutations are
//! all-or-nothing, aggregation is read-only, and nothing here should ever be
//! fatal to the process.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A persisted document could not be read or parsed. The store degrades
    /// to an empty default for that document and continues loading.
    #[error("unable to load {document}: {reason}")]
    Load { document: String, reason: String },

    /// A mutation was rejected before anything changed, e.g. a missing
    /// required field or a non-positive spending limit.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The record (or category, or limit) targeted by an edit or delete was
    /// not located. Nothing was mutated.
    #[error("{0}")]
    NotFound(String),

    /// A stored date does not parse under the canonical `YYYY-MM-DD` format.
    /// This means a writer violated the persisted-data invariant, so the
    /// whole aggregation call fails rather than skipping the record.
    #[error("bad date format: {0}")]
    Format(String),

    /// A document rewrite failed. The in-memory state may be ahead of disk.
    #[error("unable to persist {document}")]
    Persist {
        document: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl Error {
    pub(crate) fn load(document: impl Into<String>, reason: impl ToString) -> Self {
        Error::Load {
            document: document.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn persist<E>(document: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Persist {
            document: document.into(),
            source: Box::new(source),
        }
    }
}
