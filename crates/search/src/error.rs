//! Search error types.

use thiserror::Error;

/// Errors produced by the search core.
///
/// `UnknownFacet` and `MalformedValue` are recoverable: the URL codec
/// absorbs them at the decode boundary by dropping the offending
/// parameter, so a hand-edited URL never breaks the browse view. Only
/// `Execution` propagates to the session, where it resolves to the
/// `Failed` state rather than crossing the session boundary.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A facet key that is not part of the facet set.
    #[error("unknown facet: {0}")]
    UnknownFacet(String),

    /// A parameter value that does not parse for its facet.
    #[error("malformed value for '{key}': '{value}'")]
    MalformedValue { key: String, value: String },

    /// The execution boundary reported a failure.
    #[error("query execution failed")]
    Execution(#[source] anyhow::Error),
}
