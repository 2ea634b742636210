//! Navigation-layer error taxonomy

use thiserror::Error;

/// Errors surfaced by view operations and stack maintenance
///
/// None of these are fatal to the engine: fetch failures become status
/// messages, unknown operations are logged once and ignored, and teardown
/// failures never block a truncation from completing.
#[derive(Debug, Error)]
pub enum NavError {
    /// The configured operation name has no callable in the view's table.
    #[error("no action {operation:?} for view kind {kind}")]
    ActionNotFound { kind: &'static str, operation: String },

    /// An operation's underlying data fetch or session setup failed.
    #[error("{0}")]
    Fetch(String),

    /// Best-effort cleanup during truncation failed.
    #[error("teardown failed: {0}")]
    Teardown(String),
}
