//! Error types with fix suggestions.
//!
//! Node-level failures are contained at the node boundary: the engine turns
//! them into `error_<node_id>` parcels instead of unwinding, so downstream
//! nodes and the caller can observe and react to them. Only misuse of the
//! engine API itself surfaces as a hard failure.

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Failures raised by a node's `execute`.
///
/// These never abort a run; `execute_guarded` converts them into synthetic
/// error parcels.
#[derive(Error, Debug)]
pub enum NodeError {
    /// The node was invoked inconsistently with its declared contract, e.g.
    /// an indexed execution without an index, or a named parcel absent when
    /// the node demanded it.
    #[error("usage error: {0}")]
    Usage(String),

    /// An input value had the wrong shape for this node
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Any other execution failure
    #[error("execution failed: {0}")]
    Failed(String),
}

/// Misuse of the engine API itself. The only hard failures; everything
/// node-level becomes an ordinary error parcel.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid seed name {name:?}: {reason}")]
    InvalidSeedName { name: String, reason: String },
}

impl FixSuggestion for NodeError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            NodeError::Usage(_) => {
                Some("Check the node's index contract: family inputs need an index, exact inputs need none")
            }
            NodeError::TypeMismatch(_) => {
                Some("Check the shape of the upstream value (e.g. spread requires an array)")
            }
            NodeError::Failed(_) => {
                Some("Inspect the error_<node_id> parcel in the final store for details")
            }
        }
    }
}

impl FixSuggestion for EngineError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            EngineError::InvalidSeedName { .. } => {
                Some("Seed names must be non-empty, e.g. \"items\" or \"part[0]\"")
            }
        }
    }
}
