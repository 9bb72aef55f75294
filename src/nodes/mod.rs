//! Example node variants.
//!
//! These are ordinary [`Node`](crate::node::Node) implementations, not part
//! of the engine contract: the engine never inspects concrete types. They
//! cover the shapes a workflow is usually assembled from:
//!
//! - [`SourceNode`] - no requirements, emits a fixed value
//! - [`MapNode`] - unary transform, exact or fanned out per index
//! - [`SpreadNode`] - one array parcel into an indexed family + metadata
//! - [`CollectNode`] - a complete family back into one array
//! - [`RespondNode`] - wraps a final value into a response object

mod collect;
mod map;
mod respond;
mod source;
mod spread;

pub use collect::CollectNode;
pub use map::MapNode;
pub use respond::RespondNode;
pub use source::SourceNode;
pub use spread::SpreadNode;

/// Name of the metadata parcel describing a spread family
pub fn meta_name(prefix: &str) -> String {
    format!("{prefix}_meta")
}

/// Human-readable JSON value kind, for type-mismatch messages
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
