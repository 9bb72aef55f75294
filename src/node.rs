//! Node capability contract.
//!
//! A node declares the base names it needs and produces, reports readiness
//! against the current store, and executes units of work. The engine depends
//! only on this trait, never on concrete node types: readiness is the
//! override point for custom wait conditions (e.g. "the whole family must be
//! present"), and execution is index-aware so one node can be replayed once
//! per family member.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::warn;

use crate::error::NodeError;
use crate::parcel::{now_ms, ParcelKey};
use crate::store::ParcelStore;

/// Ordered outputs of one node invocation
pub type NodeOutputs = Vec<(ParcelKey, Value)>;

/// A reactive computation unit.
///
/// Nodes never talk to each other directly; all interaction goes through the
/// append-only store.
pub trait Node: Send + Sync {
    /// Opaque label for this node (not required to be unique)
    fn id(&self) -> &str;

    /// Base names this node needs, in declaration order
    fn requires(&self) -> &[Arc<str>];

    /// Base names this node publishes under, in declaration order
    fn outputs(&self) -> &[Arc<str>];

    /// Whether this node can run against the current store.
    ///
    /// Default policy: every required base is present either as an exact
    /// parcel or as at least one member of an indexed family. Override to
    /// add stricter conditions, such as waiting for a metadata-declared
    /// number of indices.
    fn is_ready(&self, store: &ParcelStore) -> bool {
        self.requires()
            .iter()
            .all(|base| store.contains_plain(base) || store.has_family(base))
    }

    /// Perform the unit of work.
    ///
    /// With `Some(index)` the node must resolve inputs at `base[index]` and
    /// name outputs `base[index]`; with `None` it uses exact names. A node
    /// that demands an index but receives none (or vice versa) returns
    /// [`NodeError::Usage`].
    fn execute(
        &self,
        store: &ParcelStore,
        index: Option<usize>,
    ) -> Result<NodeOutputs, NodeError>;

    /// Run `execute`, converting failure into a synthetic `error_<id>`
    /// parcel so a failing node cannot halt the scheduling loop.
    fn execute_guarded(&self, store: &ParcelStore, index: Option<usize>) -> NodeOutputs {
        match self.execute(store, index) {
            Ok(outputs) => outputs,
            Err(err) => {
                warn!(node = self.id(), error = %err, "node failed; contained as error parcel");
                error_outputs(self.id(), &err)
            }
        }
    }
}

/// The synthetic outputs standing in for a failed invocation
pub(crate) fn error_outputs(node_id: &str, err: &NodeError) -> NodeOutputs {
    vec![(
        ParcelKey::plain(format!("error_{node_id}")),
        json!({
            "error": err.to_string(),
            "node_id": node_id,
            "timestamp_ms": now_ms(),
        }),
    )]
}

/// Fetch a required input value, mapping absence to a usage error
pub fn require_value(store: &ParcelStore, key: &ParcelKey) -> Result<Value, NodeError> {
    store
        .value(key)
        .ok_or_else(|| NodeError::Usage(format!("required parcel '{key}' is missing")))
}
