//! Respond node: terminal wrapper around a final value.

use std::sync::Arc;

use serde_json::json;

use crate::error::NodeError;
use crate::node::{Node, NodeOutputs};
use crate::parcel::ParcelKey;
use crate::store::ParcelStore;

/// Wraps a named input into a `{status, data, timestamp_ms}` response
/// object, preserving the input parcel's creation time.
///
/// Typically the last node of a list; a presentation layer looks up the
/// response name in the final store.
pub struct RespondNode {
    id: String,
    requires: Vec<Arc<str>>,
    outputs: Vec<Arc<str>>,
}

impl RespondNode {
    pub fn new(
        id: impl Into<String>,
        input: impl Into<Arc<str>>,
        output: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            id: id.into(),
            requires: vec![input.into()],
            outputs: vec![output.into()],
        }
    }
}

impl Node for RespondNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn requires(&self) -> &[Arc<str>] {
        &self.requires
    }

    fn outputs(&self) -> &[Arc<str>] {
        &self.outputs
    }

    fn execute(
        &self,
        store: &ParcelStore,
        index: Option<usize>,
    ) -> Result<NodeOutputs, NodeError> {
        if index.is_some() {
            return Err(NodeError::Usage(format!(
                "respond node '{}' does not take an index",
                self.id
            )));
        }

        let in_key = ParcelKey::plain(Arc::clone(&self.requires[0]));
        let parcel = store.get(&in_key).ok_or_else(|| {
            NodeError::Usage(format!("required parcel '{in_key}' is missing"))
        })?;

        Ok(vec![(
            ParcelKey::plain(Arc::clone(&self.outputs[0])),
            json!({
                "status": "success",
                "data": parcel.value(),
                "timestamp_ms": parcel.timestamp_ms(),
            }),
        )])
    }
}
