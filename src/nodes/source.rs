//! Source node: emits a fixed value.

use std::sync::Arc;

use serde_json::Value;

use crate::error::NodeError;
use crate::node::{Node, NodeOutputs};
use crate::parcel::ParcelKey;
use crate::store::ParcelStore;

/// Emits one fixed value under one name.
///
/// Has no requirements, so it is ready in the first pass and, once its output
/// exists, never runs again.
pub struct SourceNode {
    id: String,
    requires: Vec<Arc<str>>,
    outputs: Vec<Arc<str>>,
    value: Value,
}

impl SourceNode {
    pub fn new(id: impl Into<String>, output: impl Into<Arc<str>>, value: Value) -> Self {
        Self {
            id: id.into(),
            requires: Vec::new(),
            outputs: vec![output.into()],
            value,
        }
    }
}

impl Node for SourceNode {
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
        _store: &ParcelStore,
        index: Option<usize>,
    ) -> Result<NodeOutputs, NodeError> {
        if index.is_some() {
            return Err(NodeError::Usage(format!(
                "source node '{}' does not take an index",
                self.id
            )));
        }
        Ok(vec![(
            ParcelKey::plain(Arc::clone(&self.outputs[0])),
            self.value.clone(),
        )])
    }
}
