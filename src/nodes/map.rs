//! Map node: unary transform between two names.

use std::sync::Arc;

use serde_json::Value;

use crate::error::NodeError;
use crate::node::{require_value, Node, NodeOutputs};
use crate::parcel::ParcelKey;
use crate::store::ParcelStore;

type MapFn = dyn Fn(&Value) -> Result<Value, NodeError> + Send + Sync;

/// Transforms one input name into one output name.
///
/// Unindexed: reads the exact input, writes the exact output. When the input
/// exists only as an indexed family, the engine fans this node out and each
/// invocation maps `in[i]` to `out[i]` - the node body stays the same either
/// way.
pub struct MapNode {
    id: String,
    requires: Vec<Arc<str>>,
    outputs: Vec<Arc<str>>,
    op: Box<MapFn>,
}

impl MapNode {
    pub fn new(
        id: impl Into<String>,
        input: impl Into<Arc<str>>,
        output: impl Into<Arc<str>>,
        op: impl Fn(&Value) -> Result<Value, NodeError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            requires: vec![input.into()],
            outputs: vec![output.into()],
            op: Box::new(op),
        }
    }

    fn keys(&self, index: Option<usize>) -> (ParcelKey, ParcelKey) {
        let input = Arc::clone(&self.requires[0]);
        let output = Arc::clone(&self.outputs[0]);
        match index {
            Some(i) => (ParcelKey::indexed(input, i), ParcelKey::indexed(output, i)),
            None => (ParcelKey::plain(input), ParcelKey::plain(output)),
        }
    }
}

impl Node for MapNode {
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
        let (in_key, out_key) = self.keys(index);
        let value = require_value(store, &in_key)?;
        let mapped = (self.op)(&value)?;
        Ok(vec![(out_key, mapped)])
    }
}
