//! Spread node: expands an array into an indexed family.

use std::sync::Arc;

use serde_json::json;

use crate::error::NodeError;
use crate::node::{require_value, Node, NodeOutputs};
use crate::parcel::ParcelKey;
use crate::store::ParcelStore;

use super::{meta_name, value_kind};

/// Expands one array-valued parcel into the family `prefix[0..n]` plus a
/// metadata parcel `<prefix>_meta` carrying `{length, items}`.
///
/// Downstream nodes fan out over the indexed parcels; a collector's
/// readiness counts against the metadata. A zero-length spread emits only
/// the metadata parcel.
pub struct SpreadNode {
    id: String,
    requires: Vec<Arc<str>>,
    outputs: Vec<Arc<str>>,
    prefix: Arc<str>,
}

impl SpreadNode {
    pub fn new(
        id: impl Into<String>,
        input: impl Into<Arc<str>>,
        prefix: impl Into<Arc<str>>,
    ) -> Self {
        let prefix = prefix.into();
        let meta: Arc<str> = meta_name(&prefix).into();
        Self {
            id: id.into(),
            requires: vec![input.into()],
            outputs: vec![Arc::clone(&prefix), meta],
            prefix,
        }
    }
}

impl Node for SpreadNode {
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
                "spread node '{}' does not take an index",
                self.id
            )));
        }

        let input = &self.requires[0];
        let value = require_value(store, &ParcelKey::plain(Arc::clone(input)))?;
        let items = value.as_array().ok_or_else(|| {
            NodeError::TypeMismatch(format!(
                "'{input}' must be an array, got {}",
                value_kind(&value)
            ))
        })?;

        let mut outputs = Vec::with_capacity(items.len() + 1);
        for (i, item) in items.iter().enumerate() {
            outputs.push((ParcelKey::indexed(Arc::clone(&self.prefix), i), item.clone()));
        }
        outputs.push((
            ParcelKey::plain(Arc::clone(&self.outputs[1])),
            json!({ "length": items.len(), "items": items }),
        ));

        Ok(outputs)
    }
}
