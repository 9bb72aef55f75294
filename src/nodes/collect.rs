//! Collect node: gathers a spread family back into one array.

use std::sync::Arc;

use serde_json::Value;

use crate::error::NodeError;
use crate::node::{require_value, Node, NodeOutputs};
use crate::parcel::ParcelKey;
use crate::store::ParcelStore;

/// Gathers the family `family[0..length]` into a single array parcel,
/// ascending by numeric index.
///
/// Declares only the metadata parcel as its requirement; the family base is
/// plain configuration, so the engine never fans this node out. Readiness
/// waits until every index up to the metadata-declared length is present: a
/// partially-spread family is never collected. A declared length of zero is
/// immediately ready and yields an empty array.
pub struct CollectNode {
    id: String,
    requires: Vec<Arc<str>>,
    outputs: Vec<Arc<str>>,
    family: Arc<str>,
}

impl CollectNode {
    /// `meta` is the metadata parcel name (usually `<family>_meta`);
    /// `output` is the name of the gathered array.
    pub fn new(
        id: impl Into<String>,
        family: impl Into<Arc<str>>,
        meta: impl Into<Arc<str>>,
        output: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            id: id.into(),
            requires: vec![meta.into()],
            outputs: vec![output.into()],
            family: family.into(),
        }
    }

    /// The length declared by the metadata parcel, if it is available and
    /// well-formed
    fn expected_len(&self, store: &ParcelStore) -> Option<usize> {
        store
            .value(&ParcelKey::plain(Arc::clone(&self.requires[0])))
            .and_then(|meta| meta.get("length").and_then(Value::as_u64))
            .map(|n| n as usize)
    }
}

impl Node for CollectNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn requires(&self) -> &[Arc<str>] {
        &self.requires
    }

    fn outputs(&self) -> &[Arc<str>] {
        &self.outputs
    }

    /// Readiness override: the whole family must be present, not just one
    /// member. "Wait for the whole array" without a barrier primitive.
    fn is_ready(&self, store: &ParcelStore) -> bool {
        match self.expected_len(store) {
            Some(len) => (0..len)
                .all(|i| store.contains(&ParcelKey::indexed(Arc::clone(&self.family), i))),
            None => false,
        }
    }

    fn execute(
        &self,
        store: &ParcelStore,
        index: Option<usize>,
    ) -> Result<NodeOutputs, NodeError> {
        if index.is_some() {
            return Err(NodeError::Usage(format!(
                "collect node '{}' does not take an index",
                self.id
            )));
        }

        let meta_key = ParcelKey::plain(Arc::clone(&self.requires[0]));
        let meta = require_value(store, &meta_key)?;
        let len = meta.get("length").and_then(Value::as_u64).ok_or_else(|| {
            NodeError::TypeMismatch(format!(
                "'{meta_key}' must carry a numeric 'length' field"
            ))
        })? as usize;

        let mut items = Vec::with_capacity(len);
        for i in 0..len {
            let key = ParcelKey::indexed(Arc::clone(&self.family), i);
            items.push(require_value(store, &key)?);
        }

        Ok(vec![(
            ParcelKey::plain(Arc::clone(&self.outputs[0])),
            Value::Array(items),
        )])
    }
}
