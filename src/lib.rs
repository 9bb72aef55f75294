//! Rill - reactive data-flow scheduler
//!
//! Nodes declare the parcel names they need and the names they produce; the
//! engine runs each node exactly once per availability condition it
//! satisfies. There is no static graph and no declared execution order:
//! nodes run when their data arrives, indexed families fan work out per
//! index, and a fixed-point loop with a pass cap decides termination.
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use rill::nodes::{CollectNode, MapNode, RespondNode, SpreadNode};
//! use rill::{Engine, Node, NodeError};
//!
//! let nodes: Vec<Arc<dyn Node>> = vec![
//!     Arc::new(SpreadNode::new("spread", "items", "item")),
//!     Arc::new(MapNode::new("upper", "item", "processed", |v| {
//!         let s = v.as_str().ok_or_else(|| {
//!             NodeError::TypeMismatch("expected a string".into())
//!         })?;
//!         Ok(json!(s.to_uppercase()))
//!     })),
//!     Arc::new(CollectNode::new("collect", "processed", "item_meta", "result")),
//!     Arc::new(RespondNode::new("respond", "result", "response")),
//! ];
//!
//! let result = Engine::new()
//!     .execute(&nodes, vec![("items".to_string(), json!(["a", "b", "c"]))])
//!     .unwrap();
//!
//! assert!(result.converged());
//! assert_eq!(result.value("result"), Some(json!(["A", "B", "C"])));
//! ```

pub mod engine;
pub mod error;
pub mod node;
pub mod nodes;
pub mod parcel;
pub mod store;
pub mod trace;

pub use engine::{Engine, Outcome, RunResult, DEFAULT_MAX_PASSES};
pub use error::{EngineError, FixSuggestion, NodeError};
pub use node::{require_value, Node, NodeOutputs};
pub use parcel::{Parcel, ParcelKey};
pub use store::ParcelStore;
pub use trace::{Event, EventKind, Trace};
