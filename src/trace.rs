//! Execution trace for scheduler runs.
//!
//! Diagnostic side channel, not a protocol: an append-only, ordered log of
//! each pass, each execution, each parcel created, and the terminal reason
//! (clean fixed point vs. pass-limit stop).
//! - Event: envelope with id + timestamp + kind
//! - EventKind: run / pass / node level variants
//! - Trace: thread-safe, append-only log

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Single entry in the run trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence ID (for ordering)
    pub id: u64,
    /// Time since run start (ms)
    pub timestamp_ms: u64,
    /// What happened
    pub kind: EventKind,
}

/// All trace entry types.
///
/// Uses Arc<str> for id/key fields to enable zero-cost cloning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    // ═══════════════════════════════════════════
    // RUN LEVEL
    // ═══════════════════════════════════════════
    RunStarted {
        node_count: usize,
        seed_count: usize,
    },
    /// A full pass inserted nothing: fixed point reached
    RunConverged {
        passes: usize,
        parcel_count: usize,
    },
    /// The pass cap was hit before convergence (soft warning, not a failure)
    PassLimitReached {
        passes: usize,
    },

    // ═══════════════════════════════════════════
    // PASS LEVEL
    // ═══════════════════════════════════════════
    PassStarted {
        pass: usize,
    },

    // ═══════════════════════════════════════════
    // NODE LEVEL
    // ═══════════════════════════════════════════
    NodeExecuted {
        node_id: Arc<str>,
        index: Option<usize>,
    },
    /// A node's failure was contained as an `error_<id>` parcel
    NodeFailed {
        node_id: Arc<str>,
        error: String,
        index: Option<usize>,
    },
    ParcelCreated {
        key: Arc<str>,
        producer: Option<Arc<str>>,
    },
    /// Same-pass output collision: the existing parcel was kept
    CollisionIgnored {
        key: Arc<str>,
        node_id: Arc<str>,
    },
}

impl EventKind {
    /// Extract node_id if event is node-related
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::NodeExecuted { node_id, .. }
            | Self::NodeFailed { node_id, .. }
            | Self::CollisionIgnored { node_id, .. } => Some(node_id),
            Self::ParcelCreated { producer, .. } => producer.as_deref(),
            Self::RunStarted { .. }
            | Self::RunConverged { .. }
            | Self::PassLimitReached { .. }
            | Self::PassStarted { .. } => None,
        }
    }

    /// Check if this event ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::RunConverged { .. } | Self::PassLimitReached { .. }
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted {
                node_count,
                seed_count,
            } => write!(f, "run started: {node_count} nodes, {seed_count} seeds"),
            Self::RunConverged {
                passes,
                parcel_count,
            } => write!(f, "fixed point after {passes} passes ({parcel_count} parcels)"),
            Self::PassLimitReached { passes } => {
                write!(f, "stopped at pass limit ({passes} passes) before convergence")
            }
            Self::PassStarted { pass } => write!(f, "pass {pass}"),
            Self::NodeExecuted { node_id, index } => match index {
                Some(i) => write!(f, "executed {node_id} for index [{i}]"),
                None => write!(f, "executed {node_id}"),
            },
            Self::NodeFailed { node_id, error, .. } => {
                write!(f, "node {node_id} failed: {error}")
            }
            Self::ParcelCreated { key, producer } => match producer {
                Some(p) => write!(f, "created {key} (by {p})"),
                None => write!(f, "created {key} (seed)"),
            },
            Self::CollisionIgnored { key, node_id } => {
                write!(f, "kept existing {key}; ignored duplicate from {node_id}")
            }
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>6}ms] {}", self.timestamp_ms, self.kind)
    }
}

/// Thread-safe, append-only run trace
#[derive(Clone)]
pub struct Trace {
    events: Arc<RwLock<Vec<Event>>>,
    start_time: Instant,
    next_id: Arc<AtomicU64>,
}

impl Trace {
    /// Create a new trace (call at run start)
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            start_time: Instant::now(),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Append an event (thread-safe, returns event ID)
    pub fn emit(&self, kind: EventKind) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let event = Event {
            id,
            timestamp_ms: self.start_time.elapsed().as_millis() as u64,
            kind,
        };

        self.events.write().push(event);
        id
    }

    /// Get all events (cloned)
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// The trace as ordered human-readable lines
    pub fn lines(&self) -> Vec<String> {
        self.events.read().iter().map(Event::to_string).collect()
    }

    /// Filter events by node ID
    pub fn filter_node(&self, node_id: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.kind.node_id() == Some(node_id))
            .collect()
    }

    /// Serialize to JSON for persistence/debugging
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.events()).unwrap_or(Value::Null)
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trace").field("len", &self.len()).finish()
    }
}
