//! Fixed-point scheduling engine.
//!
//! The execution model:
//! 1. Seed the store with the initial parcels
//! 2. Loop: scan the node list, run every node that is ready, publish outputs
//! 3. Stop when a full pass inserts nothing (fixed point) or the pass cap hits
//! 4. Return the final store
//!
//! There is no static execution order and no dependency graph: nodes run when
//! their data becomes available. Within one pass, later nodes observe the
//! outputs of earlier nodes (immediate visibility), so short chains converge
//! in a single pass. Cycles are not rejected up front; the pass cap bounds
//! them at runtime.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::EngineError;
use crate::node::{error_outputs, Node};
use crate::parcel::{Parcel, ParcelKey};
use crate::store::ParcelStore;
use crate::trace::{EventKind, Trace};

/// Pass cap guarding against unsatisfiable requirement cycles
pub const DEFAULT_MAX_PASSES: usize = 100;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A full pass inserted nothing: no node can make further progress
    FixedPoint,
    /// The pass cap was hit before convergence. Partial results are still
    /// returned; this is a soft warning, not a failure.
    PassLimitReached,
}

/// Final state of one engine run
#[derive(Debug)]
pub struct RunResult {
    /// All parcels created during the run (seeds included)
    pub store: ParcelStore,
    pub outcome: Outcome,
    /// Number of passes actually executed
    pub passes: usize,
    /// Ordered diagnostic log of the run
    pub trace: Trace,
}

impl RunResult {
    pub fn converged(&self) -> bool {
        self.outcome == Outcome::FixedPoint
    }

    /// Convenience lookup of a final value by rendered name
    /// (`"response"`, `"item[2]"`)
    pub fn value(&self, name: &str) -> Option<Value> {
        self.store.value(&ParcelKey::parse(name))
    }
}

/// The scheduling engine. Stateless between runs; every `execute` call owns
/// a fresh store and trace.
#[derive(Debug, Clone)]
pub struct Engine {
    max_passes: usize,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Override the pass cap (mainly for tests and tight embeddings)
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Execute a node list against initial data and return the final store.
    ///
    /// Node-level failures never abort the run; they become `error_<id>`
    /// parcels. The only hard failure is malformed seed data.
    #[instrument(skip_all, fields(nodes = nodes.len(), max_passes = self.max_passes))]
    pub fn execute<I>(
        &self,
        nodes: &[Arc<dyn Node>],
        seeds: I,
    ) -> Result<RunResult, EngineError>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let store = ParcelStore::new();
        let trace = Trace::new();

        // Validate every seed name before touching the store.
        let seeds: Vec<(ParcelKey, Value)> = seeds
            .into_iter()
            .map(|(name, value)| parse_seed_name(&name).map(|key| (key, value)))
            .collect::<Result<_, _>>()?;

        trace.emit(EventKind::RunStarted {
            node_count: nodes.len(),
            seed_count: seeds.len(),
        });

        for (key, value) in seeds {
            let rendered: Arc<str> = key.to_string().into();
            if store.insert(Parcel::seed(key, value)) {
                trace.emit(EventKind::ParcelCreated {
                    key: rendered,
                    producer: None,
                });
            } else {
                debug!(key = %rendered, "duplicate seed name ignored");
            }
        }

        let mut outcome = Outcome::PassLimitReached;
        let mut passes = 0;

        for pass in 1..=self.max_passes {
            passes = pass;
            trace.emit(EventKind::PassStarted { pass });

            let inserted = run_pass(nodes, &store, &trace);
            debug!(pass, inserted, "pass complete");

            if inserted == 0 {
                outcome = Outcome::FixedPoint;
                break;
            }
        }

        match outcome {
            Outcome::FixedPoint => {
                trace.emit(EventKind::RunConverged {
                    passes,
                    parcel_count: store.len(),
                });
            }
            Outcome::PassLimitReached => {
                warn!(passes, "pass limit reached before convergence");
                trace.emit(EventKind::PassLimitReached { passes });
            }
        }

        Ok(RunResult {
            store,
            outcome,
            passes,
            trace,
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// One full scan over the node list. Returns how many parcels were inserted.
fn run_pass(nodes: &[Arc<dyn Node>], store: &ParcelStore, trace: &Trace) -> usize {
    let mut inserted = 0;

    for node in nodes {
        if !node.is_ready(store) {
            continue;
        }

        let fan_out = fan_out_indices(node.as_ref(), store);
        if fan_out.is_empty() {
            inserted += run_invocation(node.as_ref(), store, trace, None);
        } else {
            for index in fan_out {
                inserted += run_invocation(node.as_ref(), store, trace, Some(index));
            }
        }
    }

    inserted
}

/// The fan-out set: every family index present for a required base that has
/// no exact parcel. An exact match suppresses fan-out for that base, even if
/// indexed parcels exist alongside it. Ascending, de-duplicated.
fn fan_out_indices(node: &dyn Node, store: &ParcelStore) -> Vec<usize> {
    let mut indices: Vec<usize> = node
        .requires()
        .iter()
        .filter(|base| !store.contains_plain(base))
        .flat_map(|base| store.indices(base))
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Run one invocation of a node (for one index, or unindexed) and publish
/// its outputs. Returns how many parcels were inserted.
fn run_invocation(
    node: &dyn Node,
    store: &ParcelStore,
    trace: &Trace,
    index: Option<usize>,
) -> usize {
    // Skip once any relevant output exists: the node is permanently done for
    // this slot.
    let already_done = node.outputs().iter().any(|out| match index {
        Some(i) => store.contains(&ParcelKey::indexed(Arc::clone(out), i)),
        None => store.contains_plain(out),
    });
    if already_done {
        return 0;
    }

    debug!(node = node.id(), ?index, "executing");
    trace.emit(EventKind::NodeExecuted {
        node_id: node.id().into(),
        index,
    });

    // Same containment as Node::execute_guarded, inlined so the failure can
    // be traced.
    let outputs = match node.execute(store, index) {
        Ok(outputs) => outputs,
        Err(err) => {
            warn!(node = node.id(), error = %err, "node failed; contained as error parcel");
            trace.emit(EventKind::NodeFailed {
                node_id: node.id().into(),
                error: err.to_string(),
                index,
            });
            error_outputs(node.id(), &err)
        }
    };

    let mut inserted = 0;
    for (key, value) in outputs {
        let rendered: Arc<str> = key.to_string().into();
        if store.insert(Parcel::produced(key, value, node.id())) {
            trace.emit(EventKind::ParcelCreated {
                key: rendered,
                producer: Some(node.id().into()),
            });
            inserted += 1;
        } else {
            // First writer wins; later writers are logged, never merged.
            trace.emit(EventKind::CollisionIgnored {
                key: rendered,
                node_id: node.id().into(),
            });
        }
    }

    inserted
}

fn parse_seed_name(name: &str) -> Result<ParcelKey, EngineError> {
    if name.is_empty() {
        return Err(EngineError::InvalidSeedName {
            name: name.to_string(),
            reason: "name is empty".to_string(),
        });
    }
    Ok(ParcelKey::parse(name))
}
