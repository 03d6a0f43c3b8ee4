/*!
 * Graph Types
 * Edge kinds, mutation outcomes and the read-only snapshot handed to renderers
 */

use crate::core::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a directed edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Resource → Process: the resource is held by the process
    Assignment,
    /// Process → Resource: the process waits for the resource
    Request,
}

/// A directed edge between a process and a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            EdgeKind::Assignment => "held-by",
            EdgeKind::Request => "waits-for",
        };
        write!(f, "{} -[{}]-> {}", self.from, label, self.to)
    }
}

/// Effect of an `allocate` or `request` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EdgeOutcome {
    /// The resource was free and is now held by the process
    Granted,
    /// The resource moved from `previous` to the process
    Reassigned { previous: NodeId },
    /// The process already held the resource; nothing changed
    AlreadyHeld,
    /// A request edge was recorded
    Waiting,
    /// The request edge already existed
    AlreadyWaiting,
    /// An identifier was unknown and the store is configured to ignore it
    Ignored,
}

impl EdgeOutcome {
    /// Whether the process holds the resource after the call
    pub fn is_held(&self) -> bool {
        matches!(
            self,
            EdgeOutcome::Granted | EdgeOutcome::Reassigned { .. } | EdgeOutcome::AlreadyHeld
        )
    }
}

/// Owned, sorted view of the graph for rendering
///
/// Produced by value: mutating a snapshot never reaches back into the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub processes: Vec<NodeId>,
    pub resources: Vec<NodeId>,
    pub edges: Vec<Edge>,
    /// Node → directly reachable nodes, including nodes with no out-edges
    pub adjacency: BTreeMap<NodeId, Vec<NodeId>>,
}

impl GraphSnapshot {
    pub fn node_count(&self) -> usize {
        self.processes.len() + self.resources.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}
