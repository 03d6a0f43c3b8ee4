/*!
 * Graph Store
 * Owns process/resource nodes and the assignment/request edges between them
 */

use super::types::{Edge, EdgeKind, EdgeOutcome, GraphSnapshot};
use crate::core::config::{RagConfig, RequestPolicy, UnknownEntityPolicy};
use crate::core::errors::{RagError, RagResult};
use crate::core::types::{NodeId, NodeKind};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Directed adjacency over the combined process and resource node space
pub type Adjacency = BTreeMap<NodeId, BTreeSet<NodeId>>;

/// Resource allocation graph with single-instance resources
///
/// Out-edges of a resource are assignments and out-edges of a process are
/// requests, so one adjacency map encodes both edge kinds unambiguously.
/// A resource therefore has at most one successor: its current holder.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    config: RagConfig,
    kinds: BTreeMap<NodeId, NodeKind>,
    outgoing: Adjacency,
    incoming: Adjacency,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RagConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Insert a process node; returns false if it already existed
    pub fn add_process(&mut self, id: &str) -> RagResult<bool> {
        self.add_node(id, NodeKind::Process)
    }

    /// Insert a resource node; returns false if it already existed
    pub fn add_resource(&mut self, id: &str) -> RagResult<bool> {
        self.add_node(id, NodeKind::Resource)
    }

    fn add_node(&mut self, raw: &str, kind: NodeKind) -> RagResult<bool> {
        let id = NodeId::parse(raw)?;
        match self.kinds.get(&id) {
            Some(existing) if *existing == kind => {
                debug!(node = %id, %kind, "Node already present");
                Ok(false)
            }
            Some(existing) => Err(RagError::KindConflict {
                id: id.as_str().into(),
                existing: *existing,
            }),
            None => {
                info!(node = %id, %kind, "Node added");
                self.outgoing.insert(id.clone(), BTreeSet::new());
                self.incoming.insert(id.clone(), BTreeSet::new());
                self.kinds.insert(id, kind);
                Ok(true)
            }
        }
    }

    /// Delete a process and every edge touching it
    ///
    /// Returns the resources the process held, which are now free.
    pub fn remove_process(&mut self, id: &str) -> RagResult<Vec<NodeId>> {
        let Some(pid) = self.lookup(id, NodeKind::Process)? else {
            return Ok(Vec::new());
        };
        let released: Vec<NodeId> = self.incoming_of(&pid).cloned().collect();
        self.remove_node(&pid);
        info!(process = %pid, released = released.len(), "Process removed");
        Ok(released)
    }

    /// Delete a resource and every edge touching it
    ///
    /// Returns the holder (if any) that lost it.
    pub fn remove_resource(&mut self, id: &str) -> RagResult<Option<NodeId>> {
        let Some(rid) = self.lookup(id, NodeKind::Resource)? else {
            return Ok(None);
        };
        let holder = self.holder_of(&rid).cloned();
        self.remove_node(&rid);
        info!(resource = %rid, "Resource removed");
        Ok(holder)
    }

    fn remove_node(&mut self, id: &NodeId) {
        if let Some(targets) = self.outgoing.remove(id) {
            for target in &targets {
                if let Some(sources) = self.incoming.get_mut(target) {
                    sources.remove(id);
                }
            }
        }
        if let Some(sources) = self.incoming.remove(id) {
            for source in &sources {
                if let Some(targets) = self.outgoing.get_mut(source) {
                    targets.remove(id);
                }
            }
        }
        self.kinds.remove(id);
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Assign `resource` to `process`
    ///
    /// A resource held elsewhere moves to the new holder, and a pending
    /// request from this process for the resource is satisfied.
    pub fn allocate(&mut self, process: &str, resource: &str) -> RagResult<EdgeOutcome> {
        let Some((pid, rid)) = self.lookup_pair(process, resource)? else {
            return Ok(EdgeOutcome::Ignored);
        };
        Ok(self.assign(pid, rid))
    }

    fn assign(&mut self, pid: NodeId, rid: NodeId) -> EdgeOutcome {
        self.unlink(&pid, &rid);

        let previous = self.holder_of(&rid).cloned();
        let outcome = match previous {
            Some(holder) if holder == pid => return EdgeOutcome::AlreadyHeld,
            Some(holder) => {
                self.unlink(&rid, &holder);
                EdgeOutcome::Reassigned { previous: holder }
            }
            None => EdgeOutcome::Granted,
        };

        info!(process = %pid, resource = %rid, ?outcome, "Resource allocated");
        self.link(rid, pid);
        outcome
    }

    /// Record that `process` waits for `resource`
    ///
    /// With `RequestPolicy::GrantIfFree` a free resource is assigned instead.
    pub fn request(&mut self, process: &str, resource: &str) -> RagResult<EdgeOutcome> {
        let Some((pid, rid)) = self.lookup_pair(process, resource)? else {
            return Ok(EdgeOutcome::Ignored);
        };

        match self.holder_of(&rid).cloned() {
            Some(holder) if holder == pid => return Ok(EdgeOutcome::AlreadyHeld),
            None if self.config.request == RequestPolicy::GrantIfFree => {
                return Ok(self.assign(pid, rid));
            }
            _ => {}
        }

        if self.has_edge(&pid, &rid) {
            return Ok(EdgeOutcome::AlreadyWaiting);
        }
        info!(process = %pid, resource = %rid, "Resource requested");
        self.link(pid, rid);
        Ok(EdgeOutcome::Waiting)
    }

    /// Drop the assignment of `resource` to `process`; returns false if it was not held
    pub fn release(&mut self, process: &str, resource: &str) -> RagResult<bool> {
        let Some((pid, rid)) = self.lookup_pair(process, resource)? else {
            return Ok(false);
        };
        let released = self.unlink(&rid, &pid);
        if released {
            info!(process = %pid, resource = %rid, "Resource released");
        }
        Ok(released)
    }

    /// Withdraw a pending request; returns false if none existed
    pub fn cancel_request(&mut self, process: &str, resource: &str) -> RagResult<bool> {
        let Some((pid, rid)) = self.lookup_pair(process, resource)? else {
            return Ok(false);
        };
        let cancelled = self.unlink(&pid, &rid);
        if cancelled {
            info!(process = %pid, resource = %rid, "Request cancelled");
        }
        Ok(cancelled)
    }

    fn link(&mut self, from: NodeId, to: NodeId) {
        self.incoming.entry(to.clone()).or_default().insert(from.clone());
        self.outgoing.entry(from).or_default().insert(to);
    }

    fn unlink(&mut self, from: &NodeId, to: &NodeId) -> bool {
        let removed = self
            .outgoing
            .get_mut(from)
            .map(|targets| targets.remove(to))
            .unwrap_or(false);
        if removed {
            if let Some(sources) = self.incoming.get_mut(to) {
                sources.remove(from);
            }
        }
        removed
    }

    fn has_edge(&self, from: &NodeId, to: &NodeId) -> bool {
        self.outgoing
            .get(from)
            .map(|targets| targets.contains(to))
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Resolve an identifier of the expected kind, applying the unknown-entity policy
    ///
    /// `Ok(None)` means the identifier is unknown and the store ignores it.
    fn lookup(&self, raw: &str, kind: NodeKind) -> RagResult<Option<NodeId>> {
        let id = NodeId::parse(raw)?;
        if self.kinds.get(&id) == Some(&kind) {
            return Ok(Some(id));
        }
        match self.config.unknown_entity {
            UnknownEntityPolicy::Reject => Err(RagError::unknown(kind, id.as_str())),
            UnknownEntityPolicy::Ignore => {
                debug!(node = %id, %kind, "Ignoring unknown node");
                Ok(None)
            }
        }
    }

    fn lookup_pair(&self, process: &str, resource: &str) -> RagResult<Option<(NodeId, NodeId)>> {
        let pid = self.lookup(process, NodeKind::Process)?;
        let rid = self.lookup(resource, NodeKind::Resource)?;
        Ok(pid.zip(rid))
    }

    fn holder_of(&self, resource: &NodeId) -> Option<&NodeId> {
        self.outgoing.get(resource).and_then(|t| t.iter().next())
    }

    fn incoming_of<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.incoming.get(id).into_iter().flatten()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn kind(&self, id: &str) -> Option<NodeKind> {
        self.kinds.get(id).copied()
    }

    pub fn contains_process(&self, id: &str) -> bool {
        self.kind(id) == Some(NodeKind::Process)
    }

    pub fn contains_resource(&self, id: &str) -> bool {
        self.kind(id) == Some(NodeKind::Resource)
    }

    /// Current holder of a resource
    pub fn holder(&self, resource: &str) -> Option<&NodeId> {
        match self.kinds.get(resource) {
            Some(NodeKind::Resource) => self.outgoing.get(resource)?.iter().next(),
            _ => None,
        }
    }

    /// Resources held by a process
    pub fn held_by(&self, process: &str) -> Vec<&NodeId> {
        match self.kinds.get(process) {
            Some(NodeKind::Process) => self.incoming.get(process).into_iter().flatten().collect(),
            _ => Vec::new(),
        }
    }

    /// Resources a process is waiting for
    pub fn requests_of(&self, process: &str) -> Vec<&NodeId> {
        match self.kinds.get(process) {
            Some(NodeKind::Process) => self.outgoing.get(process).into_iter().flatten().collect(),
            _ => Vec::new(),
        }
    }

    /// Processes waiting for a resource
    pub fn waiters(&self, resource: &str) -> Vec<&NodeId> {
        match self.kinds.get(resource) {
            Some(NodeKind::Resource) => self.incoming.get(resource).into_iter().flatten().collect(),
            _ => Vec::new(),
        }
    }

    pub fn processes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes_of(NodeKind::Process)
    }

    pub fn resources(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes_of(NodeKind::Resource)
    }

    fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &NodeId> {
        self.kinds
            .iter()
            .filter(move |(_, k)| **k == kind)
            .map(|(id, _)| id)
    }

    pub fn process_count(&self) -> usize {
        self.processes().count()
    }

    pub fn resource_count(&self) -> usize {
        self.resources().count()
    }

    pub fn node_count(&self) -> usize {
        self.kinds.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(BTreeSet::len).sum()
    }

    /// Read-only adjacency used by the detector
    pub fn adjacency(&self) -> &Adjacency {
        &self.outgoing
    }

    /// Owned view of the current graph for rendering
    pub fn snapshot(&self) -> GraphSnapshot {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (from, targets) in &self.outgoing {
            let kind = match self.kinds.get(from) {
                Some(NodeKind::Resource) => EdgeKind::Assignment,
                _ => EdgeKind::Request,
            };
            edges.extend(targets.iter().map(|to| Edge {
                from: from.clone(),
                to: to.clone(),
                kind,
            }));
        }

        GraphSnapshot {
            processes: self.processes().cloned().collect(),
            resources: self.resources().cloned().collect(),
            edges,
            adjacency: self
                .outgoing
                .iter()
                .map(|(id, targets)| (id.clone(), targets.iter().cloned().collect()))
                .collect(),
        }
    }
}
