/*!
 * Deadlock System
 * Owning facade over the graph and metadata stores, plus a single-lock
 * shared handle for concurrent hosts
 */

use crate::core::config::RagConfig;
use crate::core::errors::RagResult;
use crate::core::types::NodeId;
use crate::detection::{DeadlockReport, Detector};
use crate::graph::{EdgeOutcome, GraphSnapshot, GraphStore};
use crate::metadata::{MetadataStore, ProcessMetadata};
use crate::resolution::{PolicySelector, ResolutionReport, Resolver};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Graph store, metadata store, detector and resolver under one owner
///
/// All operations run to completion synchronously. The struct performs no
/// locking of its own; wrap it in [`SharedSystem`] to share it.
#[derive(Debug, Clone)]
pub struct DeadlockSystem {
    config: RagConfig,
    graph: GraphStore,
    metadata: MetadataStore,
    detector: Detector,
    resolver: Resolver<PolicySelector>,
}

impl Default for DeadlockSystem {
    fn default() -> Self {
        Self::new(RagConfig::default())
    }
}

impl DeadlockSystem {
    pub fn new(config: RagConfig) -> Self {
        Self {
            config,
            graph: GraphStore::with_config(config),
            metadata: MetadataStore::new(),
            detector: Detector::new(),
            resolver: Resolver::with_selector(PolicySelector::new(config.tie_break)),
        }
    }

    /// Build from `RAG_*` environment variables
    pub fn from_env() -> RagResult<Self> {
        Ok(Self::new(RagConfig::from_env()?))
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    // Graph store

    pub fn add_process(&mut self, id: &str) -> RagResult<bool> {
        self.graph.add_process(id)
    }

    /// Create a process and record its attributes from raw text in one step
    ///
    /// Malformed numbers fall back to defaults; the process is created regardless.
    pub fn add_process_with_metadata(
        &mut self,
        id: &str,
        priority: &str,
        runtime: &str,
    ) -> RagResult<ProcessMetadata> {
        self.graph.add_process(id)?;
        self.metadata.set_metadata(id, priority, runtime)
    }

    pub fn add_resource(&mut self, id: &str) -> RagResult<bool> {
        self.graph.add_resource(id)
    }

    pub fn allocate(&mut self, process: &str, resource: &str) -> RagResult<EdgeOutcome> {
        self.graph.allocate(process, resource)
    }

    pub fn request(&mut self, process: &str, resource: &str) -> RagResult<EdgeOutcome> {
        self.graph.request(process, resource)
    }

    pub fn release(&mut self, process: &str, resource: &str) -> RagResult<bool> {
        self.graph.release(process, resource)
    }

    pub fn cancel_request(&mut self, process: &str, resource: &str) -> RagResult<bool> {
        self.graph.cancel_request(process, resource)
    }

    /// Remove a process from the graph; its metadata is kept
    pub fn remove_process(&mut self, id: &str) -> RagResult<Vec<NodeId>> {
        self.graph.remove_process(id)
    }

    pub fn remove_resource(&mut self, id: &str) -> RagResult<Option<NodeId>> {
        self.graph.remove_resource(id)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.graph.snapshot()
    }

    // Metadata store

    pub fn set_metadata(
        &mut self,
        process: &str,
        priority: &str,
        runtime: &str,
    ) -> RagResult<ProcessMetadata> {
        self.metadata.set_metadata(process, priority, runtime)
    }

    pub fn set_process_metadata(&mut self, process: &str, metadata: ProcessMetadata) -> RagResult<()> {
        self.metadata.set(process, metadata)
    }

    pub fn get_metadata(&self, process: &str) -> ProcessMetadata {
        self.metadata.get(process)
    }

    // Detection and resolution

    pub fn detect_deadlock(&self) -> DeadlockReport {
        self.detector.detect(&self.graph)
    }

    pub fn is_deadlocked(&self) -> bool {
        self.detector.is_deadlocked(&self.graph)
    }

    pub fn resolve_deadlock(&mut self) -> ResolutionReport {
        self.resolver.resolve(&mut self.graph, &self.metadata)
    }

    /// Detect, and resolve only if a deadlock was found
    ///
    /// Returns the detection report together with the resolution, if any ran.
    pub fn detect_and_resolve(&mut self) -> (DeadlockReport, Option<ResolutionReport>) {
        let detection = self.detect_deadlock();
        if !detection.is_deadlocked() {
            return (detection, None);
        }
        let resolution = self.resolve_deadlock();
        (detection, Some(resolution))
    }
}

/// One lock guarding both stores for hosts issuing calls from many threads
///
/// Mutations take the write lock; detection and snapshots share the read lock.
#[derive(Debug, Clone, Default)]
pub struct SharedSystem {
    inner: Arc<RwLock<DeadlockSystem>>,
}

impl SharedSystem {
    pub fn new(system: DeadlockSystem) -> Self {
        Self {
            inner: Arc::new(RwLock::new(system)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, DeadlockSystem> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, DeadlockSystem> {
        self.inner.write()
    }

    pub fn add_process_with_metadata(
        &self,
        id: &str,
        priority: &str,
        runtime: &str,
    ) -> RagResult<ProcessMetadata> {
        self.write().add_process_with_metadata(id, priority, runtime)
    }

    pub fn add_resource(&self, id: &str) -> RagResult<bool> {
        self.write().add_resource(id)
    }

    pub fn allocate(&self, process: &str, resource: &str) -> RagResult<EdgeOutcome> {
        self.write().allocate(process, resource)
    }

    pub fn request(&self, process: &str, resource: &str) -> RagResult<EdgeOutcome> {
        self.write().request(process, resource)
    }

    pub fn detect_deadlock(&self) -> DeadlockReport {
        self.read().detect_deadlock()
    }

    pub fn resolve_deadlock(&self) -> ResolutionReport {
        self.write().resolve_deadlock()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.read().snapshot()
    }
}
