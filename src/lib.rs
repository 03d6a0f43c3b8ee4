/*!
 * Resource Allocation Graph
 * Deadlock detection and resolution over single-instance resources
 */

pub mod core;
pub mod detection;
pub mod graph;
pub mod metadata;
pub mod monitoring;
pub mod resolution;
pub mod system;

// Re-exports
pub use crate::core::{
    NodeId, NodeKind, Priority, RagConfig, RagError, RagResult, RequestPolicy, Runtime,
    RuntimeTieBreak, UnknownEntityPolicy,
};
pub use detection::{Cycle, DeadlockReport, Detector};
pub use graph::{Edge, EdgeKind, EdgeOutcome, GraphSnapshot, GraphStore};
pub use metadata::{MetadataStore, ProcessMetadata};
pub use monitoring::init_tracing;
pub use resolution::{PolicySelector, ResolutionReport, Resolver, Victim, VictimSelector};
pub use system::{DeadlockSystem, SharedSystem};
