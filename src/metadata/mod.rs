/*!
 * Process Metadata
 * Priority and runtime estimates consulted only by the resolver
 */

use crate::core::errors::RagResult;
use crate::core::limits::{DEFAULT_PRIORITY, DEFAULT_RUNTIME};
use crate::core::types::{NodeId, Priority, Runtime};
use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Per-process attributes used for victim selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessMetadata {
    /// Higher is more important; the lowest priority is preempted first
    pub priority: Priority,
    /// Estimated remaining execution units
    pub runtime: Runtime,
}

impl Default for ProcessMetadata {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY,
            runtime: DEFAULT_RUNTIME,
        }
    }
}

impl ProcessMetadata {
    pub const fn new(priority: Priority, runtime: Runtime) -> Self {
        Self { priority, runtime }
    }

    /// Parse user-entered text, falling back to defaults field by field
    ///
    /// Never fails: blank or non-integer input yields the default for that field.
    pub fn parse(priority: &str, runtime: &str) -> Self {
        Self {
            priority: parse_or(priority, DEFAULT_PRIORITY),
            runtime: parse_or(runtime, DEFAULT_RUNTIME),
        }
    }
}

fn parse_or(raw: &str, default: i64) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default;
    }
    trimmed.parse().unwrap_or_else(|_| {
        debug!(default, input = %raw, "Falling back to default for non-numeric input");
        default
    })
}

/// Metadata keyed by process identity
///
/// Entries outlive graph membership: removing a process from the graph keeps
/// its record so a re-added process resumes with the same attributes.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    entries: HashMap<NodeId, ProcessMetadata, RandomState>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert typed attributes
    pub fn set(&mut self, process: &str, metadata: ProcessMetadata) -> RagResult<()> {
        let id = NodeId::parse(process)?;
        info!(
            process = %id,
            priority = metadata.priority,
            runtime = metadata.runtime,
            "Metadata set"
        );
        self.entries.insert(id, metadata);
        Ok(())
    }

    /// Upsert attributes from raw text, tolerating malformed numbers
    pub fn set_metadata(
        &mut self,
        process: &str,
        priority: &str,
        runtime: &str,
    ) -> RagResult<ProcessMetadata> {
        let metadata = ProcessMetadata::parse(priority, runtime);
        self.set(process, metadata)?;
        Ok(metadata)
    }

    /// Stored attributes, or the defaults for a process never given any
    pub fn get(&self, process: &str) -> ProcessMetadata {
        self.entries
            .get(process.trim())
            .copied()
            .unwrap_or_default()
    }

    pub fn contains(&self, process: &str) -> bool {
        self.entries.contains_key(process.trim())
    }

    /// Explicitly forget a process
    pub fn remove(&mut self, process: &str) -> Option<ProcessMetadata> {
        self.entries.remove(process.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by process id
    pub fn entries(&self) -> Vec<(&NodeId, &ProcessMetadata)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
