/*!
 * Core Types
 * Identifiers and node classification shared across the graph, detector and resolver
 */

use super::data_structures::InlineString;
use super::errors::{RagError, RagResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Process priority (higher is more important, lower is preempted first)
pub type Priority = i64;

/// Estimated remaining execution units
pub type Runtime = i64;

/// Identifier of a node in the resource allocation graph
///
/// Processes and resources share one identifier space. Identifiers are
/// trimmed on construction and must not be empty.
///
/// Hashing and ordering go through the string slice so that maps keyed by
/// `NodeId` can be queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(InlineString);

impl NodeId {
    /// Validate and build an identifier from user input
    pub fn parse(raw: &str) -> RagResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RagError::InvalidIdentifier(raw.into()));
        }
        Ok(Self(InlineString::from(trimmed)))
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Hash for NodeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::borrow::Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Kind of a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Process,
    Resource,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Process => write!(f, "process"),
            NodeKind::Resource => write!(f, "resource"),
        }
    }
}
