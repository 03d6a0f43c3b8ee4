/*!
 * Victim Selection
 * Deterministic choice of the process to preempt from a cycle
 */

use crate::core::config::RuntimeTieBreak;
use crate::core::types::NodeId;
use crate::metadata::MetadataStore;
use std::cmp::{Ordering, Reverse};

/// Chooses which cycle participant to preempt
pub trait VictimSelector {
    /// Pick one of `candidates`, or `None` when the slice is empty
    fn select<'a>(&self, candidates: &'a [NodeId], metadata: &MetadataStore) -> Option<&'a NodeId>;
}

/// Lowest priority first, then runtime per `tie_break`, then smallest id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicySelector {
    tie_break: RuntimeTieBreak,
}

impl PolicySelector {
    pub const fn new(tie_break: RuntimeTieBreak) -> Self {
        Self { tie_break }
    }

    pub fn tie_break(&self) -> RuntimeTieBreak {
        self.tie_break
    }

    /// Ordering in which `Less` means "more expendable"
    fn compare(&self, a: &NodeId, b: &NodeId, metadata: &MetadataStore) -> Ordering {
        let ma = metadata.get(a.as_str());
        let mb = metadata.get(b.as_str());

        let runtime = match self.tie_break {
            RuntimeTieBreak::LongestRuntimeFirst => Reverse(ma.runtime).cmp(&Reverse(mb.runtime)),
            RuntimeTieBreak::ShortestRuntimeFirst => ma.runtime.cmp(&mb.runtime),
        };

        ma.priority
            .cmp(&mb.priority)
            .then(runtime)
            .then_with(|| a.cmp(b))
    }
}

impl VictimSelector for PolicySelector {
    fn select<'a>(&self, candidates: &'a [NodeId], metadata: &MetadataStore) -> Option<&'a NodeId> {
        candidates
            .iter()
            .min_by(|a, b| self.compare(a, b, metadata))
    }
}
