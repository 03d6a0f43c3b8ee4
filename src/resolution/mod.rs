/*!
 * Deadlock Resolution
 * Victim selection and preemption until the graph is cycle-free
 */

mod selector;

pub use selector::{PolicySelector, VictimSelector};

use crate::core::types::NodeId;
use crate::detection::{Cycle, Detector};
use crate::graph::GraphStore;
use crate::metadata::{MetadataStore, ProcessMetadata};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

/// A process preempted to break a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victim {
    pub process: NodeId,
    pub metadata: ProcessMetadata,
    /// The cycle the victim was chosen from
    pub cycle: Vec<NodeId>,
    /// Resources freed by the removal
    pub released: Vec<NodeId>,
    /// Detection round (starting at 1) in which the victim was removed
    pub round: usize,
}

/// Outcome of a resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub victims: Vec<Victim>,
    /// Detection rounds that found at least one cycle
    pub rounds: usize,
}

impl ResolutionReport {
    /// Whether anything was preempted
    pub fn resolved_any(&self) -> bool {
        !self.victims.is_empty()
    }

    pub fn victim_ids(&self) -> Vec<&str> {
        self.victims.iter().map(|v| v.process.as_str()).collect()
    }
}

/// Breaks every cycle by removing one victim per detected cycle, then re-detecting
#[derive(Debug, Clone, Default)]
pub struct Resolver<S = PolicySelector> {
    detector: Detector,
    selector: S,
}

impl Resolver<PolicySelector> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: VictimSelector> Resolver<S> {
    pub fn with_selector(selector: S) -> Self {
        Self {
            detector: Detector::new(),
            selector,
        }
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Preempt victims until no cycle remains
    ///
    /// Each round removes at least one process, so the loop runs at most
    /// once per process in the graph.
    pub fn resolve(&self, graph: &mut GraphStore, metadata: &MetadataStore) -> ResolutionReport {
        let span = info_span!("resolve_deadlock", processes = graph.process_count());
        let _enter = span.enter();

        let mut report = ResolutionReport::default();
        let max_rounds = graph.process_count();

        while report.rounds < max_rounds {
            let detection = self.detector.detect(graph);
            if !detection.is_deadlocked() {
                break;
            }
            report.rounds += 1;

            let mut removed_this_round = 0;
            for cycle in &detection.cycles {
                if let Some(victim) = self.preempt(graph, metadata, cycle, report.rounds) {
                    report.victims.push(victim);
                    removed_this_round += 1;
                }
            }

            if removed_this_round == 0 {
                warn!("Cycles remain but none contains a process; stopping");
                break;
            }
        }

        if report.resolved_any() {
            info!(
                victims = %report.victim_ids().join(", "),
                rounds = report.rounds,
                "Deadlock resolved"
            );
        }
        report
    }

    fn preempt(
        &self,
        graph: &mut GraphStore,
        metadata: &MetadataStore,
        cycle: &Cycle,
        round: usize,
    ) -> Option<Victim> {
        let chosen = self.selector.select(&cycle.processes, metadata)?.clone();
        let chosen_metadata = metadata.get(chosen.as_str());

        // Cycles from one detection pass are disjoint, so earlier removals
        // in the same round never touch this one.
        let released = match graph.remove_process(chosen.as_str()) {
            Ok(released) => released,
            Err(e) => {
                warn!(process = %chosen, error = %e, "Failed to preempt victim");
                return None;
            }
        };

        info!(
            process = %chosen,
            priority = chosen_metadata.priority,
            runtime = chosen_metadata.runtime,
            released = released.len(),
            round,
            "Victim preempted"
        );

        Some(Victim {
            process: chosen,
            metadata: chosen_metadata,
            cycle: cycle.nodes.clone(),
            released,
            round,
        })
    }
}
