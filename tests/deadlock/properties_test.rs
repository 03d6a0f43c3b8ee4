/*!
 * Property Tests
 * Invariants that hold for arbitrary sequences of graph operations
 */

use proptest::prelude::*;
use rag_deadlock::{DeadlockSystem, EdgeKind};
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Allocate(usize, usize),
    Request(usize, usize),
    Remove(usize),
}

const PROCESSES: usize = 6;
const RESOURCES: usize = 6;

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..PROCESSES, 0..RESOURCES).prop_map(|(p, r)| Op::Allocate(p, r)),
        (0..PROCESSES, 0..RESOURCES).prop_map(|(p, r)| Op::Request(p, r)),
        (0..PROCESSES).prop_map(Op::Remove),
    ]
}

fn build(ops: &[Op], priorities: &[i64]) -> DeadlockSystem {
    let mut system = DeadlockSystem::default();
    for (p, priority) in priorities.iter().enumerate() {
        system
            .add_process_with_metadata(&format!("P{}", p), &priority.to_string(), "")
            .unwrap();
    }
    for r in 0..RESOURCES {
        system.add_resource(&format!("R{}", r)).unwrap();
    }
    for op in ops {
        match *op {
            // Removed processes are unknown afterwards; errors are expected and skipped
            Op::Allocate(p, r) => {
                let _ = system.allocate(&format!("P{}", p), &format!("R{}", r));
            }
            Op::Request(p, r) => {
                let _ = system.request(&format!("P{}", p), &format!("R{}", r));
            }
            Op::Remove(p) => {
                let _ = system.remove_process(&format!("P{}", p));
            }
        }
    }
    system
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn single_instance_invariant_holds(
        ops in prop::collection::vec(op_strategy(), 0..40),
        priorities in prop::collection::vec(0i64..10, PROCESSES),
    ) {
        let system = build(&ops, &priorities);
        let mut holders: HashMap<String, usize> = HashMap::new();
        for edge in system.snapshot().edges {
            if edge.kind == EdgeKind::Assignment {
                *holders.entry(edge.from.to_string()).or_default() += 1;
            }
        }
        prop_assert!(holders.values().all(|&count| count == 1));
    }

    #[test]
    fn resolve_leaves_no_cycle(
        ops in prop::collection::vec(op_strategy(), 0..40),
        priorities in prop::collection::vec(0i64..10, PROCESSES),
    ) {
        let mut system = build(&ops, &priorities);
        let before = system.detect_deadlock();
        let deadlocked: Vec<String> = before
            .deadlocked_processes()
            .into_iter()
            .map(|p| p.to_string())
            .collect();

        let report = system.resolve_deadlock();
        prop_assert!(!system.is_deadlocked());

        // Only processes that sat in a deadlocked component are preempted
        for victim in &report.victims {
            prop_assert!(deadlocked.contains(&victim.process.to_string()));
        }
        prop_assert!(report.victims.len() >= before.cycles.len());
        prop_assert_eq!(report.victims.is_empty(), !before.is_deadlocked());
    }

    #[test]
    fn resolution_is_deterministic(
        ops in prop::collection::vec(op_strategy(), 0..40),
        priorities in prop::collection::vec(0i64..3, PROCESSES),
    ) {
        let first = build(&ops, &priorities).resolve_deadlock();
        let second = build(&ops, &priorities).resolve_deadlock();
        prop_assert_eq!(first, second);
    }
}
