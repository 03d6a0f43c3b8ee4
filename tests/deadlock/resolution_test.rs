/*!
 * Resolver Tests
 * Victim selection and preemption until the graph is cycle-free
 */

use pretty_assertions::assert_eq;
use rag_deadlock::{DeadlockSystem, ProcessMetadata, RagConfig, RuntimeTieBreak};

fn deadlocked_pair(system: &mut DeadlockSystem, p1: &str, p2: &str, r1: &str, r2: &str) {
    system.add_resource(r1).unwrap();
    system.add_resource(r2).unwrap();
    system.allocate(p1, r1).unwrap();
    system.allocate(p2, r2).unwrap();
    system.request(p1, r2).unwrap();
    system.request(p2, r1).unwrap();
}

#[test]
fn test_classic_scenario() {
    let mut system = DeadlockSystem::default();
    system.add_process("P1").unwrap();
    system.add_process("P2").unwrap();
    deadlocked_pair(&mut system, "P1", "P2", "R1", "R2");

    assert!(system.is_deadlocked());
    let report = system.resolve_deadlock();

    // Equal default metadata: identifier order decides
    assert_eq!(report.victim_ids(), vec!["P1"]);
    assert!(!system.is_deadlocked());
    assert!(system.graph().contains_process("P2"));
}

#[test]
fn test_priority_decides_victim() {
    let mut system = DeadlockSystem::default();
    system.add_process_with_metadata("P1", "9", "").unwrap();
    system.add_process_with_metadata("P2", "2", "").unwrap();
    deadlocked_pair(&mut system, "P1", "P2", "R1", "R2");

    let report = system.resolve_deadlock();
    assert_eq!(report.victim_ids(), vec!["P2"]);
    assert_eq!(report.victims[0].metadata, ProcessMetadata::new(2, 5));
    assert_eq!(report.victims[0].released, vec!["R2"]);
}

#[test]
fn test_runtime_breaks_priority_tie() {
    let mut system = DeadlockSystem::default();
    system.add_process_with_metadata("P1", "5", "3").unwrap();
    system.add_process_with_metadata("P2", "5", "12").unwrap();
    deadlocked_pair(&mut system, "P1", "P2", "R1", "R2");

    assert_eq!(system.resolve_deadlock().victim_ids(), vec!["P2"]);
}

#[test]
fn test_shortest_runtime_configuration() {
    let config = RagConfig::default().with_tie_break(RuntimeTieBreak::ShortestRuntimeFirst);
    let mut system = DeadlockSystem::new(config);
    system.add_process_with_metadata("P1", "5", "3").unwrap();
    system.add_process_with_metadata("P2", "5", "12").unwrap();
    deadlocked_pair(&mut system, "P1", "P2", "R1", "R2");

    assert_eq!(system.resolve_deadlock().victim_ids(), vec!["P1"]);
}

#[test]
fn test_one_victim_per_disjoint_cycle() {
    let mut system = DeadlockSystem::default();
    for (p, priority) in [("A", "1"), ("B", "4"), ("C", "6"), ("D", "3"), ("E", "0")] {
        system.add_process_with_metadata(p, priority, "").unwrap();
    }
    deadlocked_pair(&mut system, "A", "B", "R1", "R2");
    deadlocked_pair(&mut system, "C", "D", "R3", "R4");
    system.add_resource("R5").unwrap();
    system.allocate("E", "R5").unwrap();

    let report = system.resolve_deadlock();
    assert_eq!(report.victim_ids(), vec!["A", "D"]);
    assert_eq!(report.rounds, 1);
    // E has the lowest priority but was never deadlocked
    assert!(system.graph().contains_process("E"));
    assert!(!system.is_deadlocked());
}

#[test]
fn test_overlapping_cycles_take_extra_rounds() {
    // P1 is in a cycle with P2 and another with P3; P2 and P3 are the cheapest
    let mut system = DeadlockSystem::default();
    system.add_process_with_metadata("P1", "9", "").unwrap();
    system.add_process_with_metadata("P2", "1", "").unwrap();
    system.add_process_with_metadata("P3", "2", "").unwrap();
    for r in ["R1", "R2", "R3"] {
        system.add_resource(r).unwrap();
    }
    system.allocate("P1", "R1").unwrap();
    system.allocate("P2", "R2").unwrap();
    system.allocate("P3", "R3").unwrap();
    system.request("P1", "R2").unwrap();
    system.request("P1", "R3").unwrap();
    system.request("P2", "R1").unwrap();
    system.request("P3", "R1").unwrap();

    let report = system.resolve_deadlock();
    assert!(!system.is_deadlocked());
    assert!(report.victims.len() <= 2);
    assert!(system.graph().contains_process("P1"));
    assert!(report.victims.iter().all(|v| v.process != "P1"));
}

#[test]
fn test_resolution_is_deterministic() {
    let build = || {
        let mut system = DeadlockSystem::default();
        for p in ["P3", "P1", "P2"] {
            system.add_process_with_metadata(p, "4", "4").unwrap();
        }
        for r in ["R1", "R2", "R3"] {
            system.add_resource(r).unwrap();
        }
        system.allocate("P1", "R1").unwrap();
        system.allocate("P2", "R2").unwrap();
        system.allocate("P3", "R3").unwrap();
        system.request("P1", "R2").unwrap();
        system.request("P2", "R3").unwrap();
        system.request("P3", "R1").unwrap();
        system
    };

    let first = build().resolve_deadlock();
    let second = build().resolve_deadlock();
    assert_eq!(first, second);
    assert_eq!(first.victim_ids(), vec!["P1"]);
}

#[test]
fn test_detect_and_resolve_combined() {
    let mut system = DeadlockSystem::default();
    system.add_process("P1").unwrap();
    system.add_process("P2").unwrap();
    deadlocked_pair(&mut system, "P1", "P2", "R1", "R2");

    let (detection, resolution) = system.detect_and_resolve();
    assert!(detection.is_deadlocked());
    assert_eq!(resolution.unwrap().victims.len(), 1);

    let (detection, resolution) = system.detect_and_resolve();
    assert!(!detection.is_deadlocked());
    assert!(resolution.is_none());
}

#[test]
fn test_non_numeric_metadata_defaults() {
    let mut system = DeadlockSystem::default();
    system.add_process("P1").unwrap();
    system.set_metadata("P1", "abc", "xyz").unwrap();
    assert_eq!(system.get_metadata("P1"), ProcessMetadata::new(5, 5));
}
