/*!
 * Detector Tests
 * Cycle detection over assignment and request edges
 */

use pretty_assertions::assert_eq;
use rag_deadlock::DeadlockSystem;

fn system_with(processes: &[&str], resources: &[&str]) -> DeadlockSystem {
    let mut system = DeadlockSystem::default();
    for p in processes {
        system.add_process(p).unwrap();
    }
    for r in resources {
        system.add_resource(r).unwrap();
    }
    system
}

#[test]
fn test_empty_graph_has_no_deadlock() {
    let system = DeadlockSystem::default();
    assert!(!system.is_deadlocked());
    assert!(system.detect_deadlock().cycles.is_empty());
}

#[test]
fn test_nodes_without_edges() {
    let system = system_with(&["P1", "P2"], &["R1"]);
    assert!(!system.is_deadlocked());
}

#[test]
fn test_single_allocation_is_safe() {
    let mut system = system_with(&["P1"], &["R1"]);
    system.allocate("P1", "R1").unwrap();
    assert!(!system.is_deadlocked());
}

#[test]
fn test_waiting_chain_is_safe() {
    let mut system = system_with(&["P1", "P2"], &["R1", "R2"]);
    system.allocate("P1", "R1").unwrap();
    system.request("P2", "R1").unwrap();
    system.allocate("P2", "R2").unwrap();
    assert!(!system.is_deadlocked());
}

#[test]
fn test_two_process_cycle() {
    let mut system = system_with(&["P1", "P2"], &["R1", "R2"]);
    system.allocate("P1", "R1").unwrap();
    system.allocate("P2", "R2").unwrap();
    system.request("P1", "R2").unwrap();
    system.request("P2", "R1").unwrap();

    let report = system.detect_deadlock();
    assert!(report.is_deadlocked());
    assert_eq!(report.cycles.len(), 1);

    let cycle = &report.cycles[0];
    let walk: Vec<&str> = cycle.nodes.iter().map(|n| n.as_str()).collect();
    assert_eq!(walk, vec!["P1", "R2", "P2", "R1"]);
    assert_eq!(cycle.processes, vec!["P1", "P2"]);
    assert!(!cycle.is_empty());
    assert!(cycle.contains("R2"));
    assert!(!cycle.contains("P3"));
}

#[test]
fn test_three_process_ring() {
    let mut system = system_with(&["A", "B", "C"], &["X", "Y", "Z"]);
    system.allocate("A", "X").unwrap();
    system.allocate("B", "Y").unwrap();
    system.allocate("C", "Z").unwrap();
    system.request("A", "Y").unwrap();
    system.request("B", "Z").unwrap();
    system.request("C", "X").unwrap();

    let report = system.detect_deadlock();
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(report.cycles[0].len(), 6);
    assert_eq!(report.deadlocked_processes().len(), 3);
}

#[test]
fn test_disjoint_deadlocks_reported_separately() {
    let mut system = system_with(&["P1", "P2", "P3", "P4", "P5"], &["R1", "R2", "R3", "R4"]);
    system.allocate("P1", "R1").unwrap();
    system.allocate("P2", "R2").unwrap();
    system.request("P1", "R2").unwrap();
    system.request("P2", "R1").unwrap();

    system.allocate("P3", "R3").unwrap();
    system.allocate("P4", "R4").unwrap();
    system.request("P3", "R4").unwrap();
    system.request("P4", "R3").unwrap();

    // P5 waits on the first deadlock without being part of it
    system.request("P5", "R1").unwrap();

    let report = system.detect_deadlock();
    assert_eq!(report.cycles.len(), 2);
    assert_eq!(report.cycles[0].processes, vec!["P1", "P2"]);
    assert_eq!(report.cycles[1].processes, vec!["P3", "P4"]);
    assert!(!report.deadlocked_processes().iter().any(|p| *p == "P5"));
}

#[test]
fn test_detection_does_not_mutate() {
    let mut system = system_with(&["P1", "P2"], &["R1", "R2"]);
    system.allocate("P1", "R1").unwrap();
    system.allocate("P2", "R2").unwrap();
    system.request("P1", "R2").unwrap();
    system.request("P2", "R1").unwrap();

    let before = system.snapshot();
    let first = system.detect_deadlock();
    let second = system.detect_deadlock();
    assert_eq!(first, second);
    assert_eq!(before, system.snapshot());
}
