/*!
 * Shared System Tests
 * Serialized access from several threads through one lock
 */

use rag_deadlock::{DeadlockSystem, SharedSystem};
use std::thread;

#[test]
fn test_concurrent_requests_then_resolve() {
    let shared = SharedSystem::new(DeadlockSystem::default());
    for i in 0..4 {
        shared
            .add_process_with_metadata(&format!("P{}", i), &i.to_string(), "")
            .unwrap();
        shared.add_resource(&format!("R{}", i)).unwrap();
        shared.allocate(&format!("P{}", i), &format!("R{}", i)).unwrap();
    }

    // Every process waits for its neighbour's resource, closing one ring
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let shared = shared.clone();
            thread::spawn(move || {
                shared
                    .request(&format!("P{}", i), &format!("R{}", (i + 1) % 4))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let report = shared.detect_deadlock();
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(report.cycles[0].processes.len(), 4);

    let resolution = shared.resolve_deadlock();
    assert_eq!(resolution.victim_ids(), vec!["P0"]);
    assert!(!shared.read().is_deadlocked());
}

#[test]
fn test_readers_see_consistent_snapshots() {
    let shared = SharedSystem::default();
    shared.add_process_with_metadata("P1", "", "").unwrap();
    shared.add_resource("R1").unwrap();

    let writer = {
        let shared = shared.clone();
        thread::spawn(move || {
            for _ in 0..100 {
                shared.allocate("P1", "R1").unwrap();
                shared.write().release("P1", "R1").unwrap();
            }
        })
    };

    for _ in 0..100 {
        let snapshot = shared.snapshot();
        assert!(snapshot.edge_count() <= 1);
    }
    writer.join().unwrap();
}
