//! Worker pool isolation
//!
//! A ranker sized from configuration must keep every stage on its own pool.
//! Lives in its own test binary: rayon's global pool can only be built once
//! per process, and nothing else here may touch it first.

use cbdrank::{ContentGraph, OwnershipMap, RankConfig, Ranker};

#[test]
fn test_run_leaves_global_pool_untouched() {
    let graph = ContentGraph::from_edges(5, &[(0, 1), (1, 2), (2, 0), (3, 2), (4, 2), (0, 4)])
        .unwrap();
    let ownership = OwnershipMap::from_pairs(2, 5, &[(0, 0), (0, 2), (1, 2), (1, 3)]).unwrap();
    let ranker = Ranker::from_config(&RankConfig {
        threads: Some(1),
        ..RankConfig::default()
    })
    .unwrap();

    let report = ranker.run(&graph, &ownership, &[2, 1]).unwrap();
    assert_eq!(report.karma.len(), 2);
    assert!(report.entropy[2] > 0.0);

    // Fails if anything above ran on the implicit global pool
    let global = rayon::ThreadPoolBuilder::new().num_threads(1).build_global();
    assert!(global.is_ok(), "global pool already initialized: {:?}", global.err());
}
