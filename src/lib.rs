//! cbdrank - stake-weighted content ranking
//!
//! Computes, over a directed content graph:
//! - **rank**: damped power iteration (PageRank form) with dangling-mass
//!   redistribution
//! - **entropy**: diversity of each node's incoming support
//! - **karma**: rank credited to stakeholders through content ownership
//! - **luminosity**: rank boosted by entropy
//!
//! All graph data lives in flat offset + entry arrays so it can be handed to a
//! parallel backend without translation. Sweeps run on rayon.
//!
//! # Example
//!
//! ```
//! use cbdrank::{ContentGraph, OwnershipMap, RankConfig, Ranker};
//!
//! // 0 -> 1 -> 2 -> 0
//! let graph = ContentGraph::from_edges(3, &[(0, 1), (1, 2), (2, 0)]).unwrap();
//! // stakeholder 0 owns content 0 and 1, stakeholder 1 owns content 2
//! let ownership = OwnershipMap::from_pairs(2, 3, &[(0, 0), (0, 1), (1, 2)]).unwrap();
//!
//! let ranker = Ranker::from_config(&RankConfig::default()).unwrap();
//! let report = ranker.run(&graph, &ownership, &[100, 50]).unwrap();
//! assert_eq!(report.karma.len(), 2);
//! ```

pub mod backend;
pub mod config;
pub mod encoder;
pub mod entropy;
mod errors;
pub mod graph;
pub mod karma;
pub mod luminosity;
pub mod ownership;
pub mod pipeline;
pub mod rank;

pub use backend::{ComputeBackend, CpuBackend};
pub use config::RankConfig;
pub use encoder::{encode, encode_checked, EdgeIndex, Offsets};
pub use entropy::compute_entropy;
pub use errors::{BackendError, RankError, RankResult};
pub use graph::ContentGraph;
pub use karma::{compute_karma, KarmaPolicy, OwnerFanOut};
pub use luminosity::compute_luminosity;
pub use ownership::OwnershipMap;
pub use pipeline::{RankReport, Ranker};
pub use rank::{compute_rank, compute_rank_from, RankOutcome, RankParams};
