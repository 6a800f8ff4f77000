//! Compute backends
//!
//! The ranking pipeline never reaches for a global device or thread pool; it
//! is handed a [`ComputeBackend`] and dispatches the four numerical contracts
//! through it. [`CpuBackend`] runs them on a dedicated rayon pool. An
//! accelerator backend would upload the flat arrays exposed by
//! [`ContentGraph`] and [`OwnershipMap`] as-is and report any device failure
//! as `RankError::BackendDispatchFailure`.

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::entropy::compute_entropy;
use crate::errors::{RankError, RankResult};
use crate::graph::ContentGraph;
use crate::karma::{compute_karma, KarmaPolicy};
use crate::luminosity::compute_luminosity;
use crate::ownership::OwnershipMap;
use crate::rank::{compute_rank, compute_rank_from, RankOutcome, RankParams};

/// Executes the rank, entropy, karma and luminosity kernels.
///
/// Implementations must produce the same numbers regardless of where they
/// run, and report a failed dispatch as a single error per call.
pub trait ComputeBackend: Send + Sync {
    /// Short name used in logs and dispatch errors.
    fn name(&self) -> &str;

    /// Rank from the uniform vector, or from `initial` when given.
    fn rank(
        &self,
        graph: &ContentGraph,
        params: &RankParams,
        initial: Option<Vec<f64>>,
    ) -> RankResult<RankOutcome>;

    fn entropy(&self, graph: &ContentGraph, rank: &[f64]) -> RankResult<Vec<f64>>;

    fn karma(
        &self,
        ownership: &OwnershipMap,
        stakes: &[u64],
        rank: &[f64],
        policy: &KarmaPolicy,
    ) -> RankResult<Vec<f64>>;

    fn luminosity(&self, rank: &[f64], entropy: &[f64]) -> RankResult<Vec<f64>>;

    /// Entropy and karma for one converged rank vector. Both only read
    /// `rank`, so a backend may run them side by side; the default runs them
    /// one after the other. An entropy failure is reported first.
    fn entropy_and_karma(
        &self,
        graph: &ContentGraph,
        ownership: &OwnershipMap,
        stakes: &[u64],
        rank: &[f64],
        policy: &KarmaPolicy,
    ) -> RankResult<(Vec<f64>, Vec<f64>)> {
        let entropy = self.entropy(graph, rank)?;
        let karma = self.karma(ownership, stakes, rank, policy)?;
        Ok((entropy, karma))
    }
}

/// Runs every kernel on a bounded rayon pool owned by the backend.
pub struct CpuBackend {
    pool: ThreadPool,
}

impl CpuBackend {
    /// Build a backend with `threads` workers (`None` = one per core).
    ///
    /// # Errors
    /// - `BackendDispatchFailure` if the worker pool can't be started
    pub fn new(threads: Option<usize>) -> RankResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.unwrap_or(0))
            .thread_name(|i| format!("cbdrank-worker-{}", i))
            .build()
            .map_err(|e| RankError::dispatch("cpu", e))?;
        debug!(threads = pool.current_num_threads(), "cpu backend ready");
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl std::fmt::Debug for CpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuBackend")
            .field("threads", &self.num_threads())
            .finish()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn rank(
        &self,
        graph: &ContentGraph,
        params: &RankParams,
        initial: Option<Vec<f64>>,
    ) -> RankResult<RankOutcome> {
        self.pool.install(|| match initial {
            Some(initial) => compute_rank_from(graph, params, initial),
            None => compute_rank(graph, params),
        })
    }

    fn entropy(&self, graph: &ContentGraph, rank: &[f64]) -> RankResult<Vec<f64>> {
        self.pool.install(|| compute_entropy(graph, rank))
    }

    fn karma(
        &self,
        ownership: &OwnershipMap,
        stakes: &[u64],
        rank: &[f64],
        policy: &KarmaPolicy,
    ) -> RankResult<Vec<f64>> {
        self.pool
            .install(|| compute_karma(ownership, stakes, rank, policy))
    }

    fn luminosity(&self, rank: &[f64], entropy: &[f64]) -> RankResult<Vec<f64>> {
        self.pool.install(|| compute_luminosity(rank, entropy))
    }

    fn entropy_and_karma(
        &self,
        graph: &ContentGraph,
        ownership: &OwnershipMap,
        stakes: &[u64],
        rank: &[f64],
        policy: &KarmaPolicy,
    ) -> RankResult<(Vec<f64>, Vec<f64>)> {
        // join inside install keeps both halves on this backend's workers
        let (entropy, karma) = self.pool.install(|| {
            rayon::join(
                || compute_entropy(graph, rank),
                || compute_karma(ownership, stakes, rank, policy),
            )
        });
        Ok((entropy?, karma?))
    }
}
