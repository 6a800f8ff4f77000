//! Single-call ranking run
//!
//! Rank first, then entropy and karma side by side (both only read the
//! converged rank), then luminosity. Every stage goes through the injected
//! backend; the run returns either a complete [`RankReport`] or an error,
//! never a half-filled one.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::{ComputeBackend, CpuBackend};
use crate::config::RankConfig;
use crate::errors::{RankError, RankResult};
use crate::graph::ContentGraph;
use crate::karma::KarmaPolicy;
use crate::ownership::OwnershipMap;
use crate::rank::{check_rank_vector, RankOutcome, RankParams};

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankReport {
    /// Per content node
    pub rank: Vec<f64>,
    pub entropy: Vec<f64>,
    pub luminosity: Vec<f64>,
    /// Per stakeholder
    pub karma: Vec<f64>,
    pub iterations: usize,
    pub residual: f64,
}

impl RankReport {
    /// The `k` brightest content nodes, highest first.
    pub fn top_by_luminosity(&self, k: usize) -> Vec<(usize, f64)> {
        top_k(&self.luminosity, k)
    }

    /// The `k` stakeholders with the most karma, highest first.
    pub fn top_karma(&self, k: usize) -> Vec<(usize, f64)> {
        top_k(&self.karma, k)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Indices of the `k` largest values, ties broken by lower index.
fn top_k(values: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    indexed.truncate(k);
    indexed
}

/// Runs the whole pipeline over an injected backend.
pub struct Ranker<B: ComputeBackend> {
    backend: B,
    params: RankParams,
    karma_policy: KarmaPolicy,
}

impl Ranker<CpuBackend> {
    /// CPU ranker built from configuration.
    ///
    /// # Errors
    /// - `InvalidParameter` if the config values are out of range
    /// - `BackendDispatchFailure` if the worker pool can't be started
    pub fn from_config(config: &RankConfig) -> RankResult<Self> {
        let params = config.rank_params()?;
        let backend = CpuBackend::new(config.threads)?;
        Ok(Self::with_backend(backend, params, config.karma))
    }
}

impl<B: ComputeBackend> Ranker<B> {
    pub fn with_backend(backend: B, params: RankParams, karma_policy: KarmaPolicy) -> Self {
        Self {
            backend,
            params,
            karma_policy,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn params(&self) -> &RankParams {
        &self.params
    }

    /// Rank, then derive entropy, karma and luminosity.
    ///
    /// # Errors
    /// - `MalformedGraph` if the ownership mapping doesn't cover the graph's
    ///   content nodes or `stakes` isn't one value per stakeholder
    /// - `NonConvergence` from the rank stage; pass its best-effort vector to
    ///   [`Ranker::finish`] to accept it explicitly
    /// - `BackendDispatchFailure` from the backend, unchanged
    pub fn run(
        &self,
        graph: &ContentGraph,
        ownership: &OwnershipMap,
        stakes: &[u64],
    ) -> RankResult<RankReport> {
        check_spaces(graph, ownership)?;

        let started = Instant::now();
        let outcome = self.backend.rank(graph, &self.params, None)?;
        debug!(
            backend = self.backend.name(),
            iterations = outcome.iterations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rank stage done"
        );

        self.finish(graph, ownership, stakes, outcome)
    }

    /// Derive entropy, karma and luminosity from an existing rank outcome.
    ///
    /// # Errors
    /// - `MalformedGraph` if the spaces don't line up or `outcome.rank` isn't
    ///   one value per content node
    /// - `InvalidParameter` if `outcome.rank` holds a negative or non-finite
    ///   value
    /// - `BackendDispatchFailure` from the backend, unchanged
    pub fn finish(
        &self,
        graph: &ContentGraph,
        ownership: &OwnershipMap,
        stakes: &[u64],
        outcome: RankOutcome,
    ) -> RankResult<RankReport> {
        check_spaces(graph, ownership)?;
        check_rank_vector("rank vector", &outcome.rank, graph.num_nodes())?;

        let started = Instant::now();
        let rank = outcome.rank;
        let (entropy, karma) = self.backend.entropy_and_karma(
            graph,
            ownership,
            stakes,
            &rank,
            &self.karma_policy,
        )?;
        let luminosity = self.backend.luminosity(&rank, &entropy)?;

        info!(
            backend = self.backend.name(),
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            stakeholders = ownership.num_stakeholders(),
            iterations = outcome.iterations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ranking run complete"
        );

        Ok(RankReport {
            rank,
            entropy,
            luminosity,
            karma,
            iterations: outcome.iterations,
            residual: outcome.residual,
        })
    }
}

fn check_spaces(graph: &ContentGraph, ownership: &OwnershipMap) -> RankResult<()> {
    if ownership.num_content() != graph.num_nodes() {
        return Err(RankError::malformed(format!(
            "ownership mapping covers {} content nodes, graph has {}",
            ownership.num_content(),
            graph.num_nodes()
        )));
    }
    Ok(())
}
