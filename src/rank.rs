// Rank iteration engine
//
// Damped power iteration (PageRank form) over the incoming adjacency:
//
//   r'[i] = (1 - d) / N  +  d * ( Σ_{j -> i} r[j] / out_degree(j)  +  D / N )
//
// Where:
//   d = damping factor - share of mass that follows links
//   N = number of content nodes
//   D = Σ r[j] over dangling nodes (out_degree = 0), spread evenly so the
//       total mass stays at 1
//
// PARALLELIZATION:
// Two buffers, `current` and `next`. Each sweep reads only `current` and
// writes only `next`, one slot per node, so rayon can split the nodes across
// workers with no locking. The barrier at the end of the sweep is where the
// residual is reduced and the buffers are swapped.
//
// Convergence: max_i |r'[i] - r[i]| < tolerance, or NonConvergence once
// `max_iterations` sweeps have run.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::errors::{ensure_len, RankError, RankResult};
use crate::graph::ContentGraph;

pub const DEFAULT_DAMPING_FACTOR: f64 = 0.85;
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Immutable parameters of one rank run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankParams {
    pub damping_factor: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            damping_factor: DEFAULT_DAMPING_FACTOR,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl RankParams {
    /// Checked constructor with the default iteration bound.
    pub fn new(damping_factor: f64, tolerance: f64) -> RankResult<Self> {
        let params = Self {
            damping_factor,
            tolerance,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> RankResult<Self> {
        self.max_iterations = max_iterations;
        self.validate()?;
        Ok(self)
    }

    /// # Errors
    /// - `InvalidParameter` if damping is outside (0, 1), tolerance is not a
    ///   positive finite number, or the iteration bound is zero
    pub fn validate(&self) -> RankResult<()> {
        if !(self.damping_factor > 0.0 && self.damping_factor < 1.0) {
            return Err(RankError::invalid(format!(
                "damping factor must be in (0, 1), got {}",
                self.damping_factor
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(RankError::invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(RankError::invalid("max_iterations must be at least 1"));
        }
        Ok(())
    }
}

/// Converged rank vector plus how it got there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankOutcome {
    pub rank: Vec<f64>,
    pub iterations: usize,
    /// Max per-node change in the final sweep.
    pub residual: f64,
}

/// A rank vector must hold one non-negative finite value per node.
pub(crate) fn check_rank_vector(what: &str, rank: &[f64], num_nodes: usize) -> RankResult<()> {
    ensure_len(what, rank.len(), num_nodes)?;
    if let Some(pos) = rank.iter().position(|r| !r.is_finite() || *r < 0.0) {
        return Err(RankError::invalid(format!(
            "{} holds {} at node {}, expected a non-negative finite value",
            what, rank[pos], pos
        )));
    }
    Ok(())
}

/// Rank every content node starting from the uniform vector `1/N`.
///
/// # Errors
/// - `InvalidParameter` if `params` fail validation
/// - `NonConvergence` if `params.max_iterations` sweeps don't reach the tolerance
pub fn compute_rank(graph: &ContentGraph, params: &RankParams) -> RankResult<RankOutcome> {
    let n = graph.num_nodes();
    let initial = if n == 0 { Vec::new() } else { vec![1.0 / n as f64; n] };
    compute_rank_from(graph, params, initial)
}

/// Rank every content node starting from a caller-supplied vector.
///
/// # Errors
/// - `MalformedGraph` if `initial` isn't one value per node
/// - `InvalidParameter` if `params` fail validation or `initial` holds a
///   negative or non-finite value
/// - `NonConvergence` if the iteration bound is hit first
pub fn compute_rank_from(
    graph: &ContentGraph,
    params: &RankParams,
    initial: Vec<f64>,
) -> RankResult<RankOutcome> {
    params.validate()?;
    let n = graph.num_nodes();
    check_rank_vector("initial rank vector", &initial, n)?;

    if n == 0 {
        return Ok(RankOutcome {
            rank: Vec::new(),
            iterations: 0,
            residual: 0.0,
        });
    }

    let started = Instant::now();
    let n_f = n as f64;
    let damping = params.damping_factor;
    let dangling: Vec<usize> = graph.dangling_nodes().collect();

    let mut current = initial;
    let mut next = vec![0.0; n];
    let mut residual = f64::INFINITY;

    for iteration in 1..=params.max_iterations {
        // Dangling mass is the same for every node in this sweep
        let dangling_mass: f64 = dangling.iter().map(|&j| current[j]).sum();
        let uniform_share = (1.0 - damping) / n_f + damping * dangling_mass / n_f;

        next.par_iter_mut().enumerate().for_each(|(node, slot)| {
            let inflow: f64 = graph
                .in_neighbors(node)
                .iter()
                .map(|&src| {
                    let src = src as usize;
                    // src links to node, so its out-degree is at least 1
                    current[src] / graph.out_degree(src) as f64
                })
                .sum();
            *slot = uniform_share + damping * inflow;
        });

        // Barrier: every slot of `next` is written
        residual = current
            .par_iter()
            .zip(next.par_iter())
            .map(|(old, new)| (old - new).abs())
            .reduce(|| 0.0, f64::max);

        std::mem::swap(&mut current, &mut next);
        trace!(iteration, residual, "rank sweep");

        if residual < params.tolerance {
            debug!(
                nodes = n,
                edges = graph.num_edges(),
                iterations = iteration,
                residual,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "rank converged"
            );
            return Ok(RankOutcome {
                rank: current,
                iterations: iteration,
                residual,
            });
        }
    }

    warn!(
        iterations = params.max_iterations,
        residual,
        tolerance = params.tolerance,
        "rank did not converge"
    );
    Err(RankError::NonConvergence {
        iterations: params.max_iterations,
        residual,
        best_effort: current,
    })
}

// ============================================================================
// TESTS
// ============================================================================
