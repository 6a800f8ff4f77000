// Entropy estimator
//
// How evenly is a node's incoming support spread across the links feeding it?
//
//   w_j  = r[j] / out_degree(j)          influence carried by one incoming link
//   p_j  = w_j / Σ_k w_k                 share of that link in the total inflow
//   H(i) = -Σ_j p_j * ln(p_j)
//
// Broad, even support -> high entropy. One dominant contributor -> near 0.
// Nodes with 0 or 1 incoming links have no distribution and get 0.
//
// Each incoming entry is one contribution, so a duplicated link from the same
// source shows up twice in the distribution.

use rayon::prelude::*;

use crate::errors::{ensure_len, RankResult};
use crate::graph::ContentGraph;

/// Entropy of one node's incoming-influence distribution. `rank` must
/// already hold one value per node.
fn node_entropy(graph: &ContentGraph, rank: &[f64], node: usize) -> f64 {
    let sources = graph.in_neighbors(node);
    if sources.len() < 2 {
        return 0.0;
    }

    let weight = |src: u32| {
        let src = src as usize;
        rank[src] / graph.out_degree(src) as f64
    };
    let total: f64 = sources.iter().map(|&src| weight(src)).sum();
    if total <= 0.0 {
        return 0.0;
    }

    let entropy: f64 = sources
        .iter()
        .map(|&src| weight(src) / total)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.ln())
        .sum();

    // Rounding can leave a tiny negative value for a fully concentrated inflow
    entropy.max(0.0)
}

/// Entropy for every content node.
///
/// # Errors
/// - `MalformedGraph` if `rank` isn't one value per node
pub fn compute_entropy(graph: &ContentGraph, rank: &[f64]) -> RankResult<Vec<f64>> {
    ensure_len("rank vector", rank.len(), graph.num_nodes())?;
    Ok((0..graph.num_nodes())
        .into_par_iter()
        .map(|node| node_entropy(graph, rank, node))
        .collect())
}
