//! Content graph in flat adjacency form
//!
//! Each edge is stored twice: grouped by target (who links to me, read by the
//! rank sweep) and grouped by source (who do I link to, gives the out-degree
//! that normalizes influence).

use crate::encoder::EdgeIndex;
use crate::errors::{ensure_len, RankError, RankResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentGraph {
    incoming: EdgeIndex,
    outgoing: EdgeIndex,
}

impl ContentGraph {
    /// Build from a list of `(source, target)` edges.
    ///
    /// Self-loops and duplicate edges are kept; each one counts toward both
    /// degrees.
    ///
    /// # Errors
    /// - `MalformedGraph` if any edge references a node `>= num_nodes`
    pub fn from_edges(num_nodes: usize, edges: &[(u32, u32)]) -> RankResult<Self> {
        let incoming =
            EdgeIndex::group_by_key(num_nodes, num_nodes, edges.iter().map(|&(s, t)| (t, s)))?;
        let outgoing = EdgeIndex::group_by_key(num_nodes, num_nodes, edges.iter().copied())?;
        Ok(Self { incoming, outgoing })
    }

    /// Build from the flat buffers a host program hands over directly.
    ///
    /// * `in_counts[i]` - number of incoming links of node i
    /// * `out_counts[i]` - number of outgoing links of node i
    /// * `in_sources` - source node of every incoming link, grouped by target
    /// * `out_targets` - target node of every outgoing link, grouped by source
    ///
    /// # Errors
    /// - `MalformedGraph` if the count arrays differ in length, counts don't add
    ///   up to their entry arrays, an index is out of range, or the two
    ///   directions describe different edge sets
    pub fn from_parts(
        in_counts: Vec<u32>,
        out_counts: Vec<u32>,
        in_sources: Vec<u32>,
        out_targets: Vec<u32>,
    ) -> RankResult<Self> {
        let num_nodes = in_counts.len();
        ensure_len("out_counts", out_counts.len(), num_nodes)?;
        ensure_len("out_targets", out_targets.len(), in_sources.len())?;

        let incoming = EdgeIndex::from_parts(in_counts, in_sources, num_nodes)?;
        let outgoing = EdgeIndex::from_parts(out_counts, out_targets, num_nodes)?;

        // Both directions must list the same links, duplicates included,
        // otherwise 1/outDegree would not be a valid split of a node's rank.
        let mut from_incoming: Vec<(u32, u32)> = (0..num_nodes)
            .flat_map(|t| incoming.entries_of(t).iter().map(move |&s| (s, t as u32)))
            .collect();
        let mut from_outgoing: Vec<(u32, u32)> = (0..num_nodes)
            .flat_map(|s| outgoing.entries_of(s).iter().map(move |&t| (s as u32, t)))
            .collect();
        from_incoming.sort_unstable();
        from_outgoing.sort_unstable();
        if let Some((a, b)) = from_incoming
            .iter()
            .zip(&from_outgoing)
            .find(|(a, b)| a != b)
        {
            return Err(RankError::malformed(format!(
                "incoming lists hold link {} -> {} where outgoing lists hold {} -> {}",
                a.0, a.1, b.0, b.1
            )));
        }

        Ok(Self { incoming, outgoing })
    }

    pub fn num_nodes(&self) -> usize {
        self.incoming.len()
    }

    pub fn num_edges(&self) -> usize {
        self.incoming.num_entries()
    }

    pub fn in_degree(&self, node: usize) -> u32 {
        self.incoming.count(node)
    }

    pub fn out_degree(&self, node: usize) -> u32 {
        self.outgoing.count(node)
    }

    /// Sources of every link pointing at `node`.
    pub fn in_neighbors(&self, node: usize) -> &[u32] {
        self.incoming.entries_of(node)
    }

    /// Targets of every link leaving `node`.
    pub fn out_neighbors(&self, node: usize) -> &[u32] {
        self.outgoing.entries_of(node)
    }

    /// Nodes with no outgoing links.
    pub fn dangling_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.outgoing
            .counts()
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == 0)
            .map(|(i, _)| i)
    }

    /// Incoming adjacency, grouped by target.
    pub fn incoming(&self) -> &EdgeIndex {
        &self.incoming
    }

    /// Outgoing adjacency, grouped by source.
    pub fn outgoing(&self) -> &EdgeIndex {
        &self.outgoing
    }
}
