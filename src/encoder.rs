// Graph encoder: per-node counts -> prefix-sum start offsets
//
// LAYOUT:
// Every node space (incoming links, outgoing links, stakeholder ownership) is
// stored as three flat arrays:
//
//   counts[i]                          how many entries node i has
//   start[i]                           where node i's entries begin
//   entries[start[i]..start[i]+counts[i]]  the entries themselves
//
//   counts = [2, 0, 1]
//   start  = [0, 2, 2]      total = 3
//
// No pointers, no per-node allocations: the arrays can be handed to a
// parallel backend as-is.

use serde::{Deserialize, Serialize};

use crate::errors::{RankError, RankResult};

/// Output of [`encode`]: start offset per node plus the total entry count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offsets {
    pub start: Vec<u64>,
    pub total: u64,
}

/// Exclusive prefix sum over per-node counts.
///
/// `start[0] = 0`, `start[i] = start[i-1] + counts[i-1]`, and
/// `total = start[K-1] + counts[K-1]` (0 for an empty node space).
pub fn encode(counts: &[u32]) -> Offsets {
    let mut start = Vec::with_capacity(counts.len());
    let mut total: u64 = 0;
    for &count in counts {
        start.push(total);
        total += count as u64;
    }
    Offsets { start, total }
}

/// Encode counts and check them against the flattened entry array they
/// describe.
///
/// # Errors
/// - `MalformedGraph` if the counts do not add up to `entries_len`
pub fn encode_checked(counts: &[u32], entries_len: usize) -> RankResult<Offsets> {
    let offsets = encode(counts);
    if offsets.total != entries_len as u64 {
        return Err(RankError::malformed(format!(
            "counts sum to {} but {} entries were supplied",
            offsets.total, entries_len
        )));
    }
    Ok(offsets)
}

/// One encoded node space: counts, start offsets and the flat entry array.
///
/// `entries` holds indices into *another* space (content nodes for both the
/// link indices and the ownership mapping), which is why the bound they are
/// checked against is passed in separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeIndex {
    counts: Vec<u32>,
    start: Vec<u64>,
    entries: Vec<u32>,
}

impl EdgeIndex {
    /// Build from already-flattened arrays, validating every entry against
    /// `entry_bound`.
    ///
    /// # Errors
    /// - `MalformedGraph` if counts and entries disagree or an entry is out of range
    pub fn from_parts(counts: Vec<u32>, entries: Vec<u32>, entry_bound: usize) -> RankResult<Self> {
        let offsets = encode_checked(&counts, entries.len())?;
        if let Some(pos) = entries.iter().position(|&e| e as usize >= entry_bound) {
            return Err(RankError::malformed(format!(
                "entry {} at position {} is out of range [0, {})",
                entries[pos], pos, entry_bound
            )));
        }
        Ok(Self {
            counts,
            start: offsets.start,
            entries,
        })
    }

    /// Group `(key, value)` pairs by key with a counting sort.
    ///
    /// Entries keep their input order within a key, so the layout is
    /// deterministic for a given pair list.
    ///
    /// # Errors
    /// - `MalformedGraph` if a key is `>= num_keys` or a value is `>= value_bound`
    pub fn group_by_key(
        num_keys: usize,
        value_bound: usize,
        pairs: impl Iterator<Item = (u32, u32)> + Clone,
    ) -> RankResult<Self> {
        let mut counts = vec![0u32; num_keys];
        for (key, value) in pairs.clone() {
            if key as usize >= num_keys {
                return Err(RankError::malformed(format!(
                    "key {} is out of range [0, {})",
                    key, num_keys
                )));
            }
            if value as usize >= value_bound {
                return Err(RankError::malformed(format!(
                    "value {} is out of range [0, {})",
                    value, value_bound
                )));
            }
            counts[key as usize] += 1;
        }

        let offsets = encode(&counts);
        let mut cursor: Vec<u64> = offsets.start.clone();
        let mut entries = vec![0u32; offsets.total as usize];
        for (key, value) in pairs {
            let slot = &mut cursor[key as usize];
            entries[*slot as usize] = value;
            *slot += 1;
        }

        Ok(Self {
            counts,
            start: offsets.start,
            entries,
        })
    }

    /// Number of keys (nodes) in this space.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of entries.
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    pub fn count(&self, key: usize) -> u32 {
        self.counts[key]
    }

    /// Entries of one key.
    pub fn entries_of(&self, key: usize) -> &[u32] {
        let start = self.start[key] as usize;
        &self.entries[start..start + self.counts[key] as usize]
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn start(&self) -> &[u64] {
        &self.start
    }

    pub fn entries(&self) -> &[u32] {
        &self.entries
    }
}
