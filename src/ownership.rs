//! Stakeholder -> content ownership mapping
//!
//! Same flat layout as the content adjacency, but cross-indexed: keys are
//! stakeholders in `[0, M)`, entries are content nodes in `[0, N)`.

use crate::encoder::EdgeIndex;
use crate::errors::RankResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipMap {
    owned: EdgeIndex,
    num_content: usize,
}

impl OwnershipMap {
    /// Build from `(stakeholder, content)` pairs.
    ///
    /// # Errors
    /// - `MalformedGraph` if a stakeholder is `>= num_stakeholders` or a
    ///   content node is `>= num_content`
    pub fn from_pairs(
        num_stakeholders: usize,
        num_content: usize,
        pairs: &[(u32, u32)],
    ) -> RankResult<Self> {
        let owned = EdgeIndex::group_by_key(num_stakeholders, num_content, pairs.iter().copied())?;
        Ok(Self { owned, num_content })
    }

    /// Build from per-stakeholder counts and the flat owned-content array.
    ///
    /// # Errors
    /// - `MalformedGraph` if counts don't add up or a content index is out of range
    pub fn from_parts(counts: Vec<u32>, content: Vec<u32>, num_content: usize) -> RankResult<Self> {
        let owned = EdgeIndex::from_parts(counts, content, num_content)?;
        Ok(Self { owned, num_content })
    }

    pub fn num_stakeholders(&self) -> usize {
        self.owned.len()
    }

    /// Size of the content space the entries index into.
    pub fn num_content(&self) -> usize {
        self.num_content
    }

    /// Content nodes owned by `stakeholder`.
    pub fn owned_by(&self, stakeholder: usize) -> &[u32] {
        self.owned.entries_of(stakeholder)
    }

    /// How many stakeholders own each content node.
    pub fn owner_counts(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.num_content];
        for &content in self.owned.entries() {
            counts[content as usize] += 1;
        }
        counts
    }

    pub fn index(&self) -> &EdgeIndex {
        &self.owned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RankError;

    #[test]
    fn test_from_pairs() {
        // stakeholder 0 owns {0, 2}, stakeholder 2 owns {2}, stakeholder 1 owns nothing
        let map = OwnershipMap::from_pairs(3, 4, &[(0, 0), (2, 2), (0, 2)]).unwrap();
        assert_eq!(map.num_stakeholders(), 3);
        assert_eq!(map.num_content(), 4);
        assert_eq!(map.owned_by(0), &[0, 2]);
        assert!(map.owned_by(1).is_empty());
        assert_eq!(map.owned_by(2), &[2]);
        assert_eq!(map.owner_counts(), vec![1, 0, 2, 0]);
    }

    #[test]
    fn test_stakeholder_and_content_spaces_are_independent() {
        // 1 stakeholder, 5 content nodes
        let map = OwnershipMap::from_pairs(1, 5, &[(0, 4)]).unwrap();
        assert_eq!(map.num_stakeholders(), 1);
        assert_eq!(map.num_content(), 5);

        // content index checked against the content space, not the stakeholder space
        let bad = OwnershipMap::from_pairs(5, 1, &[(4, 1)]);
        assert!(matches!(bad, Err(RankError::MalformedGraph(_))));
    }

    #[test]
    fn test_from_parts_mismatch() {
        let result = OwnershipMap::from_parts(vec![2, 0], vec![1], 3);
        assert!(matches!(result, Err(RankError::MalformedGraph(_))));
    }
}
