//! Luminosity combiner
//!
//! `luminosity[i] = rank[i] * (1 + entropy[i])`: entropy acts as a
//! multiplicative diversity bonus, so luminosity never drops below rank and
//! grows with both inputs.

use rayon::prelude::*;

use crate::errors::{ensure_len, RankResult};

/// Luminosity for every content node.
///
/// # Errors
/// - `MalformedGraph` if `rank` and `entropy` differ in length
pub fn compute_luminosity(rank: &[f64], entropy: &[f64]) -> RankResult<Vec<f64>> {
    ensure_len("entropy vector", entropy.len(), rank.len())?;
    Ok(rank
        .par_iter()
        .zip(entropy.par_iter())
        .map(|(r, h)| r * (1.0 + h))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RankError;

    #[test]
    fn test_zero_entropy_is_plain_rank() {
        let lum = compute_luminosity(&[0.2, 0.8], &[0.0, 0.0]).unwrap();
        assert_eq!(lum, vec![0.2, 0.8]);
    }

    #[test]
    fn test_bounded_below_by_rank_and_monotone() {
        let rank = [0.1, 0.1, 0.3];
        let entropy = [0.0, 0.7, 0.7];
        let lum = compute_luminosity(&rank, &entropy).unwrap();
        for (l, r) in lum.iter().zip(&rank) {
            assert!(l >= r);
        }
        assert!(lum[1] > lum[0]); // more entropy, same rank
        assert!(lum[2] > lum[1]); // more rank, same entropy
    }

    #[test]
    fn test_length_mismatch() {
        let result = compute_luminosity(&[0.5, 0.5], &[0.0]);
        assert!(matches!(result, Err(RankError::MalformedGraph(_))));
    }
}
