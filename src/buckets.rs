//! # Bucketizer Module
//!
//! Turns a set of raw RTT samples into histogram bucket boundaries for the
//! digest engine. Every distinct message length becomes its own boundary, so
//! buckets currently coincide with exact lengths; coarser groupings (e.g.
//! power-of-two ranges) would be layered on top of this, not folded into it.

use crate::samples::RttSamples;
use serde::{Deserialize, Serialize};

/// One histogram bucket boundary.
///
/// `max_length` is the largest message size covered by the bucket and
/// `cum_frac` is the fraction of all messages with that length or smaller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub max_length: u64,
    pub cum_frac: f64,
}

/// Generate bucket boundaries for the given samples.
///
/// Boundaries come out sorted ascending by length with `cum_frac`
/// monotonically non-decreasing, ending at exactly 1.0 when `total`
/// matches the number of samples in `rtts`. A `total` of zero yields
/// no boundaries.
pub fn bucket_boundaries(rtts: &RttSamples, total: usize) -> Vec<Bucket> {
    let mut buckets = Vec::with_capacity(rtts.len());
    if total == 0 {
        return buckets;
    }

    let mut cumulative = 0usize;
    for (&length, samples) in rtts {
        cumulative += samples.len();
        buckets.push(Bucket {
            max_length: length,
            cum_frac: cumulative as f64 / total as f64,
        });
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(pairs: &[(u64, usize)]) -> (RttSamples, usize) {
        let mut rtts = RttSamples::new();
        let mut total = 0;
        for &(length, count) in pairs {
            rtts.insert(length, vec![1.0; count]);
            total += count;
        }
        (rtts, total)
    }

    #[test]
    fn test_one_boundary_per_distinct_length() {
        let (rtts, total) = samples(&[(100, 2), (200, 1), (5000, 3)]);
        let buckets = bucket_boundaries(&rtts, total);

        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].max_length, 100);
        assert_eq!(buckets[1].max_length, 200);
        assert_eq!(buckets[2].max_length, 5000);
    }

    #[test]
    fn test_cum_frac_monotone_and_ends_at_one() {
        let (rtts, total) = samples(&[(64, 5), (128, 1), (256, 4), (1024, 10)]);
        let buckets = bucket_boundaries(&rtts, total);

        for pair in buckets.windows(2) {
            assert!(pair[0].cum_frac <= pair[1].cum_frac);
            assert!(pair[0].max_length < pair[1].max_length);
        }
        assert!((buckets.last().unwrap().cum_frac - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_sample_fractions() {
        let mut rtts = RttSamples::new();
        rtts.insert(100, vec![10.0, 20.0]);
        rtts.insert(200, vec![30.0]);
        let buckets = bucket_boundaries(&rtts, 3);

        assert_eq!(buckets.len(), 2);
        assert!((buckets[0].cum_frac - 2.0 / 3.0).abs() < 1e-9);
        assert!((buckets[1].cum_frac - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_samples() {
        let rtts = RttSamples::new();
        assert!(bucket_boundaries(&rtts, 0).is_empty());
    }
}
