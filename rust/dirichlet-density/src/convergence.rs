//! Convergence trajectories: density snapshots over increasing bounds.
//!
//! The sieve runs once at the largest bound. Every smaller sample point is a
//! prefix view of that one ascending prime list, found by binary search, and is
//! then counted and densified on its own.

use log::debug;
use serde::Serialize;

use crate::density::{DensityEstimator, DensityNormalization, DensitySnapshot};
use crate::error::{DirichletError, Result};
use crate::sieve::{check_bound, generate_primes, PrimeSet};

/// Density snapshots for one modulus, ordered by strictly increasing bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceTrajectory {
    pub modulus: u64,
    pub phi: u64,
    pub theoretical: f64,
    pub snapshots: Vec<DensitySnapshot>,
}

impl ConvergenceTrajectory {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn bounds(&self) -> Vec<u64> {
        self.snapshots.iter().map(|s| s.bound).collect()
    }

    /// Density of class `r` at every sample point.
    pub fn series(&self, r: u64) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.density(r)).collect()
    }

    /// Worst coprime-class deviation from 1/phi(N) at every sample point.
    pub fn max_errors(&self) -> Vec<f64> {
        self.snapshots.iter().map(DensitySnapshot::max_abs_error).collect()
    }

    pub fn last(&self) -> Option<&DensitySnapshot> {
        self.snapshots.last()
    }
}

/// Check that `bounds` is strictly ascending.
pub fn validate_bounds(bounds: &[u64]) -> Result<()> {
    for (i, w) in bounds.windows(2).enumerate() {
        if w[1] <= w[0] {
            return Err(DirichletError::UnorderedBounds {
                index: i + 1,
                previous: w[0],
                next: w[1],
            });
        }
    }
    Ok(())
}

/// Samples trajectories against a prime set that was sieved once.
///
/// Several moduli can share the same sampler, and so the same sieve.
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceSampler<'a> {
    primes: &'a PrimeSet,
    normalization: DensityNormalization,
}

impl<'a> ConvergenceSampler<'a> {
    pub fn new(primes: &'a PrimeSet) -> Self {
        Self {
            primes,
            normalization: DensityNormalization::default(),
        }
    }

    pub fn with_normalization(mut self, normalization: DensityNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Largest bound this sampler can answer.
    pub fn max_bound(&self) -> u64 {
        self.primes.bound()
    }

    /// One snapshot per entry of `bounds`, in the same order.
    ///
    /// `bounds` must be strictly ascending and must not exceed the bound the
    /// underlying prime set was sieved to.
    pub fn trajectory(&self, n: u64, bounds: &[u64]) -> Result<ConvergenceTrajectory> {
        let estimator = DensityEstimator::new(n)?.with_normalization(self.normalization);
        validate_bounds(bounds)?;

        let snapshots = bounds
            .iter()
            .map(|&bound| -> Result<DensitySnapshot> {
                let view = self.primes.upto(bound)?;
                Ok(estimator.snapshot(bound, &view))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "sampled {} bounds for N={} from one sieve of {} primes",
            snapshots.len(),
            n,
            self.primes.len()
        );

        Ok(ConvergenceTrajectory {
            modulus: n,
            phi: estimator.phi(),
            theoretical: estimator.theoretical(),
            snapshots,
        })
    }

    /// Snapshot at a single bound.
    pub fn snapshot(&self, n: u64, bound: u64) -> Result<DensitySnapshot> {
        let estimator = DensityEstimator::new(n)?.with_normalization(self.normalization);
        let view = self.primes.upto(bound)?;
        Ok(estimator.snapshot(bound, &view))
    }
}

/// Density trajectory of modulus `n` at each of the ascending `bounds`.
///
/// Sieves once at the last (largest) bound; an empty `bounds` gives an empty
/// trajectory without sieving. A last bound above
/// [`MAX_SIEVE_BOUND`](crate::sieve::MAX_SIEVE_BOUND) is rejected before any
/// memory is allocated.
pub fn sample_convergence(n: u64, bounds: &[u64]) -> Result<ConvergenceTrajectory> {
    let estimator = DensityEstimator::new(n)?;
    validate_bounds(bounds)?;
    let Some(&max_bound) = bounds.last() else {
        return Ok(ConvergenceTrajectory {
            modulus: n,
            phi: estimator.phi(),
            theoretical: estimator.theoretical(),
            snapshots: Vec::new(),
        });
    };
    check_bound(max_bound)?;
    let primes = generate_primes(max_bound);
    ConvergenceSampler::new(&primes).trajectory(n, bounds)
}

/// `count` evenly spaced bounds from `floor` to `ceiling`, deduplicated.
pub fn linear_bounds(floor: u64, ceiling: u64, count: usize) -> Result<Vec<u64>> {
    check_range(floor, ceiling)?;
    let mut bounds = match count {
        0 => Vec::new(),
        1 => vec![ceiling],
        _ => {
            let span = (ceiling - floor) as u128;
            let steps = (count - 1) as u128;
            (0..count)
                .map(|i| floor + (span * i as u128 / steps) as u64)
                .collect()
        }
    };
    bounds.dedup();
    Ok(bounds)
}

/// `count` geometrically spaced bounds from `floor` to `ceiling`, rounded to
/// integers and deduplicated. The endpoints are hit exactly.
pub fn log_bounds(floor: u64, ceiling: u64, count: usize) -> Result<Vec<u64>> {
    check_range(floor, ceiling)?;
    let floor = floor.max(1);
    let ceiling = ceiling.max(floor);
    let mut bounds = match count {
        0 => Vec::new(),
        1 => vec![ceiling],
        _ => {
            let ratio = (ceiling as f64 / floor as f64).ln();
            let steps = (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == 0 {
                        floor
                    } else if i == count - 1 {
                        ceiling
                    } else {
                        let x = (floor as f64) * (ratio * i as f64 / steps).exp();
                        (x.round() as u64).clamp(floor, ceiling)
                    }
                })
                .collect()
        }
    };
    bounds.dedup();
    Ok(bounds)
}

fn check_range(floor: u64, ceiling: u64) -> Result<()> {
    if floor > ceiling {
        return Err(DirichletError::UnorderedBounds {
            index: 1,
            previous: floor,
            next: ceiling,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::estimate_density;

    #[test]
    fn test_trajectory_matches_direct_estimates() {
        let bounds = [100, 1_000, 5_000, 20_000];
        let trajectory = sample_convergence(5, &bounds).unwrap();
        assert_eq!(trajectory.bounds(), bounds.to_vec());
        for (snap, &bound) in trajectory.snapshots.iter().zip(&bounds) {
            let direct = generate_primes(bound);
            let expected = DensityEstimator::new(5).unwrap().snapshot(bound, &direct);
            assert_eq!(snap, &expected, "snapshot at {} differs from a fresh sieve", bound);
        }
    }

    #[test]
    fn test_trajectory_rejects_unordered_bounds() {
        assert_eq!(
            sample_convergence(4, &[100, 50]),
            Err(DirichletError::UnorderedBounds { index: 1, previous: 100, next: 50 })
        );
        assert!(sample_convergence(4, &[100, 100]).is_err());
    }

    #[test]
    fn test_oversized_bound_is_an_error() {
        assert_eq!(
            sample_convergence(3, &[10, u64::MAX]),
            Err(DirichletError::BoundTooLarge {
                bound: u64::MAX,
                max: crate::sieve::MAX_SIEVE_BOUND,
            })
        );
        assert!(matches!(
            sample_convergence(4, &[1_000, 2_000_000_000]),
            Err(DirichletError::BoundTooLarge { bound: 2_000_000_000, .. })
        ));
    }

    #[test]
    fn test_empty_bounds_give_empty_trajectory() {
        let trajectory = sample_convergence(3, &[]).unwrap();
        assert!(trajectory.is_empty());
        assert_eq!(trajectory.phi, 2);
    }

    #[test]
    fn test_sampler_rejects_bounds_past_sieve() {
        let primes = generate_primes(1_000);
        let sampler = ConvergenceSampler::new(&primes);
        assert!(matches!(
            sampler.trajectory(4, &[500, 2_000]),
            Err(DirichletError::BoundTooLarge { bound: 2_000, max: 1_000 })
        ));
    }

    #[test]
    fn test_shared_sampler_serves_several_moduli() {
        let primes = generate_primes(50_000);
        let sampler = ConvergenceSampler::new(&primes);
        for n in [3, 4, 5, 12] {
            let trajectory = sampler.trajectory(n, &[10_000, 50_000]).unwrap();
            let direct = DensityEstimator::new(n).unwrap().snapshot(50_000, &primes);
            assert_eq!(trajectory.last(), Some(&direct));
            assert_eq!(
                trajectory.last().map(|s| s.densities.clone()),
                estimate_density(&primes, n).ok().map(|s| s.densities)
            );
        }
    }

    #[test]
    fn test_series_extracts_one_class() {
        let trajectory = sample_convergence(4, &[10, 100]).unwrap();
        // up to 10: 2,3,5,7 -> class 1 holds {5}
        assert_eq!(trajectory.series(1)[0], 0.25);
        assert_eq!(trajectory.series(2), vec![0.0, 0.0]);
    }

    #[test]
    fn test_error_shrinks_with_bound() {
        let trajectory = sample_convergence(4, &[1_000, 500_000]).unwrap();
        let errors = trajectory.max_errors();
        assert!(errors[1] < errors[0]);
        assert!(errors[1] < 0.01);
    }

    #[test]
    fn test_linear_bounds() {
        assert_eq!(linear_bounds(0, 100, 5).unwrap(), vec![0, 25, 50, 75, 100]);
        assert_eq!(linear_bounds(10, 10, 3).unwrap(), vec![10]);
        assert_eq!(linear_bounds(1, 9, 1).unwrap(), vec![9]);
        assert!(linear_bounds(1, 9, 0).unwrap().is_empty());
        assert!(linear_bounds(9, 1, 3).is_err());
    }

    #[test]
    fn test_log_bounds() {
        let bounds = log_bounds(10, 1_000_000, 6).unwrap();
        assert_eq!(bounds, vec![10, 100, 1_000, 10_000, 100_000, 1_000_000]);
        let dense = log_bounds(1, 20, 50).unwrap();
        assert!(validate_bounds(&dense).is_ok());
        assert_eq!(dense.first(), Some(&1));
        assert_eq!(dense.last(), Some(&20));
    }
}
