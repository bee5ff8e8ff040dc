//! Empirical prime densities per residue class.
//!
//! For a modulus N, each coprime class r gets the share of primes p <= x with
//! p = r (mod N). Dirichlet's theorem says every coprime class tends to
//! 1/phi(N). Classes sharing a factor with N hold at most one prime, and their
//! density is reported as exactly 0 whatever they contain.

use serde::{Deserialize, Serialize};

use crate::arith::{coprime_mask, euler_phi};
use crate::error::Result;
use crate::residue::{check_modulus, tally};

/// Which primes form the denominator of an empirical density.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityNormalization {
    /// Divide by every prime <= x. Coprime densities then sum to slightly
    /// less than 1 because primes dividing N are counted but never assigned.
    #[default]
    AllPrimes,
    /// Divide only by primes coprime to N, so coprime densities sum to 1.
    CoprimePrimes,
}

/// Densities of every residue class mod N at one bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensitySnapshot {
    pub bound: u64,
    pub modulus: u64,
    /// Number of primes <= bound.
    pub total_primes: usize,
    /// Number of those primes lying in coprime classes.
    pub coprime_primes: usize,
    /// Raw class sizes, including non-coprime classes.
    pub counts: Vec<usize>,
    /// Empirical density per residue; 0 for non-coprime residues.
    pub densities: Vec<f64>,
    pub coprime: Vec<bool>,
    pub phi: u64,
    /// 1/phi(N), the limit every coprime class approaches.
    pub theoretical: f64,
    pub normalization: DensityNormalization,
}

impl DensitySnapshot {
    /// Density of class `r`, or 0 for residues outside 0..N.
    pub fn density(&self, r: u64) -> f64 {
        self.densities.get(r as usize).copied().unwrap_or(0.0)
    }

    pub fn count(&self, r: u64) -> usize {
        self.counts.get(r as usize).copied().unwrap_or(0)
    }

    pub fn is_coprime(&self, r: u64) -> bool {
        self.coprime.get(r as usize).copied().unwrap_or(false)
    }

    pub fn coprime_residues(&self) -> Vec<u64> {
        self.coprime
            .iter()
            .enumerate()
            .filter_map(|(r, &c)| c.then_some(r as u64))
            .collect()
    }

    /// Sum of densities over coprime classes.
    pub fn coprime_density_sum(&self) -> f64 {
        self.densities.iter().sum()
    }

    /// Largest |density(r) - 1/phi(N)| over coprime classes.
    pub fn max_abs_error(&self) -> f64 {
        self.densities
            .iter()
            .zip(&self.coprime)
            .filter(|(_, &c)| c)
            .map(|(&d, _)| (d - self.theoretical).abs())
            .fold(0.0, f64::max)
    }
}

/// Density calculator for one modulus.
///
/// The coprime mask and phi(N) are computed once here and reused for every
/// snapshot, which is what the convergence sampler relies on.
#[derive(Debug, Clone)]
pub struct DensityEstimator {
    modulus: u64,
    coprime: Vec<bool>,
    phi: u64,
    normalization: DensityNormalization,
}

impl DensityEstimator {
    /// Estimator for modulus `n`. N = 1 is accepted as the one-class case;
    /// N = 0 and anything above [`MAX_MODULUS`](crate::residue::MAX_MODULUS)
    /// are rejected.
    pub fn new(n: u64) -> Result<Self> {
        check_modulus(n, 1)?;
        Ok(Self {
            modulus: n,
            coprime: coprime_mask(n),
            phi: euler_phi(n),
            normalization: DensityNormalization::default(),
        })
    }

    pub fn with_normalization(mut self, normalization: DensityNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn phi(&self) -> u64 {
        self.phi
    }

    pub fn theoretical(&self) -> f64 {
        1.0 / self.phi as f64
    }

    /// Densities of `primes`, recorded as the state at `bound`.
    ///
    /// `primes` must be exactly the primes <= `bound`; with no primes every
    /// density is 0.
    pub fn snapshot(&self, bound: u64, primes: &[u64]) -> DensitySnapshot {
        let counts = tally(primes, self.modulus);
        let coprime_primes: usize = counts
            .iter()
            .zip(&self.coprime)
            .filter(|(_, &c)| c)
            .map(|(&k, _)| k)
            .sum();

        let denominator = match self.normalization {
            DensityNormalization::AllPrimes => primes.len(),
            DensityNormalization::CoprimePrimes => coprime_primes,
        };

        let densities = counts
            .iter()
            .zip(&self.coprime)
            .map(|(&k, &c)| {
                if c && denominator > 0 {
                    k as f64 / denominator as f64
                } else {
                    0.0
                }
            })
            .collect();

        DensitySnapshot {
            bound,
            modulus: self.modulus,
            total_primes: primes.len(),
            coprime_primes,
            counts,
            densities,
            coprime: self.coprime.clone(),
            phi: self.phi,
            theoretical: self.theoretical(),
            normalization: self.normalization,
        }
    }
}

/// Empirical density of every residue class mod `n` over `primes`.
///
/// Coprime class r gets |class r| / |primes|; every other class gets 0. The
/// snapshot's bound is the largest supplied prime (0 when `primes` is empty).
pub fn estimate_density(primes: &[u64], n: u64) -> Result<DensitySnapshot> {
    let estimator = DensityEstimator::new(n)?;
    let bound = primes.last().copied().unwrap_or(0);
    Ok(estimator.snapshot(bound, primes))
}
