//! In-process knobs for the standard set of plots.
//!
//! There is no configuration file. The binary starts from
//! [`ExperimentConfig::default`] and overrides fields from `--key=value`
//! arguments.

use serde::{Deserialize, Serialize};

use crate::arith::gcd;
use crate::convergence::validate_bounds;
use crate::density::DensityNormalization;
use crate::error::{DirichletError, Result};
use crate::residue::{check_modulus, MIN_MODULUS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// One convergence plot per modulus.
    pub convergence_moduli: Vec<u64>,
    /// Sample points shared by all convergence plots, strictly ascending.
    pub convergence_bounds: Vec<u64>,
    pub comparison_modulus: u64,
    pub comparison_bound: u64,
    /// Heatmap rows, top to bottom.
    pub heatmap_moduli: Vec<u64>,
    pub heatmap_bound: u64,
    pub race_modulus: u64,
    /// The race plots `race_residues.0` minus `race_residues.1`.
    pub race_residues: (u64, u64),
    pub race_bound: u64,
    pub normalization: DensityNormalization,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            convergence_moduli: vec![3, 4, 5],
            convergence_bounds: vec![10_000, 20_000, 40_000, 80_000, 120_000, 200_000],
            comparison_modulus: 12,
            comparison_bound: 200_000,
            heatmap_moduli: vec![3, 4, 5, 6, 8, 10, 12],
            heatmap_bound: 200_000,
            race_modulus: 4,
            race_residues: (1, 3),
            race_bound: 200_000,
            normalization: DensityNormalization::AllPrimes,
        }
    }
}

impl ExperimentConfig {
    /// Use `bound` for the comparison, heatmap and race plots.
    pub fn with_bound(mut self, bound: u64) -> Self {
        self.comparison_bound = bound;
        self.heatmap_bound = bound;
        self.race_bound = bound;
        self
    }

    /// The one sieve bound that covers every plot.
    pub fn max_bound(&self) -> u64 {
        self.convergence_bounds
            .iter()
            .copied()
            .chain([self.comparison_bound, self.heatmap_bound, self.race_bound])
            .max()
            .unwrap_or(0)
    }

    /// Reject settings no plot could be built from.
    pub fn validate(&self) -> Result<()> {
        validate_bounds(&self.convergence_bounds)?;
        if self.heatmap_moduli.is_empty() {
            return Err(DirichletError::EmptyModuli);
        }

        let moduli = self
            .convergence_moduli
            .iter()
            .chain(&self.heatmap_moduli)
            .chain([&self.comparison_modulus, &self.race_modulus]);
        for &n in moduli {
            check_modulus(n, MIN_MODULUS)?;
        }

        check_race_residues(self.race_modulus, self.race_residues)
    }
}

/// Race residues must be two distinct classes coprime to `n`.
pub fn check_race_residues(n: u64, (a, b): (u64, u64)) -> Result<()> {
    let valid = a != b && a < n && b < n && gcd(a, n) == 1 && gcd(b, n) == 1;
    if valid {
        Ok(())
    } else {
        Err(DirichletError::InvalidRaceResidue { modulus: n, a, b })
    }
}
