//! # Dirichlet Density
//!
//! Empirical distribution of primes across residue classes mod N.
//!
//! Dirichlet's theorem says the primes are equidistributed among the phi(N)
//! residue classes coprime to N, each with limiting density 1/phi(N). This
//! crate measures how close finite samples get: it sieves primes up to a bound,
//! groups them by residue, computes per-class densities, samples those
//! densities over growing bounds from a single sieve, and turns the results
//! into plot payloads.
//!
//! The three core operations [`generate_primes`], [`partition_by_residue`] and
//! [`estimate_density`] are pure and independently callable.

pub mod arith;
pub mod cache;
pub mod config;
pub mod convergence;
pub mod density;
pub mod error;
pub mod plots;
pub mod render;
pub mod residue;
pub mod sieve;

pub use arith::euler_phi;
pub use cache::SieveCache;
pub use config::ExperimentConfig;
pub use convergence::{sample_convergence, ConvergenceSampler, ConvergenceTrajectory};
pub use density::{estimate_density, DensityEstimator, DensityNormalization, DensitySnapshot};
pub use error::{DirichletError, Result};
pub use plots::PlotSuite;
pub use residue::{partition_by_residue, ResiduePartition};
pub use sieve::{generate_primes, try_generate_primes, PrimeSet, PrimeView};
