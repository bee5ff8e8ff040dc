//! Grouping primes into residue classes mod N.

use serde::Serialize;

use crate::error::{DirichletError, Result};

/// Smallest modulus for which residue classes are meaningful.
pub const MIN_MODULUS: u64 = 2;

/// Largest modulus accepted anywhere in the pipeline.
///
/// Every per-modulus table (classes, counts, coprime mask) holds N entries.
pub const MAX_MODULUS: u64 = 1_000_000;

/// Primes grouped by residue: `classes[r]` holds every supplied p with
/// p mod N = r, in the order they were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResiduePartition {
    modulus: u64,
    classes: Vec<Vec<u64>>,
}

impl ResiduePartition {
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Primes in class `r`. Residues outside 0..N give an empty slice.
    pub fn class(&self, r: u64) -> &[u64] {
        usize::try_from(r)
            .ok()
            .and_then(|r| self.classes.get(r))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn class_sizes(&self) -> Vec<usize> {
        self.classes.iter().map(Vec::len).collect()
    }

    /// Total number of primes across all classes.
    pub fn total(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    /// `(residue, primes)` pairs in residue order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[u64])> + '_ {
        self.classes
            .iter()
            .enumerate()
            .map(|(r, class)| (r as u64, class.as_slice()))
    }
}

/// Partition `primes` by residue class modulo `n`.
///
/// This is a pure grouping step: nothing is re-checked for primality, and the
/// relative order of the input is kept inside each class. Moduli below 2 are
/// rejected before any work is done.
pub fn partition_by_residue(primes: &[u64], n: u64) -> Result<ResiduePartition> {
    check_modulus(n, MIN_MODULUS)?;
    Ok(group_by_residue(primes, n))
}

/// Per-class prime counts mod `n` without materializing the classes.
pub fn count_by_residue(primes: &[u64], n: u64) -> Result<Vec<usize>> {
    check_modulus(n, MIN_MODULUS)?;
    Ok(tally(primes, n))
}

/// `n` must lie in `min..=MAX_MODULUS`.
pub fn check_modulus(n: u64, min: u64) -> Result<()> {
    if n < min {
        return Err(DirichletError::InvalidModulus { modulus: n, min });
    }
    if n > MAX_MODULUS {
        return Err(DirichletError::ModulusTooLarge {
            modulus: n,
            max: MAX_MODULUS,
        });
    }
    Ok(())
}

/// Grouping without the modulus check; `n` must be at least 1.
pub(crate) fn group_by_residue(primes: &[u64], n: u64) -> ResiduePartition {
    let mut classes = vec![Vec::new(); n as usize];
    for &p in primes {
        classes[(p % n) as usize].push(p);
    }
    ResiduePartition {
        modulus: n,
        classes,
    }
}

/// Counting without the modulus check; `n` must be at least 1.
pub(crate) fn tally(primes: &[u64], n: u64) -> Vec<usize> {
    let mut counts = vec![0usize; n as usize];
    for &p in primes {
        counts[(p % n) as usize] += 1;
    }
    counts
}
