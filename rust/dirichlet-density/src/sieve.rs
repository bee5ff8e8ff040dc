//! Prime generation by the sieve of Eratosthenes.
//!
//! A [`PrimeSet`] remembers the bound it was sieved to, so smaller bounds can
//! be answered as a prefix [`PrimeView`] without sieving again.

use std::ops::Deref;

use serde::Serialize;

use crate::error::{DirichletError, Result};

/// Largest bound accepted by [`try_generate_primes`].
///
/// The marker array costs one byte per integer, so this caps the sieve at
/// roughly 1 GiB of scratch memory.
pub const MAX_SIEVE_BOUND: u64 = 1_000_000_000;

/// All primes <= `bound`, strictly ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimeSet {
    bound: u64,
    primes: Vec<u64>,
}

/// Index-bounded prefix of a [`PrimeSet`]: the primes <= `bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimeView<'a> {
    bound: u64,
    primes: &'a [u64],
}

impl PrimeSet {
    /// The bound this set was sieved to (not necessarily prime).
    pub fn bound(&self) -> u64 {
        self.bound
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.primes
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.primes
    }

    /// The whole set as a view.
    pub fn view(&self) -> PrimeView<'_> {
        PrimeView {
            bound: self.bound,
            primes: &self.primes,
        }
    }

    /// Primes <= `bound` as a prefix of this set.
    ///
    /// Fails with [`DirichletError::BoundTooLarge`] when `bound` exceeds the
    /// sieved bound, since primes above it were never computed.
    pub fn upto(&self, bound: u64) -> Result<PrimeView<'_>> {
        if bound > self.bound {
            return Err(DirichletError::BoundTooLarge {
                bound,
                max: self.bound,
            });
        }
        let end = self.primes.partition_point(|&p| p <= bound);
        Ok(PrimeView {
            bound,
            primes: &self.primes[..end],
        })
    }

    /// pi(x) for x <= the sieved bound, by binary search.
    pub fn count_upto(&self, bound: u64) -> Result<usize> {
        self.upto(bound).map(|v| v.len())
    }
}

impl Deref for PrimeSet {
    type Target = [u64];

    fn deref(&self) -> &[u64] {
        &self.primes
    }
}

impl<'a> PrimeView<'a> {
    pub fn bound(&self) -> u64 {
        self.bound
    }

    pub fn primes(&self) -> &'a [u64] {
        self.primes
    }
}

impl Deref for PrimeView<'_> {
    type Target = [u64];

    fn deref(&self) -> &[u64] {
        self.primes
    }
}

/// Generate all primes <= `bound` with the sieve of Eratosthenes.
///
/// Bounds below 2 give an empty set. Each discovered prime strikes its
/// multiples starting from its square, so the work is O(n log log n).
///
/// Use [`try_generate_primes`] for bounds that come from outside the program;
/// this function trusts the caller to pass something that fits in memory.
pub fn generate_primes(bound: u64) -> PrimeSet {
    if bound < 2 {
        return PrimeSet {
            bound,
            primes: vec![],
        };
    }

    let limit = usize::try_from(bound).unwrap_or(usize::MAX);
    let mut is_prime = vec![true; limit + 1];
    is_prime[0] = false;
    is_prime[1] = false;

    let mut p = 2usize;
    while p * p <= limit {
        if is_prime[p] {
            let mut multiple = p * p;
            while multiple <= limit {
                is_prime[multiple] = false;
                multiple += p;
            }
        }
        p += 1;
    }

    let primes = is_prime
        .iter()
        .enumerate()
        .filter_map(|(i, &is_p)| if is_p { Some(i as u64) } else { None })
        .collect();

    PrimeSet { bound, primes }
}

/// Checked entry point for untrusted bounds.
///
/// Negative bounds are rejected with [`DirichletError::InvalidBound`] and
/// bounds above [`MAX_SIEVE_BOUND`] with [`DirichletError::BoundTooLarge`].
pub fn try_generate_primes(bound: i64) -> Result<PrimeSet> {
    let bound = u64::try_from(bound).map_err(|_| DirichletError::InvalidBound(bound))?;
    check_bound(bound)?;
    Ok(generate_primes(bound))
}

/// Reject bounds the sieve will not allocate for.
pub fn check_bound(bound: u64) -> Result<()> {
    if bound > MAX_SIEVE_BOUND {
        return Err(DirichletError::BoundTooLarge {
            bound,
            max: MAX_SIEVE_BOUND,
        });
    }
    Ok(())
}

/// Primality by trial division up to sqrt(n).
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
