//! Explicit memo of sieve results, keyed by bound.
//!
//! There is no global state here: callers own a [`SieveCache`] and pass it to
//! whatever needs primes. A request for bound x is served by the smallest
//! cached sieve whose bound is >= x, as a prefix view.

use std::collections::BTreeMap;

use log::debug;

use crate::error::Result;
use crate::sieve::{check_bound, generate_primes, PrimeSet, PrimeView};

#[derive(Debug, Default)]
pub struct SieveCache {
    sieves: BTreeMap<u64, PrimeSet>,
    hits: u64,
    misses: u64,
}

impl SieveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache primed with one sieve at `bound`.
    pub fn with_bound(bound: u64) -> Result<Self> {
        let mut cache = Self::new();
        cache.covering(bound)?;
        Ok(cache)
    }

    /// A prime set sieved to at least `bound`, sieving only on a miss.
    ///
    /// A new sieve replaces the smaller ones it covers.
    pub fn covering(&mut self, bound: u64) -> Result<&PrimeSet> {
        check_bound(bound)?;

        let cached = self.sieves.range(bound..).next().map(|(&key, _)| key);
        let key = match cached {
            Some(key) => {
                self.hits += 1;
                debug!("sieve cache hit: bound {} served by sieve to {}", bound, key);
                key
            }
            None => {
                self.misses += 1;
                debug!("sieve cache miss: sieving to {}", bound);
                // every cached sieve is smaller than `bound`
                self.sieves.clear();
                bound
            }
        };

        let primes: &PrimeSet = self.sieves.entry(key).or_insert_with(|| generate_primes(key));
        Ok(primes)
    }

    /// Primes <= `bound`.
    pub fn view(&mut self, bound: u64) -> Result<PrimeView<'_>> {
        self.covering(bound)?.upto(bound)
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Number of sieves currently held.
    pub fn len(&self) -> usize {
        self.sieves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sieves.is_empty()
    }

    /// Largest bound answerable without sieving again.
    pub fn max_bound(&self) -> Option<u64> {
        self.sieves.keys().next_back().copied()
    }

    pub fn clear(&mut self) {
        self.sieves.clear();
    }
}
