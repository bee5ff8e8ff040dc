//! Small-integer arithmetic for residue classes.
//!
//! Everything here works directly on the modulus by trial division. Moduli in
//! this crate are small (a few hundred at most), so none of it touches the
//! sieve.

use num_integer::Integer;

/// Greatest common divisor, with gcd(0, n) = n.
pub fn gcd(a: u64, b: u64) -> u64 {
    a.gcd(&b)
}

/// Distinct prime divisors of `n` in ascending order, by trial division.
pub fn distinct_prime_factors(n: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    let mut temp = n;
    let mut p = 2u64;
    while p * p <= temp {
        if temp % p == 0 {
            factors.push(p);
            while temp % p == 0 {
                temp /= p;
            }
        }
        p += 1;
    }
    if temp > 1 {
        factors.push(temp);
    }
    factors
}

/// Euler's totient via the product formula phi(n) = n * prod(1 - 1/p).
///
/// phi(0) = 0 and phi(1) = 1.
pub fn euler_phi(n: u64) -> u64 {
    if n <= 1 {
        return n;
    }
    distinct_prime_factors(n)
        .into_iter()
        .fold(n, |acc, p| acc - acc / p)
}

/// `mask[r]` is true iff gcd(r, n) = 1, for r in 0..n.
///
/// For n = 1 the single residue 0 counts as coprime, since gcd(0, 1) = 1.
pub fn coprime_mask(n: u64) -> Vec<bool> {
    (0..n).map(|r| gcd(r, n) == 1).collect()
}

/// Residues in 0..n coprime to n, ascending.
pub fn coprime_residues(n: u64) -> Vec<u64> {
    (0..n).filter(|&r| gcd(r, n) == 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euler_phi_known_values() {
        assert_eq!(euler_phi(1), 1);
        assert_eq!(euler_phi(2), 1);
        assert_eq!(euler_phi(3), 2);
        assert_eq!(euler_phi(4), 2);
        assert_eq!(euler_phi(5), 4);
        assert_eq!(euler_phi(12), 4);
        assert_eq!(euler_phi(36), 12);
        assert_eq!(euler_phi(97), 96);
        assert_eq!(euler_phi(210), 48);
    }

    #[test]
    fn test_euler_phi_matches_coprime_count() {
        for n in 1..=300u64 {
            let count = coprime_mask(n).iter().filter(|&&c| c).count() as u64;
            assert_eq!(euler_phi(n), count, "phi({}) disagrees with gcd count", n);
        }
    }

    #[test]
    fn test_distinct_prime_factors() {
        assert_eq!(distinct_prime_factors(1), Vec::<u64>::new());
        assert_eq!(distinct_prime_factors(12), vec![2, 3]);
        assert_eq!(distinct_prime_factors(97), vec![97]);
        assert_eq!(distinct_prime_factors(2 * 2 * 3 * 7 * 7 * 11), vec![2, 3, 7, 11]);
    }

    #[test]
    fn test_coprime_residues() {
        assert_eq!(coprime_residues(12), vec![1, 5, 7, 11]);
        assert_eq!(coprime_residues(4), vec![1, 3]);
        assert_eq!(coprime_residues(1), vec![0]);
        assert!(coprime_residues(0).is_empty());
    }
}
