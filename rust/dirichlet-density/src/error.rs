//! Error type shared by every stage of the density pipeline.

/// Errors raised when a caller hands the pipeline malformed input.
///
/// All computations are pure and deterministic, so there is nothing to retry:
/// each variant describes an input that is rejected before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirichletError {
    #[error("invalid bound {0}: prime bounds must be non-negative integers")]
    InvalidBound(i64),

    #[error("bound {bound} exceeds the sieve limit of {max}")]
    BoundTooLarge { bound: u64, max: u64 },

    #[error("invalid modulus {modulus}: at least {min} is required")]
    InvalidModulus { modulus: u64, min: u64 },

    #[error("modulus {modulus} exceeds the limit of {max}")]
    ModulusTooLarge { modulus: u64, max: u64 },

    #[error("sample bounds must be strictly ascending: {next} follows {previous} at index {index}")]
    UnorderedBounds {
        index: usize,
        previous: u64,
        next: u64,
    },

    #[error("race residues {a} and {b} must be distinct and coprime to {modulus}")]
    InvalidRaceResidue { modulus: u64, a: u64, b: u64 },

    #[error("at least one modulus is required")]
    EmptyModuli,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DirichletError>;
