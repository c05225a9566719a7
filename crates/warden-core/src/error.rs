use thiserror::Error;

use crate::types::{Address, Field, Timestamp};

/// Role an account must hold for a privileged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Configures bounds, authorizes vaults and sentinels, resets the breaker.
    Governance,
    /// Submits risk scores and trips the circuit breaker.
    Sentinel,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Governance => write!(f, "governance"),
            Role::Sentinel => write!(f, "sentinel"),
        }
    }
}

/// Error types for the Warden trust layer.
///
/// Every rejected operation surfaces one of these and leaves ledger state
/// untouched.
#[derive(Debug, Error)]
pub enum WardenError {
    // -- authorization ------------------------------------------------------
    /// Caller does not hold the role the operation requires.
    #[error("Unauthorized: {caller} is not {role}")]
    Unauthorized { caller: Address, role: Role },

    /// Proof signal is bound to a different account than the caller, and the
    /// caller is not an authorized vault.
    #[error("Signal mismatch: caller {caller} cannot verify on behalf of {user}")]
    SignalMismatch { caller: Address, user: Address },

    // -- validation ---------------------------------------------------------
    #[error("Zero address is not allowed")]
    ZeroAddress,

    #[error("Verification TTL {ttl}s out of bounds [{min}s, {max}s]")]
    TtlOutOfBounds { ttl: u64, min: u64, max: u64 },

    #[error("Risk threshold {value} bps out of bounds [{min}, {max}]")]
    ThresholdOutOfBounds { value: u32, min: u32, max: u32 },

    #[error("Invalid risk score {0} bps (max 10000)")]
    InvalidRiskScore(u32),

    #[error("Malformed proof: expected 8 words, got {words}")]
    MalformedProof { words: usize },

    #[error("Length mismatch: {factors} factors vs {weights} weights")]
    LengthMismatch { factors: usize, weights: usize },

    #[error("No risk factors supplied")]
    EmptyFactors,

    #[error("Invalid weight at index {index}: weights must be positive")]
    InvalidWeight { index: usize },

    #[error("Invalid circuit breaker policy: {0}")]
    InvalidBreakerPolicy(String),

    #[error("Invalid hex value: {0}")]
    InvalidHex(String),

    // -- state conflict -----------------------------------------------------
    #[error("Nullifier {0} has already been used")]
    NullifierAlreadyUsed(Field),

    #[error("Circuit breaker rate limited: {count} activations in current window (max {max}), window resets at {resets_at}")]
    RateLimited {
        count: u32,
        max: u32,
        resets_at: Timestamp,
    },

    #[error("Circuit breaker is not active")]
    NotActive,

    #[error("Circuit breaker is already active")]
    AlreadyActive,

    #[error("Circuit breaker is active; risk-sensitive operations are halted")]
    CircuitBreakerActive,

    #[error("Identity gate is paused")]
    Paused,

    #[error("Identity {0} is not verified")]
    NotVerified(Address),

    #[error("Ledger already initialized: {0}")]
    AlreadyInitialized(String),

    #[error("Ledger not initialized: {0}")]
    NotInitialized(String),

    #[error("Verifier mismatch: ledger expects {expected}, got {actual}")]
    VerifierMismatch { expected: Address, actual: Address },

    // -- external dependency ------------------------------------------------
    /// The proof verifier rejected the proof.
    #[error("Proof verification failed")]
    VerificationFailed,

    /// The proof verifier itself errored.
    #[error("Verifier error: {0}")]
    Verifier(String),

    // -- infrastructure -----------------------------------------------------
    /// Storage layer error (RocksDB, lock poisoning).
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for WardenError {
    fn from(e: serde_json::Error) -> Self {
        WardenError::Serialization(e.to_string())
    }
}
