// crates/warden-verify/src/lib.rs
//
// warden-verify: Proof verifiers the identity gate can be wired to.
//
// `StubVerifier` is a switchable test double. `DigestProver` and
// `DigestVerifier` form a transparent SHA-256 proof pair for development
// ledgers; they bind every public input but provide no zero knowledge.

pub mod prover;
pub mod verifier;

// Re-export key types for ergonomic access from downstream crates.
pub use prover::DigestProver;
pub use verifier::{DigestVerifier, StubMode, StubVerifier};
