// crates/warden-gate/src/lib.rs
//
// warden-gate: Proof-of-personhood gate in front of the yield vault.
//
// Users (or vaults acting for them) submit zero-knowledge proofs. A valid,
// previously unseen nullifier unlocks vault operations for one TTL window.

pub mod config;
pub mod gate;
pub mod record;

// Re-export key types for ergonomic access from downstream crates.
pub use config::{
    validate_ttl, GateConfig, GateGenesis, DEFAULT_VERIFICATION_TTL, MAX_VERIFICATION_TTL,
    MIN_VERIFICATION_TTL,
};
pub use gate::{IdentityGate, VerifyOutcome};
pub use record::VerificationRecord;
