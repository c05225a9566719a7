// crates/warden-gate/src/config.rs
//
// Gate configuration stored on the ledger, and its genesis parameters.
//
// TTL bounds:
//   - Minimum: 1 hour
//   - Maximum: 30 days
// Out-of-bounds values are rejected, never clamped.

use serde::{Deserialize, Serialize};

use warden_core::crypto::external_nullifier_hash;
use warden_core::error::WardenError;
use warden_core::types::{Address, Field};

/// Shortest allowed verification TTL: 1 hour.
pub const MIN_VERIFICATION_TTL: u64 = 3_600;

/// Longest allowed verification TTL: 30 days.
pub const MAX_VERIFICATION_TTL: u64 = 30 * 86_400;

/// TTL used when genesis does not specify one: 24 hours.
pub const DEFAULT_VERIFICATION_TTL: u64 = 86_400;

/// Reject a TTL outside `[MIN_VERIFICATION_TTL, MAX_VERIFICATION_TTL]`.
pub fn validate_ttl(ttl: u64) -> Result<(), WardenError> {
    if !(MIN_VERIFICATION_TTL..=MAX_VERIFICATION_TTL).contains(&ttl) {
        return Err(WardenError::TtlOutOfBounds {
            ttl,
            min: MIN_VERIFICATION_TTL,
            max: MAX_VERIFICATION_TTL,
        });
    }
    Ok(())
}

/// Ledger-resident gate configuration. Mutable by governance only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub governance: Address,
    /// Address of the proof verifier the gate calls.
    pub verifier: Address,
    pub group_id: Field,
    pub app_id: String,
    pub action_id: String,
    /// Derived from `app_id` and `action_id`; recomputed whenever either changes.
    pub external_nullifier_hash: Field,
    pub verification_ttl: u64,
    pub paused: bool,
}

/// Parameters for initializing a fresh gate.
#[derive(Debug, Clone)]
pub struct GateGenesis {
    pub governance: Address,
    pub app_id: String,
    pub action_id: String,
    pub group_id: Field,
    pub verification_ttl: u64,
}

impl GateGenesis {
    /// Genesis with group id 1 and the default TTL.
    pub fn new(governance: Address, app_id: &str, action_id: &str) -> Self {
        Self {
            governance,
            app_id: app_id.to_string(),
            action_id: action_id.to_string(),
            group_id: Field::from_u64(1),
            verification_ttl: DEFAULT_VERIFICATION_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.verification_ttl = ttl;
        self
    }

    pub fn with_group_id(mut self, group_id: Field) -> Self {
        self.group_id = group_id;
        self
    }

    /// Validate and turn into the stored configuration.
    pub(crate) fn into_config(self, verifier: Address) -> Result<GateConfig, WardenError> {
        if verifier.is_zero() || self.governance.is_zero() {
            return Err(WardenError::ZeroAddress);
        }
        validate_ttl(self.verification_ttl)?;
        Ok(GateConfig {
            governance: self.governance,
            verifier,
            group_id: self.group_id,
            external_nullifier_hash: external_nullifier_hash(&self.app_id, &self.action_id),
            app_id: self.app_id,
            action_id: self.action_id,
            verification_ttl: self.verification_ttl,
            paused: false,
        })
    }
}
