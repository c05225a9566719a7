// crates/warden-gate/src/record.rs

use serde::{Deserialize, Serialize};

use warden_core::types::{Field, Timestamp};

/// Verification state for one user.
///
/// Written on every successful verification, flipped to unverified on
/// revocation, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub is_verified: bool,
    pub verified_at: Timestamp,
    /// Nullifier consumed by the verification that wrote this record.
    pub nullifier_hash: Field,
    /// `verified_at + ttl` at creation.
    pub expires_at: Timestamp,
}

impl VerificationRecord {
    pub fn new(verified_at: Timestamp, nullifier_hash: Field, ttl: u64) -> Self {
        Self {
            is_verified: true,
            verified_at,
            nullifier_hash,
            expires_at: verified_at.saturating_add(ttl),
        }
    }

    /// Verified and not yet past `expires_at` (inclusive).
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.is_verified && now <= self.expires_at
    }

    /// The record as a reader at `now` should see it: stale records read as
    /// unverified.
    pub fn as_of(&self, now: Timestamp) -> Self {
        Self {
            is_verified: self.is_valid_at(now),
            ..*self
        }
    }

    /// Seconds of validity left at `now`; zero once stale or revoked.
    pub fn remaining_at(&self, now: Timestamp) -> u64 {
        if self.is_valid_at(now) {
            self.expires_at - now
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;

    #[test]
    fn test_new_sets_expiry() {
        let rec = VerificationRecord::new(1_000, Field::from_u64(1), DAY);
        assert!(rec.is_verified);
        assert_eq!(rec.expires_at, 1_000 + DAY);
    }

    #[test]
    fn test_validity_is_inclusive_of_expiry() {
        let rec = VerificationRecord::new(1_000, Field::from_u64(1), DAY);
        assert!(rec.is_valid_at(1_000 + DAY));
        assert!(!rec.is_valid_at(1_000 + DAY + 1));
    }

    #[test]
    fn test_as_of_keeps_other_fields() {
        let rec = VerificationRecord::new(1_000, Field::from_u64(9), DAY);
        let stale = rec.as_of(1_000 + DAY + 1);
        assert!(!stale.is_verified);
        assert_eq!(stale.expires_at, rec.expires_at);
        assert_eq!(stale.nullifier_hash, rec.nullifier_hash);
        assert!(rec.is_verified);
    }

    #[test]
    fn test_remaining() {
        let rec = VerificationRecord::new(1_000, Field::from_u64(1), DAY);
        assert_eq!(rec.remaining_at(1_000), DAY);
        assert_eq!(rec.remaining_at(1_000 + DAY), 0);
        assert_eq!(rec.remaining_at(1_000 + DAY + 50), 0);

        let revoked = VerificationRecord {
            is_verified: false,
            ..rec
        };
        assert_eq!(revoked.remaining_at(1_000), 0);
    }
}
