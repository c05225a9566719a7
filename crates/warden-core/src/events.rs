// crates/warden-core/src/events.rs
//
// Externally observable notifications. Components publish these to an
// `EventSink` only after the transaction that produced them has committed.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::types::{Address, Field, ReportId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    // Identity gate
    IdentityVerified {
        user: Address,
        caller: Address,
        nullifier_hash: Field,
        verified_at: Timestamp,
        expires_at: Timestamp,
    },
    IdentityRevoked {
        user: Address,
        revoked_at: Timestamp,
    },
    VerificationTtlUpdated {
        old_ttl: u64,
        new_ttl: u64,
    },
    VaultRegistered {
        vault: Address,
    },
    VaultRemoved {
        vault: Address,
    },
    VerifierUpdated {
        old_verifier: Address,
        new_verifier: Address,
    },
    GroupIdUpdated {
        old_group_id: Field,
        new_group_id: Field,
    },
    ActionIdUpdated {
        action_id: String,
        external_nullifier_hash: Field,
    },
    GatePaused {
        by: Address,
    },
    GateUnpaused {
        by: Address,
    },

    // Risk registry
    ProtocolAdded {
        protocol: Address,
        name: String,
    },
    SentinelAuthorizationUpdated {
        sentinel: Address,
        authorized: bool,
    },
    RiskScoreUpdated {
        protocol: Address,
        score: u32,
        report_id: ReportId,
        timestamp: Timestamp,
    },
    AlertRaised {
        protocol: Address,
        score: u32,
        threshold: u32,
        report_id: ReportId,
    },
    ThresholdUpdated {
        old_threshold: u32,
        new_threshold: u32,
    },
    CircuitBreakerActivated {
        report_id: ReportId,
        activated_at: Timestamp,
        activation_count: u32,
    },
    CircuitBreakerDeactivated {
        deactivated_at: Timestamp,
    },

    // Shared
    GovernanceTransferred {
        previous: Address,
        new: Address,
    },
}

/// Receiver of committed ledger events.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &LedgerEvent);
}

/// Logs each event through `tracing`. Default sink for components.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: &LedgerEvent) {
        tracing::info!(?event, "ledger event");
    }
}

/// Keeps every published event in memory, in publication order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<LedgerEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events published so far.
    pub fn events(&self) -> Vec<LedgerEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Remove and return all events published so far.
    pub fn drain(&self) -> Vec<LedgerEvent> {
        match self.events.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for EventLog {
    fn publish(&self, event: &LedgerEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
