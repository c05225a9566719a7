// crates/warden-cli/tests/end_to_end.rs
//
// End-to-end scenarios across the gate, the registry and both store backends.
//
// These tests use the public APIs of the library crates directly since the
// CLI is a binary crate with no lib.rs.

use std::sync::Arc;

use uuid::Uuid;

use warden_core::crypto::signal_hash;
use warden_core::events::{EventLog, LedgerEvent};
use warden_core::traits::{LedgerStore, ProofInputs};
use warden_core::types::{Address, CallContext, Field, Proof, ReportId, Timestamp};
use warden_core::WardenError;
use warden_gate::{GateGenesis, IdentityGate, VerifyOutcome};
use warden_risk::{BreakerStatus, RiskGenesis, RiskRegistry};
use warden_store::{MemoryStore, RocksStore};
use warden_verify::{DigestProver, DigestVerifier};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const T0: Timestamp = 1_700_000_000;
const MINUTE: u64 = 60;
const HOUR: u64 = 3_600;
const DAY: u64 = 86_400;

/// Create a temporary directory path using UUID to avoid conflicts.
fn temp_db_path(label: &str) -> String {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("warden_e2e_{}_{}", label, Uuid::now_v7()));
    path.to_string_lossy().to_string()
}

fn governance() -> Address {
    Address([0x60; 20])
}

fn verifier_addr() -> Address {
    Address([0x70; 20])
}

fn sentinel() -> Address {
    Address([0x5e; 20])
}

fn vault() -> Address {
    Address([0x5a; 20])
}

fn alice() -> Address {
    Address([0xa1; 20])
}

fn root() -> Field {
    Field::from_u64(0xfeed)
}

fn gov(timestamp: Timestamp) -> CallContext {
    CallContext::new(governance(), timestamp)
}

fn as_user(user: Address, timestamp: Timestamp) -> CallContext {
    CallContext::new(user, timestamp)
}

/// A digest proof for `user` against the gate's current configuration.
fn prove<S: LedgerStore>(gate: &IdentityGate<S>, user: Address, nullifier: Field) -> Proof {
    let config = gate.config().unwrap();
    DigestProver::new(config.verifier).prove(&ProofInputs {
        root: root(),
        group_id: config.group_id,
        signal_hash: signal_hash(&user),
        nullifier_hash: nullifier,
        external_nullifier_hash: config.external_nullifier_hash,
    })
}

fn init_gate<S: LedgerStore>(store: Arc<S>) -> IdentityGate<S> {
    IdentityGate::initialize(
        store,
        Arc::new(DigestVerifier::new(verifier_addr())),
        GateGenesis::new(governance(), "app_warden", "verify-human"),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Identity gate
// ---------------------------------------------------------------------------

#[test]
fn test_gate_lifecycle_on_rocksdb() {
    let store = Arc::new(RocksStore::open(&temp_db_path("gate")).unwrap());
    let mut gate = init_gate(store);

    let n1 = Field::from_u64(1);
    let proof = prove(&gate, alice(), n1);
    let outcome = gate
        .verify_identity(&as_user(alice(), T0), alice(), root(), n1, &proof)
        .unwrap();
    assert!(matches!(outcome, VerifyOutcome::Verified(rec) if rec.expires_at == T0 + DAY));

    // Verified up to and including the expiry second, stale one second later.
    assert!(gate.is_verified(&alice(), T0 + DAY - MINUTE).unwrap());
    assert!(gate.is_verified(&alice(), T0 + DAY).unwrap());
    assert!(!gate.is_verified(&alice(), T0 + DAY + 1).unwrap());
    assert!(gate.stored_record(&alice()).unwrap().unwrap().is_verified);

    // Same nullifier after expiry: replay.
    let later = T0 + 2 * DAY;
    assert!(matches!(
        gate.verify_identity(&as_user(alice(), later), alice(), root(), n1, &proof),
        Err(WardenError::NullifierAlreadyUsed(n)) if n == n1
    ));

    // Revoke, then a fresh nullifier re-verifies with a new expiry.
    gate.revoke_verification(&gov(later), alice()).unwrap();
    let n2 = Field::from_u64(2);
    let proof2 = prove(&gate, alice(), n2);
    let outcome = gate
        .verify_identity(&as_user(alice(), later), alice(), root(), n2, &proof2)
        .unwrap();
    assert_eq!(outcome.record().expires_at, later + DAY);
    assert!(gate.is_nullifier_used(&n1).unwrap());
    assert!(gate.is_nullifier_used(&n2).unwrap());
}

#[test]
fn test_gate_state_survives_reopen() {
    let path = temp_db_path("gate_reopen");
    let n1 = Field::from_u64(11);
    {
        let store = Arc::new(RocksStore::open(&path).unwrap());
        let mut gate = init_gate(store);
        gate.set_verification_ttl(&gov(T0), 2 * HOUR).unwrap();
        gate.register_vault(&gov(T0), vault()).unwrap();
        let proof = prove(&gate, alice(), n1);
        gate.verify_identity(&as_user(alice(), T0), alice(), root(), n1, &proof)
            .unwrap();
    }

    let store = Arc::new(RocksStore::open(&path).unwrap());
    let gate = IdentityGate::open(store.clone(), Arc::new(DigestVerifier::new(verifier_addr()))).unwrap();
    assert_eq!(gate.config().unwrap().verification_ttl, 2 * HOUR);
    assert!(gate.is_vault_authorized(&vault()).unwrap());
    assert!(gate.is_nullifier_used(&n1).unwrap());
    assert_eq!(gate.remaining_validity(&alice(), T0 + HOUR).unwrap(), HOUR);

    assert!(matches!(
        IdentityGate::open(store, Arc::new(DigestVerifier::new(Address([0x71; 20])))),
        Err(WardenError::VerifierMismatch { .. })
    ));
}

#[test]
fn test_vault_verifies_on_behalf_of_user() {
    let store = Arc::new(MemoryStore::new());
    let log = Arc::new(EventLog::new());
    let mut gate = init_gate(store).with_event_sink(log.clone());
    gate.register_vault(&gov(T0), vault()).unwrap();
    log.drain();

    // The proof is bound to alice's signal, submitted by the vault.
    let n = Field::from_u64(21);
    let proof = prove(&gate, alice(), n);
    gate.verify_identity(&as_user(vault(), T0), alice(), root(), n, &proof)
        .unwrap();
    assert!(gate.require_verified(&alice(), T0 + HOUR).is_ok());
    assert_eq!(
        log.events(),
        vec![LedgerEvent::IdentityVerified {
            user: alice(),
            caller: vault(),
            nullifier_hash: n,
            verified_at: T0,
            expires_at: T0 + DAY,
        }]
    );

    // A proof for alice does not verify bob, even through the vault.
    let bob = Address([0xb0; 20]);
    let n2 = Field::from_u64(22);
    let alice_proof = prove(&gate, alice(), n2);
    assert!(matches!(
        gate.verify_identity(&as_user(vault(), T0), bob, root(), n2, &alice_proof),
        Err(WardenError::VerificationFailed)
    ));
    assert!(!gate.is_nullifier_used(&n2).unwrap());
}

#[test]
fn test_action_change_invalidates_old_proofs() {
    let store = Arc::new(MemoryStore::new());
    let mut gate = init_gate(store);

    let n = Field::from_u64(31);
    let stale = prove(&gate, alice(), n);
    gate.set_action_id(&gov(T0), "verify-human-v2").unwrap();
    assert!(matches!(
        gate.verify_identity(&as_user(alice(), T0), alice(), root(), n, &stale),
        Err(WardenError::VerificationFailed)
    ));

    let fresh = prove(&gate, alice(), n);
    gate.verify_identity(&as_user(alice(), T0), alice(), root(), n, &fresh)
        .unwrap();
}

// ---------------------------------------------------------------------------
// Risk registry
// ---------------------------------------------------------------------------

#[test]
fn test_risk_end_to_end_on_rocksdb() {
    let path = temp_db_path("risk");
    let protocol = Address([0xaa; 20]);
    let id1 = ReportId([0x11; 32]);
    {
        let store = Arc::new(RocksStore::open(&path).unwrap());
        let mut registry =
            RiskRegistry::initialize(store, RiskGenesis::new(governance()).at(T0)).unwrap();
        registry.add_protocol(&gov(T0), protocol, "Lending Pool").unwrap();
        registry
            .set_sentinel_authorization(&gov(T0), sentinel(), true)
            .unwrap();

        let s = CallContext::new(sentinel(), T0 + 1);
        let update = registry.update_risk_score(&s, protocol, 9_200, id1).unwrap();
        assert!(update.alert_raised);
        registry.activate_circuit_breaker(&s, id1).unwrap();
        assert!(registry.require_breaker_inactive().is_err());
        registry.deactivate_circuit_breaker(&gov(T0 + 2)).unwrap();
    }

    let registry = RiskRegistry::open(Arc::new(RocksStore::open(&path).unwrap())).unwrap();
    assert_eq!(registry.alert_count(&protocol).unwrap(), 1);
    assert_eq!(registry.total_alerts().unwrap(), 1);
    let breaker = registry.breaker_state().unwrap();
    assert_eq!(breaker.status(), BreakerStatus::Inactive);
    assert_eq!(breaker.activation_count, 1);
    assert_eq!(breaker.last_trigger_report_id, id1);
    assert!(!registry.is_protocol_safe(&protocol).unwrap());
}

#[test]
fn test_rate_limit_persists_across_reopen() {
    let path = temp_db_path("breaker");
    {
        let store = Arc::new(RocksStore::open(&path).unwrap());
        let mut registry =
            RiskRegistry::initialize(store, RiskGenesis::new(governance()).at(T0)).unwrap();
        registry
            .set_sentinel_authorization(&gov(T0), sentinel(), true)
            .unwrap();
        for i in 0..3u8 {
            let now = T0 + u64::from(i) * MINUTE;
            registry
                .activate_circuit_breaker(&CallContext::new(sentinel(), now), ReportId([i; 32]))
                .unwrap();
            registry.deactivate_circuit_breaker(&gov(now)).unwrap();
        }
    }

    let mut registry = RiskRegistry::open(Arc::new(RocksStore::open(&path).unwrap())).unwrap();
    assert!(matches!(
        registry.activate_circuit_breaker(&CallContext::new(sentinel(), T0 + 10 * MINUTE), ReportId([9; 32])),
        Err(WardenError::RateLimited { count: 3, max: 3, .. })
    ));
    registry
        .activate_circuit_breaker(&CallContext::new(sentinel(), T0 + HOUR + 1), ReportId([10; 32]))
        .unwrap();
}

// ---------------------------------------------------------------------------
// Shared ledger
// ---------------------------------------------------------------------------

/// A vault deposit path consults both guards against one shared ledger.
#[test]
fn test_gate_and_registry_share_one_ledger() {
    let store = Arc::new(MemoryStore::new());
    let mut gate = init_gate(store.clone());
    let mut registry =
        RiskRegistry::initialize(store.clone(), RiskGenesis::new(governance()).at(T0)).unwrap();
    registry
        .set_sentinel_authorization(&gov(T0), sentinel(), true)
        .unwrap();

    let deposit_allowed = |gate: &IdentityGate<MemoryStore>, registry: &RiskRegistry<MemoryStore>, now: Timestamp| {
        gate.require_verified(&alice(), now)
            .and_then(|_| registry.require_breaker_inactive())
    };

    assert!(matches!(
        deposit_allowed(&gate, &registry, T0),
        Err(WardenError::NotVerified(_))
    ));

    let n = Field::from_u64(41);
    let proof = prove(&gate, alice(), n);
    gate.verify_identity(&as_user(alice(), T0), alice(), root(), n, &proof)
        .unwrap();
    assert!(deposit_allowed(&gate, &registry, T0 + 1).is_ok());

    registry
        .activate_circuit_breaker(&CallContext::new(sentinel(), T0 + 2), ReportId([1; 32]))
        .unwrap();
    assert!(matches!(
        deposit_allowed(&gate, &registry, T0 + 3),
        Err(WardenError::CircuitBreakerActive)
    ));

    // Pausing the gate does not affect existing verifications.
    registry.deactivate_circuit_breaker(&gov(T0 + 4)).unwrap();
    gate.pause(&gov(T0 + 4)).unwrap();
    assert!(deposit_allowed(&gate, &registry, T0 + 5).is_ok());
}
