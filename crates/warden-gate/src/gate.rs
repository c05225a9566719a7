// crates/warden-gate/src/gate.rs
//
// IdentityGate: proof-of-personhood verification with replay and
// front-running protection.
//
// verify_identity order of checks:
//   1. gate paused                       -> Paused
//   2. caller already currently verified -> Ok(AlreadyVerified), no writes
//   3. caller != user and not a vault    -> SignalMismatch
//   4. nullifier already consumed        -> NullifierAlreadyUsed
//   5. external verifier                 -> VerificationFailed / Verifier(..)
//   6. consume nullifier, write record, emit IdentityVerified
//
// All reads happen before the verifier call and all writes after it, in one
// transaction that is dropped on any rejection.

use std::sync::Arc;

use warden_core::crypto::{external_nullifier_hash, signal_hash};
use warden_core::error::{Role, WardenError};
use warden_core::events::{EventSink, LedgerEvent, TracingSink};
use warden_core::ledger::{scan_table, Table, Transaction};
use warden_core::traits::{LedgerStore, ProofInputs, ProofVerifier};
use warden_core::types::{Address, CallContext, Field, Proof, Timestamp};

use crate::config::{validate_ttl, GateConfig, GateGenesis};
use crate::record::VerificationRecord;

const CONFIG_KEY: &[u8] = b"config";

/// Result of a successful `verify_identity` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// A fresh proof was accepted and a new record written.
    Verified(VerificationRecord),
    /// The caller already holds a valid record; nothing was checked or
    /// consumed.
    AlreadyVerified(VerificationRecord),
}

impl VerifyOutcome {
    pub fn record(&self) -> &VerificationRecord {
        match self {
            VerifyOutcome::Verified(rec) | VerifyOutcome::AlreadyVerified(rec) => rec,
        }
    }
}

/// The identity verification gate.
pub struct IdentityGate<S: LedgerStore> {
    store: Arc<S>,
    verifier: Arc<dyn ProofVerifier>,
    events: Arc<dyn EventSink>,
}

impl<S: LedgerStore> IdentityGate<S> {
    /// Write the genesis configuration to an empty ledger.
    ///
    /// # Errors
    /// `ZeroAddress` for a zero verifier or governance address,
    /// `TtlOutOfBounds` for a bad TTL, `AlreadyInitialized` if the ledger
    /// already holds a gate configuration.
    pub fn initialize(
        store: Arc<S>,
        verifier: Arc<dyn ProofVerifier>,
        genesis: GateGenesis,
    ) -> Result<Self, WardenError> {
        let config = genesis.into_config(verifier.address())?;

        let mut tx = Transaction::new(&*store);
        if tx.contains(Table::GateConfig, CONFIG_KEY)? {
            return Err(WardenError::AlreadyInitialized("identity gate".to_string()));
        }
        tx.put(Table::GateConfig, CONFIG_KEY, &config)?;
        tx.commit()?;

        tracing::info!(
            "Identity gate initialized: verifier={}, ttl={}s, action={}",
            config.verifier,
            config.verification_ttl,
            config.action_id
        );

        Ok(Self {
            store,
            verifier,
            events: Arc::new(TracingSink),
        })
    }

    /// Attach to a ledger that already holds a gate configuration.
    ///
    /// # Errors
    /// `NotInitialized` if no configuration exists, `VerifierMismatch` if the
    /// supplied verifier is not the one the ledger is configured for.
    pub fn open(store: Arc<S>, verifier: Arc<dyn ProofVerifier>) -> Result<Self, WardenError> {
        let gate = Self {
            store,
            verifier,
            events: Arc::new(TracingSink),
        };
        let config = gate.config()?;
        if config.verifier != gate.verifier.address() {
            return Err(WardenError::VerifierMismatch {
                expected: config.verifier,
                actual: gate.verifier.address(),
            });
        }
        Ok(gate)
    }

    /// Route committed events to `sink` instead of the tracing log.
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    // ---------------------------------------------------------------------
    // Verification
    // ---------------------------------------------------------------------

    /// Verify that `user` is a unique human, unlocking vault access for one
    /// TTL window.
    pub fn verify_identity(
        &mut self,
        ctx: &CallContext,
        user: Address,
        root: Field,
        nullifier_hash: Field,
        proof: &Proof,
    ) -> Result<VerifyOutcome, WardenError> {
        let mut tx = Transaction::new(&*self.store);
        let config = load_config(&tx)?;

        if config.paused {
            return Err(WardenError::Paused);
        }

        if let Some(existing) = tx.get::<VerificationRecord>(Table::Verifications, ctx.caller.as_bytes())? {
            if existing.is_valid_at(ctx.timestamp) {
                tracing::debug!("Identity {} already verified until {}", ctx.caller, existing.expires_at);
                return Ok(VerifyOutcome::AlreadyVerified(existing));
            }
        }

        if ctx.caller != user && !tx.contains(Table::Vaults, ctx.caller.as_bytes())? {
            tracing::warn!("Signal mismatch: {} tried to verify {}", ctx.caller, user);
            return Err(WardenError::SignalMismatch {
                caller: ctx.caller,
                user,
            });
        }

        if tx.contains(Table::Nullifiers, nullifier_hash.as_bytes())? {
            tracing::warn!("Nullifier replay rejected: {}", nullifier_hash);
            return Err(WardenError::NullifierAlreadyUsed(nullifier_hash));
        }

        let inputs = ProofInputs {
            root,
            group_id: config.group_id,
            signal_hash: signal_hash(&user),
            nullifier_hash,
            external_nullifier_hash: config.external_nullifier_hash,
        };
        if !self.verifier.verify_proof(&inputs, proof)? {
            tracing::warn!("Proof rejected by verifier {} for {}", config.verifier, user);
            return Err(WardenError::VerificationFailed);
        }

        let record = VerificationRecord::new(ctx.timestamp, nullifier_hash, config.verification_ttl);
        tx.put(Table::Nullifiers, nullifier_hash.as_bytes(), &ctx.timestamp)?;
        tx.put(Table::Verifications, user.as_bytes(), &record)?;
        tx.emit(LedgerEvent::IdentityVerified {
            user,
            caller: ctx.caller,
            nullifier_hash,
            verified_at: record.verified_at,
            expires_at: record.expires_at,
        });
        self.finish(tx)?;

        tracing::info!("Identity {} verified until {}", user, record.expires_at);
        Ok(VerifyOutcome::Verified(record))
    }

    /// Whether `user` holds a current, unexpired verification at `now`.
    pub fn is_verified(&self, user: &Address, now: Timestamp) -> Result<bool, WardenError> {
        Ok(self
            .stored_record(user)?
            .map(|rec| rec.is_valid_at(now))
            .unwrap_or(false))
    }

    /// The user's record as seen at `now`: stale records read as unverified.
    pub fn verification_record(
        &self,
        user: &Address,
        now: Timestamp,
    ) -> Result<Option<VerificationRecord>, WardenError> {
        Ok(self.stored_record(user)?.map(|rec| rec.as_of(now)))
    }

    /// The record exactly as stored, without staleness adjustment.
    pub fn stored_record(&self, user: &Address) -> Result<Option<VerificationRecord>, WardenError> {
        Transaction::new(&*self.store).get(Table::Verifications, user.as_bytes())
    }

    /// Seconds until `user`'s verification goes stale (0 if not verified).
    pub fn remaining_validity(&self, user: &Address, now: Timestamp) -> Result<u64, WardenError> {
        Ok(self
            .stored_record(user)?
            .map(|rec| rec.remaining_at(now))
            .unwrap_or(0))
    }

    /// Guard for vault operations: fails with `NotVerified` unless `user` is
    /// currently verified.
    pub fn require_verified(&self, user: &Address, now: Timestamp) -> Result<(), WardenError> {
        if self.is_verified(user, now)? {
            Ok(())
        } else {
            Err(WardenError::NotVerified(*user))
        }
    }

    pub fn is_nullifier_used(&self, nullifier_hash: &Field) -> Result<bool, WardenError> {
        Transaction::new(&*self.store).contains(Table::Nullifiers, nullifier_hash.as_bytes())
    }

    pub fn is_vault_authorized(&self, vault: &Address) -> Result<bool, WardenError> {
        Transaction::new(&*self.store).contains(Table::Vaults, vault.as_bytes())
    }

    /// All authorized vault addresses.
    pub fn vaults(&self) -> Result<Vec<Address>, WardenError> {
        let rows: Vec<(Vec<u8>, bool)> = scan_table(&*self.store, Table::Vaults)?;
        Ok(rows
            .into_iter()
            .filter_map(|(key, _)| <[u8; 20]>::try_from(key.as_slice()).ok().map(Address))
            .collect())
    }

    pub fn config(&self) -> Result<GateConfig, WardenError> {
        load_config(&Transaction::new(&*self.store))
    }

    // ---------------------------------------------------------------------
    // Governance
    // ---------------------------------------------------------------------

    /// Revoke `user`'s verification. The consumed nullifier stays consumed.
    ///
    /// Revoking a user with no record is a no-op.
    pub fn revoke_verification(&mut self, ctx: &CallContext, user: Address) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        only_governance(&load_config(&tx)?, ctx)?;

        let Some(mut record) = tx.get::<VerificationRecord>(Table::Verifications, user.as_bytes())? else {
            tracing::debug!("Revocation of {} skipped: no verification record", user);
            return Ok(());
        };
        record.is_verified = false;
        tx.put(Table::Verifications, user.as_bytes(), &record)?;
        tx.emit(LedgerEvent::IdentityRevoked {
            user,
            revoked_at: ctx.timestamp,
        });
        self.finish(tx)?;

        tracing::info!("Verification revoked for {}", user);
        Ok(())
    }

    pub fn set_verification_ttl(&mut self, ctx: &CallContext, ttl: u64) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        let mut config = load_config(&tx)?;
        only_governance(&config, ctx)?;
        validate_ttl(ttl)?;

        let old_ttl = config.verification_ttl;
        config.verification_ttl = ttl;
        tx.put(Table::GateConfig, CONFIG_KEY, &config)?;
        tx.emit(LedgerEvent::VerificationTtlUpdated { old_ttl, new_ttl: ttl });
        self.finish(tx)?;

        tracing::info!("Verification TTL updated: {}s -> {}s", old_ttl, ttl);
        Ok(())
    }

    pub fn register_vault(&mut self, ctx: &CallContext, vault: Address) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        only_governance(&load_config(&tx)?, ctx)?;
        if vault.is_zero() {
            return Err(WardenError::ZeroAddress);
        }

        tx.put(Table::Vaults, vault.as_bytes(), &true)?;
        tx.emit(LedgerEvent::VaultRegistered { vault });
        self.finish(tx)?;

        tracing::info!("Vault registered: {}", vault);
        Ok(())
    }

    pub fn remove_vault(&mut self, ctx: &CallContext, vault: Address) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        only_governance(&load_config(&tx)?, ctx)?;
        if vault.is_zero() {
            return Err(WardenError::ZeroAddress);
        }

        tx.delete(Table::Vaults, vault.as_bytes());
        tx.emit(LedgerEvent::VaultRemoved { vault });
        self.finish(tx)?;

        tracing::info!("Vault removed: {}", vault);
        Ok(())
    }

    /// Halt `verify_identity`. Reads and governance calls keep working.
    pub fn pause(&mut self, ctx: &CallContext) -> Result<(), WardenError> {
        self.set_paused(ctx, true)
    }

    pub fn unpause(&mut self, ctx: &CallContext) -> Result<(), WardenError> {
        self.set_paused(ctx, false)
    }

    fn set_paused(&mut self, ctx: &CallContext, paused: bool) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        let mut config = load_config(&tx)?;
        only_governance(&config, ctx)?;
        if config.paused == paused {
            return Ok(());
        }

        config.paused = paused;
        tx.put(Table::GateConfig, CONFIG_KEY, &config)?;
        tx.emit(if paused {
            LedgerEvent::GatePaused { by: ctx.caller }
        } else {
            LedgerEvent::GateUnpaused { by: ctx.caller }
        });
        self.finish(tx)?;

        tracing::warn!("Identity gate {} by {}", if paused { "paused" } else { "unpaused" }, ctx.caller);
        Ok(())
    }

    /// Point the gate at a different proof verifier.
    pub fn set_verifier(
        &mut self,
        ctx: &CallContext,
        verifier: Arc<dyn ProofVerifier>,
    ) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        let mut config = load_config(&tx)?;
        only_governance(&config, ctx)?;
        let new_verifier = verifier.address();
        if new_verifier.is_zero() {
            return Err(WardenError::ZeroAddress);
        }

        let old_verifier = config.verifier;
        config.verifier = new_verifier;
        tx.put(Table::GateConfig, CONFIG_KEY, &config)?;
        tx.emit(LedgerEvent::VerifierUpdated {
            old_verifier,
            new_verifier,
        });
        self.finish(tx)?;
        self.verifier = verifier;

        tracing::info!("Verifier updated: {} -> {}", old_verifier, new_verifier);
        Ok(())
    }

    pub fn set_group_id(&mut self, ctx: &CallContext, group_id: Field) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        let mut config = load_config(&tx)?;
        only_governance(&config, ctx)?;

        let old_group_id = config.group_id;
        config.group_id = group_id;
        tx.put(Table::GateConfig, CONFIG_KEY, &config)?;
        tx.emit(LedgerEvent::GroupIdUpdated {
            old_group_id,
            new_group_id: group_id,
        });
        self.finish(tx)?;

        tracing::info!("Group id updated: {} -> {}", old_group_id, group_id);
        Ok(())
    }

    /// Change the action and recompute the external nullifier from the
    /// configured app id.
    pub fn set_action_id(&mut self, ctx: &CallContext, action_id: &str) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        let mut config = load_config(&tx)?;
        only_governance(&config, ctx)?;

        config.action_id = action_id.to_string();
        config.external_nullifier_hash = external_nullifier_hash(&config.app_id, action_id);
        tx.put(Table::GateConfig, CONFIG_KEY, &config)?;
        tx.emit(LedgerEvent::ActionIdUpdated {
            action_id: config.action_id.clone(),
            external_nullifier_hash: config.external_nullifier_hash,
        });
        self.finish(tx)?;

        tracing::info!(
            "Action id updated to {:?}, external nullifier {}",
            action_id,
            config.external_nullifier_hash
        );
        Ok(())
    }

    pub fn transfer_governance(&mut self, ctx: &CallContext, new_governance: Address) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        let mut config = load_config(&tx)?;
        only_governance(&config, ctx)?;
        if new_governance.is_zero() {
            return Err(WardenError::ZeroAddress);
        }

        let previous = config.governance;
        config.governance = new_governance;
        tx.put(Table::GateConfig, CONFIG_KEY, &config)?;
        tx.emit(LedgerEvent::GovernanceTransferred {
            previous,
            new: new_governance,
        });
        self.finish(tx)?;

        tracing::info!("Gate governance transferred: {} -> {}", previous, new_governance);
        Ok(())
    }

    /// Commit and publish the transaction's events.
    fn finish(&self, tx: Transaction<'_, S>) -> Result<(), WardenError> {
        for event in tx.commit()? {
            self.events.publish(&event);
        }
        Ok(())
    }
}

fn load_config<S: LedgerStore + ?Sized>(tx: &Transaction<'_, S>) -> Result<GateConfig, WardenError> {
    tx.get(Table::GateConfig, CONFIG_KEY)?
        .ok_or_else(|| WardenError::NotInitialized("identity gate".to_string()))
}

fn only_governance(config: &GateConfig, ctx: &CallContext) -> Result<(), WardenError> {
    if ctx.caller != config.governance {
        tracing::warn!("Unauthorized governance call from {}", ctx.caller);
        return Err(WardenError::Unauthorized {
            caller: ctx.caller,
            role: Role::Governance,
        });
    }
    Ok(())
}
