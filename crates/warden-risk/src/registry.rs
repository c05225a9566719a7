// crates/warden-risk/src/registry.rs
//
// RiskRegistry: sentinel-reported protocol risk scores, alert counters,
// the global risk threshold and the circuit breaker.
//
// Ledger layout:
//   RiskState    "config"        -> RiskConfig
//   RiskState    "breaker"       -> CircuitBreakerState
//   RiskState    "total_alerts"  -> u64
//   Assessments  protocol bytes  -> RiskAssessment
//   AlertCounts  protocol bytes  -> u64
//   Sentinels    sentinel bytes  -> true (absent = not authorized)
//
// Roles: governance configures (protocols, sentinels, threshold) and resets
// the breaker; sentinels report scores and trip the breaker. The two sets are
// independent: governance is not implicitly a sentinel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use warden_core::error::{Role, WardenError};
use warden_core::events::{EventSink, LedgerEvent, TracingSink};
use warden_core::ledger::{scan_table, Table, Transaction};
use warden_core::traits::LedgerStore;
use warden_core::types::{Address, CallContext, ReportId, Timestamp};

use crate::breaker::{BreakerPolicy, CircuitBreakerState};
use crate::scoring::{self, RiskEvaluation, MAX_RISK_SCORE};

/// Lowest allowed alert threshold: 10%.
pub const MIN_RISK_THRESHOLD: u32 = 1_000;

/// Highest allowed alert threshold: 95%.
pub const MAX_RISK_THRESHOLD: u32 = 9_500;

/// Threshold used when genesis does not specify one: 70%.
pub const DEFAULT_RISK_THRESHOLD: u32 = 7_000;

const CONFIG_KEY: &[u8] = b"config";
const BREAKER_KEY: &[u8] = b"breaker";
const TOTAL_ALERTS_KEY: &[u8] = b"total_alerts";

/// Reject a threshold outside `[MIN_RISK_THRESHOLD, MAX_RISK_THRESHOLD]`.
pub fn validate_threshold(value: u32) -> Result<(), WardenError> {
    if !(MIN_RISK_THRESHOLD..=MAX_RISK_THRESHOLD).contains(&value) {
        return Err(WardenError::ThresholdOutOfBounds {
            value,
            min: MIN_RISK_THRESHOLD,
            max: MAX_RISK_THRESHOLD,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub governance: Address,
    /// Scores at or above this raise an alert (basis points).
    pub threshold: u32,
    pub breaker_policy: BreakerPolicy,
}

/// Latest risk report for one protocol.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub name: String,
    /// Basis points in `[0, 10000]`. Overwritten on every update.
    pub score: u32,
    pub last_updated: Timestamp,
    /// False until the first score update.
    pub is_monitored: bool,
}

/// Parameters for initializing a fresh registry.
#[derive(Debug, Clone)]
pub struct RiskGenesis {
    pub governance: Address,
    pub threshold: u32,
    pub breaker_policy: BreakerPolicy,
    /// Opens the breaker's first rate-limit window.
    pub genesis_time: Timestamp,
}

impl RiskGenesis {
    /// Genesis with the default threshold and breaker policy.
    pub fn new(governance: Address) -> Self {
        Self {
            governance,
            threshold: DEFAULT_RISK_THRESHOLD,
            breaker_policy: BreakerPolicy::default(),
            genesis_time: 0,
        }
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_breaker_policy(mut self, policy: BreakerPolicy) -> Self {
        self.breaker_policy = policy;
        self
    }

    pub fn at(mut self, genesis_time: Timestamp) -> Self {
        self.genesis_time = genesis_time;
        self
    }

    fn into_config(self) -> Result<(RiskConfig, CircuitBreakerState), WardenError> {
        if self.governance.is_zero() {
            return Err(WardenError::ZeroAddress);
        }
        validate_threshold(self.threshold)?;
        self.breaker_policy.validate()?;
        Ok((
            RiskConfig {
                governance: self.governance,
                threshold: self.threshold,
                breaker_policy: self.breaker_policy,
            },
            CircuitBreakerState::new(self.genesis_time),
        ))
    }
}

/// Result of a successful `update_risk_score` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub assessment: RiskAssessment,
    /// Whether the score met the threshold and bumped the alert counters.
    pub alert_raised: bool,
}

/// The protocol risk registry and circuit breaker.
pub struct RiskRegistry<S: LedgerStore> {
    store: Arc<S>,
    events: Arc<dyn EventSink>,
}

impl<S: LedgerStore> RiskRegistry<S> {
    /// Write the genesis configuration and an inactive breaker.
    ///
    /// # Errors
    /// `ZeroAddress`, `ThresholdOutOfBounds`, `InvalidBreakerPolicy`, or
    /// `AlreadyInitialized` if the ledger already holds a registry.
    pub fn initialize(store: Arc<S>, genesis: RiskGenesis) -> Result<Self, WardenError> {
        let (config, breaker) = genesis.into_config()?;

        let mut tx = Transaction::new(&*store);
        if tx.contains(Table::RiskState, CONFIG_KEY)? {
            return Err(WardenError::AlreadyInitialized("risk registry".to_string()));
        }
        tx.put(Table::RiskState, CONFIG_KEY, &config)?;
        tx.put(Table::RiskState, BREAKER_KEY, &breaker)?;
        tx.put(Table::RiskState, TOTAL_ALERTS_KEY, &0u64)?;
        tx.commit()?;

        tracing::info!(
            "Risk registry initialized: threshold={}bps, breaker window={}s max={}",
            config.threshold,
            config.breaker_policy.window_secs,
            config.breaker_policy.max_activations
        );

        Ok(Self {
            store,
            events: Arc::new(TracingSink),
        })
    }

    /// Attach to a ledger that already holds a registry.
    pub fn open(store: Arc<S>) -> Result<Self, WardenError> {
        let registry = Self {
            store,
            events: Arc::new(TracingSink),
        };
        registry.config()?;
        Ok(registry)
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    // ---------------------------------------------------------------------
    // Governance
    // ---------------------------------------------------------------------

    /// Register `protocol` for monitoring with a zero score.
    ///
    /// Re-registering an existing protocol renames it and keeps its score.
    pub fn add_protocol(&mut self, ctx: &CallContext, protocol: Address, name: &str) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        only_governance(&load_config(&tx)?, ctx)?;
        if protocol.is_zero() {
            return Err(WardenError::ZeroAddress);
        }

        let mut assessment = tx
            .get::<RiskAssessment>(Table::Assessments, protocol.as_bytes())?
            .unwrap_or_default();
        assessment.name = name.to_string();
        tx.put(Table::Assessments, protocol.as_bytes(), &assessment)?;
        tx.emit(LedgerEvent::ProtocolAdded {
            protocol,
            name: name.to_string(),
        });
        self.finish(tx)?;

        tracing::info!("Protocol registered: {} ({})", protocol, name);
        Ok(())
    }

    pub fn set_sentinel_authorization(
        &mut self,
        ctx: &CallContext,
        sentinel: Address,
        authorized: bool,
    ) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        only_governance(&load_config(&tx)?, ctx)?;
        if sentinel.is_zero() {
            return Err(WardenError::ZeroAddress);
        }

        if authorized {
            tx.put(Table::Sentinels, sentinel.as_bytes(), &true)?;
        } else {
            tx.delete(Table::Sentinels, sentinel.as_bytes());
        }
        tx.emit(LedgerEvent::SentinelAuthorizationUpdated { sentinel, authorized });
        self.finish(tx)?;

        tracing::info!("Sentinel {} authorization set to {}", sentinel, authorized);
        Ok(())
    }

    /// Change the alert threshold. Past alert counts are not recomputed.
    pub fn set_threshold(&mut self, ctx: &CallContext, value: u32) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        let mut config = load_config(&tx)?;
        only_governance(&config, ctx)?;
        validate_threshold(value)?;

        let old_threshold = config.threshold;
        config.threshold = value;
        tx.put(Table::RiskState, CONFIG_KEY, &config)?;
        tx.emit(LedgerEvent::ThresholdUpdated {
            old_threshold,
            new_threshold: value,
        });
        self.finish(tx)?;

        tracing::info!("Risk threshold updated: {}bps -> {}bps", old_threshold, value);
        Ok(())
    }

    /// Reset the breaker. The rate-limit window is left as is.
    pub fn deactivate_circuit_breaker(&mut self, ctx: &CallContext) -> Result<(), WardenError> {
        let mut tx = Transaction::new(&*self.store);
        only_governance(&load_config(&tx)?, ctx)?;

        let mut breaker = load_breaker(&tx)?;
        breaker.deactivate()?;
        tx.put(Table::RiskState, BREAKER_KEY, &breaker)?;
        tx.emit(LedgerEvent::CircuitBreakerDeactivated {
            deactivated_at: ctx.timestamp,
        });
        self.finish(tx)?;

        tracing::warn!("Circuit breaker deactivated by {}", ctx.caller);
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
        tx.put(Table::RiskState, CONFIG_KEY, &config)?;
        tx.emit(LedgerEvent::GovernanceTransferred {
            previous,
            new: new_governance,
        });
        self.finish(tx)?;

        tracing::info!("Risk governance transferred: {} -> {}", previous, new_governance);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Sentinel
    // ---------------------------------------------------------------------

    /// Record a new score for `protocol`, raising an alert if it meets the
    /// threshold in force right now. Never touches the circuit breaker.
    pub fn update_risk_score(
        &mut self,
        ctx: &CallContext,
        protocol: Address,
        score: u32,
        report_id: ReportId,
    ) -> Result<ScoreUpdate, WardenError> {
        let mut tx = Transaction::new(&*self.store);
        let config = load_config(&tx)?;
        only_sentinel(&tx, ctx)?;
        if score > MAX_RISK_SCORE {
            return Err(WardenError::InvalidRiskScore(score));
        }

        let mut assessment = tx
            .get::<RiskAssessment>(Table::Assessments, protocol.as_bytes())?
            .unwrap_or_default();
        assessment.score = score;
        assessment.last_updated = ctx.timestamp;
        assessment.is_monitored = true;
        tx.put(Table::Assessments, protocol.as_bytes(), &assessment)?;
        tx.emit(LedgerEvent::RiskScoreUpdated {
            protocol,
            score,
            report_id,
            timestamp: ctx.timestamp,
        });

        let alert_raised = score >= config.threshold;
        if alert_raised {
            let count = tx.get::<u64>(Table::AlertCounts, protocol.as_bytes())?.unwrap_or(0);
            let total = tx.get::<u64>(Table::RiskState, TOTAL_ALERTS_KEY)?.unwrap_or(0);
            tx.put(Table::AlertCounts, protocol.as_bytes(), &(count + 1))?;
            tx.put(Table::RiskState, TOTAL_ALERTS_KEY, &(total + 1))?;
            tx.emit(LedgerEvent::AlertRaised {
                protocol,
                score,
                threshold: config.threshold,
                report_id,
            });
        }
        self.finish(tx)?;

        if alert_raised {
            tracing::warn!(
                "Risk alert for {}: score {}bps >= threshold {}bps (report {})",
                protocol,
                score,
                config.threshold,
                report_id
            );
        } else {
            tracing::info!("Risk score for {} updated to {}bps", protocol, score);
        }
        Ok(ScoreUpdate {
            assessment,
            alert_raised,
        })
    }

    /// Trip the global breaker, subject to the windowed rate limit.
    pub fn activate_circuit_breaker(
        &mut self,
        ctx: &CallContext,
        report_id: ReportId,
    ) -> Result<CircuitBreakerState, WardenError> {
        let mut tx = Transaction::new(&*self.store);
        let config = load_config(&tx)?;
        only_sentinel(&tx, ctx)?;

        let mut breaker = load_breaker(&tx)?;
        if let Err(e) = breaker.activate(&config.breaker_policy, ctx.timestamp, report_id) {
            tracing::warn!("Circuit breaker activation by {} rejected: {}", ctx.caller, e);
            return Err(e);
        }
        tx.put(Table::RiskState, BREAKER_KEY, &breaker)?;
        tx.emit(LedgerEvent::CircuitBreakerActivated {
            report_id,
            activated_at: breaker.activated_at,
            activation_count: breaker.activation_count,
        });
        self.finish(tx)?;

        tracing::warn!(
            "Circuit breaker ACTIVATED by {} (report {}, {}/{} this window)",
            ctx.caller,
            report_id,
            breaker.activation_count,
            config.breaker_policy.max_activations
        );
        Ok(breaker)
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// True iff the protocol's current score is below the threshold.
    /// Unknown protocols score 0 and so read as safe.
    pub fn is_protocol_safe(&self, protocol: &Address) -> Result<bool, WardenError> {
        let score = self.assessment(protocol)?.map(|a| a.score).unwrap_or(0);
        Ok(score < self.threshold()?)
    }

    pub fn alert_count(&self, protocol: &Address) -> Result<u64, WardenError> {
        Ok(Transaction::new(&*self.store)
            .get(Table::AlertCounts, protocol.as_bytes())?
            .unwrap_or(0))
    }

    pub fn total_alerts(&self) -> Result<u64, WardenError> {
        Ok(Transaction::new(&*self.store)
            .get(Table::RiskState, TOTAL_ALERTS_KEY)?
            .unwrap_or(0))
    }

    pub fn assessment(&self, protocol: &Address) -> Result<Option<RiskAssessment>, WardenError> {
        Transaction::new(&*self.store).get(Table::Assessments, protocol.as_bytes())
    }

    /// Every registered or scored protocol, ordered by address.
    pub fn protocols(&self) -> Result<Vec<(Address, RiskAssessment)>, WardenError> {
        let rows: Vec<(Vec<u8>, RiskAssessment)> = scan_table(&*self.store, Table::Assessments)?;
        Ok(rows
            .into_iter()
            .filter_map(|(key, assessment)| {
                <[u8; 20]>::try_from(key.as_slice())
                    .ok()
                    .map(|bytes| (Address(bytes), assessment))
            })
            .collect())
    }

    pub fn breaker_state(&self) -> Result<CircuitBreakerState, WardenError> {
        load_breaker(&Transaction::new(&*self.store))
    }

    pub fn is_circuit_breaker_active(&self) -> Result<bool, WardenError> {
        Ok(self.breaker_state()?.is_active)
    }

    /// Guard for risk-sensitive vault operations.
    pub fn require_breaker_inactive(&self) -> Result<(), WardenError> {
        if self.is_circuit_breaker_active()? {
            return Err(WardenError::CircuitBreakerActive);
        }
        Ok(())
    }

    pub fn threshold(&self) -> Result<u32, WardenError> {
        Ok(self.config()?.threshold)
    }

    pub fn config(&self) -> Result<RiskConfig, WardenError> {
        load_config(&Transaction::new(&*self.store))
    }

    pub fn is_sentinel(&self, account: &Address) -> Result<bool, WardenError> {
        Transaction::new(&*self.store).contains(Table::Sentinels, account.as_bytes())
    }

    /// Weighted aggregate of `factors`. Pure; reads no ledger state.
    pub fn evaluate_risk(&self, factors: &[u32], weights: &[u32]) -> Result<RiskEvaluation, WardenError> {
        scoring::evaluate_risk(factors, weights)
    }

    fn finish(&self, tx: Transaction<'_, S>) -> Result<(), WardenError> {
        for event in tx.commit()? {
            self.events.publish(&event);
        }
        Ok(())
    }
}

fn load_config<S: LedgerStore + ?Sized>(tx: &Transaction<'_, S>) -> Result<RiskConfig, WardenError> {
    tx.get(Table::RiskState, CONFIG_KEY)?
        .ok_or_else(|| WardenError::NotInitialized("risk registry".to_string()))
}

fn load_breaker<S: LedgerStore + ?Sized>(tx: &Transaction<'_, S>) -> Result<CircuitBreakerState, WardenError> {
    tx.get(Table::RiskState, BREAKER_KEY)?
        .ok_or_else(|| WardenError::NotInitialized("circuit breaker".to_string()))
}

fn only_governance(config: &RiskConfig, ctx: &CallContext) -> Result<(), WardenError> {
    if ctx.caller != config.governance {
        tracing::warn!("Unauthorized governance call from {}", ctx.caller);
        return Err(WardenError::Unauthorized {
            caller: ctx.caller,
            role: Role::Governance,
        });
    }
    Ok(())
}

fn only_sentinel<S: LedgerStore + ?Sized>(tx: &Transaction<'_, S>, ctx: &CallContext) -> Result<(), WardenError> {
    if !tx.contains(Table::Sentinels, ctx.caller.as_bytes())? {
        tracing::warn!("Unauthorized sentinel call from {}", ctx.caller);
        return Err(WardenError::Unauthorized {
            caller: ctx.caller,
            role: Role::Sentinel,
        });
    }
    Ok(())
}
