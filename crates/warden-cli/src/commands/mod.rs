// crates/warden-cli/src/commands/mod.rs
//
// Command module declarations for the warden CLI, plus the per-invocation
// session every command runs against.

pub mod breaker;
pub mod gate;
pub mod init;
pub mod risk;

use std::sync::Arc;

use warden_core::error::WardenError;
use warden_core::events::EventLog;
use warden_core::types::CallContext;
use warden_gate::IdentityGate;
use warden_risk::RiskRegistry;
use warden_store::RocksStore;
use warden_verify::DigestVerifier;

use crate::config::WardenConfig;
use crate::output::{self, OutputFormat};

/// One CLI invocation: an open ledger, the acting account and its clock.
pub struct Session {
    pub config: WardenConfig,
    pub store: Arc<RocksStore>,
    pub ctx: CallContext,
    pub format: OutputFormat,
    events: Arc<EventLog>,
}

impl Session {
    pub fn new(config: WardenConfig, store: RocksStore, ctx: CallContext, format: OutputFormat) -> Self {
        Self {
            config,
            store: Arc::new(store),
            ctx,
            format,
            events: Arc::new(EventLog::new()),
        }
    }

    /// The verifier configured under `[gate]`.
    pub fn verifier(&self) -> Arc<DigestVerifier> {
        Arc::new(DigestVerifier::new(self.config.gate.verifier))
    }

    pub fn open_gate(&self) -> Result<IdentityGate<RocksStore>, WardenError> {
        Ok(IdentityGate::open(self.store.clone(), self.verifier())?.with_event_sink(self.events.clone()))
    }

    pub fn open_registry(&self) -> Result<RiskRegistry<RocksStore>, WardenError> {
        Ok(RiskRegistry::open(self.store.clone())?.with_event_sink(self.events.clone()))
    }

    /// Print and clear the events committed so far.
    pub fn print_events(&self) {
        output::print_events(self.format, &self.events.drain());
    }
}
