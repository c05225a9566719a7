// crates/warden-cli/src/commands/init.rs
//
// `warden init`: write the genesis gate and registry configuration from the
// config file. Each component that is already initialized is left alone.

use warden_core::error::WardenError;
use warden_gate::IdentityGate;
use warden_risk::RiskRegistry;

use super::Session;
use crate::output::{print_view, KeyValueRow};

/// Run the init command.
pub fn run(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let config = &session.config;

    match IdentityGate::initialize(session.store.clone(), session.verifier(), config.gate_genesis()) {
        Ok(_) => {}
        Err(WardenError::AlreadyInitialized(what)) => {
            tracing::warn!("Skipping {}: already initialized", what);
        }
        Err(e) => return Err(e.into()),
    }

    match RiskRegistry::initialize(session.store.clone(), config.risk_genesis(session.ctx.timestamp)) {
        Ok(_) => {}
        Err(WardenError::AlreadyInitialized(what)) => {
            tracing::warn!("Skipping {}: already initialized", what);
        }
        Err(e) => return Err(e.into()),
    }

    let gate = session.open_gate()?.config()?;
    let risk = session.open_registry()?.config()?;

    let rows = vec![
        KeyValueRow::new("data_dir", config.data_path()),
        KeyValueRow::new("gate.governance", gate.governance),
        KeyValueRow::new("gate.verifier", gate.verifier),
        KeyValueRow::new("gate.group_id", gate.group_id),
        KeyValueRow::new("gate.app_id", &gate.app_id),
        KeyValueRow::new("gate.action_id", &gate.action_id),
        KeyValueRow::new("gate.external_nullifier_hash", gate.external_nullifier_hash),
        KeyValueRow::new("gate.verification_ttl", format!("{}s", gate.verification_ttl)),
        KeyValueRow::new("risk.governance", risk.governance),
        KeyValueRow::new("risk.threshold", format!("{} bps", risk.threshold)),
        KeyValueRow::new("risk.breaker_window", format!("{}s", risk.breaker_policy.window_secs)),
        KeyValueRow::new("risk.max_activations", risk.breaker_policy.max_activations),
    ];
    print_view(
        session.format,
        &serde_json::json!({ "gate": gate, "risk": risk }),
        &rows,
    );
    Ok(())
}
