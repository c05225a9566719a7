// crates/warden-cli/src/commands/breaker.rs
//
// `warden breaker {activate, deactivate, status}`: circuit breaker commands.

use clap::Subcommand;

use warden_core::types::ReportId;

use super::Session;
use crate::output::{print_view, KeyValueRow};

/// Circuit breaker subcommands.
#[derive(Debug, Subcommand)]
pub enum BreakerCmd {
    /// Trip the global circuit breaker (sentinel, rate limited).
    Activate {
        /// 32-byte id of the report justifying the activation (hex).
        #[arg(long)]
        report: ReportId,
    },
    /// Reset the circuit breaker (governance).
    Deactivate,
    /// Show breaker state and remaining activations in the current window.
    Status,
}

/// Run the breaker subcommand.
pub fn run(cmd: &BreakerCmd, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = session.ctx;
    let mut registry = session.open_registry()?;

    match cmd {
        BreakerCmd::Activate { report } => {
            registry.activate_circuit_breaker(&ctx, *report)?;
            session.print_events();
        }
        BreakerCmd::Deactivate => {
            registry.deactivate_circuit_breaker(&ctx)?;
            session.print_events();
        }
        BreakerCmd::Status => {
            let state = registry.breaker_state()?;
            let policy = registry.config()?.breaker_policy;
            let remaining = state.remaining_activations(&policy, ctx.timestamp);
            let rows = vec![
                KeyValueRow::new("status", state.status()),
                KeyValueRow::new("activated_at", state.activated_at),
                KeyValueRow::new("last_report", state.last_trigger_report_id),
                KeyValueRow::new(
                    "activations",
                    format!("{}/{} in window", state.activation_count, policy.max_activations),
                ),
                KeyValueRow::new("window_start", state.window_start),
                KeyValueRow::new("window_resets_at", state.window_resets_at(&policy)),
                KeyValueRow::new("remaining_activations", remaining),
            ];
            print_view(
                session.format,
                &serde_json::json!({
                    "state": state,
                    "policy": policy,
                    "remaining_activations": remaining,
                }),
                &rows,
            );
        }
    }

    Ok(())
}
