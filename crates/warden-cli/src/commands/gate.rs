// crates/warden-cli/src/commands/gate.rs
//
// `warden gate {...}`: identity gate commands.

use std::sync::Arc;

use clap::Subcommand;

use warden_core::crypto::signal_hash;
use warden_core::traits::ProofInputs;
use warden_core::types::{Address, Field, Proof};
use warden_gate::VerifyOutcome;
use warden_verify::{DigestProver, DigestVerifier};

use super::Session;
use crate::output::{print_view, KeyValueRow};

/// Identity gate subcommands.
#[derive(Debug, Subcommand)]
pub enum GateCmd {
    /// Produce a digest proof binding `user` to `nullifier` under the
    /// current gate configuration.
    Prove {
        #[arg(long)]
        user: Address,
        #[arg(long)]
        nullifier: Field,
        /// Merkle root of the identity group (hex).
        #[arg(long)]
        root: Option<Field>,
    },
    /// Submit a proof and verify `user` (the caller must be `user` or an
    /// authorized vault).
    Verify {
        #[arg(long)]
        user: Address,
        #[arg(long)]
        nullifier: Field,
        #[arg(long)]
        root: Option<Field>,
        /// Eight comma-separated hex proof words, as printed by `gate prove`.
        #[arg(long, value_delimiter = ',')]
        proof: Vec<Field>,
    },
    /// Show a user's verification, or the gate configuration and vaults.
    Status {
        #[arg(long)]
        user: Option<Address>,
    },
    /// Revoke a user's verification (governance).
    Revoke {
        #[arg(long)]
        user: Address,
    },
    /// Set the verification TTL in seconds (governance).
    SetTtl { ttl: u64 },
    /// Authorize a vault to verify on behalf of users (governance).
    AddVault { vault: Address },
    /// Remove a vault authorization (governance).
    RemoveVault { vault: Address },
    /// Halt identity verification (governance).
    Pause,
    /// Resume identity verification (governance).
    Unpause,
    /// Set the identity group id (governance).
    SetGroup { group_id: u64 },
    /// Set the action id and recompute the external nullifier (governance).
    SetAction { action_id: String },
    /// Point the gate at a different verifier address (governance).
    ///
    /// Later gate commands must open the gate with the new address: update
    /// `gate.verifier` in the config file or pass `--verifier <ADDRESS>`.
    SetVerifier { address: Address },
}

/// Run the gate subcommand.
pub fn run(cmd: &GateCmd, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = session.ctx;
    let mut gate = session.open_gate()?;

    match cmd {
        GateCmd::Prove { user, nullifier, root } => {
            let config = gate.config()?;
            let root = root.unwrap_or(Field::ZERO);
            let inputs = ProofInputs {
                root,
                group_id: config.group_id,
                signal_hash: signal_hash(user),
                nullifier_hash: *nullifier,
                external_nullifier_hash: config.external_nullifier_hash,
            };
            let proof = DigestProver::new(config.verifier).prove(&inputs);
            let words: Vec<String> = proof.words().iter().map(Field::to_hex).collect();

            let rows = vec![
                KeyValueRow::new("user", user),
                KeyValueRow::new("root", root),
                KeyValueRow::new("nullifier", nullifier),
                KeyValueRow::new("signal_hash", inputs.signal_hash),
                KeyValueRow::new("proof", words.join(",")),
            ];
            print_view(
                session.format,
                &serde_json::json!({
                    "user": user,
                    "root": root,
                    "nullifier": nullifier,
                    "signal_hash": inputs.signal_hash,
                    "proof": words,
                }),
                &rows,
            );
        }
        GateCmd::Verify {
            user,
            nullifier,
            root,
            proof,
        } => {
            let proof = Proof::from_words(proof.clone())?;
            let outcome = gate.verify_identity(&ctx, *user, root.unwrap_or(Field::ZERO), *nullifier, &proof)?;
            let status = match outcome {
                VerifyOutcome::Verified(_) => "verified",
                VerifyOutcome::AlreadyVerified(_) => "already verified",
            };
            let record = outcome.record();
            let rows = vec![
                KeyValueRow::new("user", user),
                KeyValueRow::new("outcome", status),
                KeyValueRow::new("verified_at", record.verified_at),
                KeyValueRow::new("expires_at", record.expires_at),
                KeyValueRow::new("nullifier", record.nullifier_hash),
            ];
            print_view(
                session.format,
                &serde_json::json!({ "user": user, "outcome": status, "record": record }),
                &rows,
            );
            session.print_events();
        }
        GateCmd::Status { user: Some(user) } => {
            let record = gate.verification_record(user, ctx.timestamp)?;
            let remaining = gate.remaining_validity(user, ctx.timestamp)?;
            let mut rows = vec![
                KeyValueRow::new("user", user),
                KeyValueRow::new("verified", record.map(|r| r.is_verified).unwrap_or(false)),
                KeyValueRow::new("remaining", format!("{}s", remaining)),
            ];
            if let Some(rec) = record {
                rows.push(KeyValueRow::new("verified_at", rec.verified_at));
                rows.push(KeyValueRow::new("expires_at", rec.expires_at));
                rows.push(KeyValueRow::new("nullifier", rec.nullifier_hash));
            }
            print_view(
                session.format,
                &serde_json::json!({ "user": user, "record": record, "remaining_secs": remaining }),
                &rows,
            );
        }
        GateCmd::Status { user: None } => {
            let config = gate.config()?;
            let vaults = gate.vaults()?;
            let vault_list: Vec<String> = vaults.iter().map(Address::to_hex).collect();
            let rows = vec![
                KeyValueRow::new("governance", config.governance),
                KeyValueRow::new("verifier", config.verifier),
                KeyValueRow::new("group_id", config.group_id),
                KeyValueRow::new("app_id", &config.app_id),
                KeyValueRow::new("action_id", &config.action_id),
                KeyValueRow::new("external_nullifier_hash", config.external_nullifier_hash),
                KeyValueRow::new("verification_ttl", format!("{}s", config.verification_ttl)),
                KeyValueRow::new("paused", config.paused),
                KeyValueRow::new("vaults", vault_list.join(", ")),
            ];
            print_view(
                session.format,
                &serde_json::json!({ "config": config, "vaults": vaults }),
                &rows,
            );
        }
        GateCmd::Revoke { user } => {
            gate.revoke_verification(&ctx, *user)?;
            session.print_events();
        }
        GateCmd::SetTtl { ttl } => {
            gate.set_verification_ttl(&ctx, *ttl)?;
            session.print_events();
        }
        GateCmd::AddVault { vault } => {
            gate.register_vault(&ctx, *vault)?;
            session.print_events();
        }
        GateCmd::RemoveVault { vault } => {
            gate.remove_vault(&ctx, *vault)?;
            session.print_events();
        }
        GateCmd::Pause => {
            gate.pause(&ctx)?;
            session.print_events();
        }
        GateCmd::Unpause => {
            gate.unpause(&ctx)?;
            session.print_events();
        }
        GateCmd::SetGroup { group_id } => {
            gate.set_group_id(&ctx, Field::from_u64(*group_id))?;
            session.print_events();
        }
        GateCmd::SetAction { action_id } => {
            gate.set_action_id(&ctx, action_id)?;
            session.print_events();
        }
        GateCmd::SetVerifier { address } => {
            gate.set_verifier(&ctx, Arc::new(DigestVerifier::new(*address)))?;
            session.print_events();
            eprintln!(
                "Gate now expects verifier {}: set gate.verifier in the config file or pass --verifier {}.",
                address, address
            );
        }
    }

    Ok(())
}
