// crates/warden-cli/src/commands/risk.rs
//
// `warden risk {...}`: risk registry commands.

use clap::Subcommand;
use tabled::Tabled;

use warden_core::types::{Address, ReportId};
use warden_risk::scoring;

use super::Session;
use crate::output::{format_json, format_table, print_view, KeyValueRow, OutputFormat};

/// Risk registry subcommands.
#[derive(Debug, Subcommand)]
pub enum RiskCmd {
    /// Register a protocol for monitoring (governance).
    AddProtocol {
        protocol: Address,
        #[arg(long)]
        name: String,
    },
    /// Authorize or revoke a sentinel (governance).
    SetSentinel {
        sentinel: Address,
        /// Revoke instead of authorize.
        #[arg(long)]
        revoke: bool,
    },
    /// Report a protocol's risk score in basis points (sentinel).
    Update {
        protocol: Address,
        #[arg(long)]
        score: u32,
        /// 32-byte report id (hex).
        #[arg(long)]
        report: ReportId,
    },
    /// Set the alert threshold in basis points (governance).
    SetThreshold { threshold: u32 },
    /// Weighted aggregate of comma-separated factors and weights. Offline.
    Evaluate {
        #[arg(long, value_delimiter = ',')]
        factors: Vec<u32>,
        #[arg(long, value_delimiter = ',')]
        weights: Vec<u32>,
    },
    /// Show one protocol, or every monitored protocol.
    Show {
        #[arg(long)]
        protocol: Option<Address>,
    },
}

#[derive(Tabled)]
struct ProtocolRow {
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Score (bps)")]
    score: u32,
    #[tabled(rename = "Monitored")]
    monitored: bool,
    #[tabled(rename = "Alerts")]
    alerts: u64,
    #[tabled(rename = "Safe")]
    safe: bool,
}

/// Run the risk subcommand.
pub fn run(cmd: &RiskCmd, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = session.ctx;

    match cmd {
        // Pure computation; no ledger needed.
        RiskCmd::Evaluate { factors, weights } => {
            let eval = scoring::evaluate_risk(factors, weights)?;
            let rows = vec![
                KeyValueRow::new("score", format!("{} bps", eval.score)),
                KeyValueRow::new("level", eval.level),
            ];
            print_view(session.format, &eval, &rows);
        }
        RiskCmd::AddProtocol { protocol, name } => {
            let mut registry = session.open_registry()?;
            registry.add_protocol(&ctx, *protocol, name)?;
            session.print_events();
        }
        RiskCmd::SetSentinel { sentinel, revoke } => {
            let mut registry = session.open_registry()?;
            registry.set_sentinel_authorization(&ctx, *sentinel, !revoke)?;
            session.print_events();
        }
        RiskCmd::Update {
            protocol,
            score,
            report,
        } => {
            let mut registry = session.open_registry()?;
            let update = registry.update_risk_score(&ctx, *protocol, *score, *report)?;
            if update.alert_raised {
                eprintln!(
                    "ALERT: {} scored {} bps (threshold {} bps)",
                    protocol,
                    score,
                    registry.threshold()?
                );
            }
            session.print_events();
        }
        RiskCmd::SetThreshold { threshold } => {
            let mut registry = session.open_registry()?;
            registry.set_threshold(&ctx, *threshold)?;
            session.print_events();
        }
        RiskCmd::Show { protocol } => {
            let registry = session.open_registry()?;
            let threshold = registry.threshold()?;
            let protocols = match protocol {
                Some(p) => registry
                    .assessment(p)?
                    .map(|a| vec![(*p, a)])
                    .unwrap_or_default(),
                None => registry.protocols()?,
            };

            let mut rows = Vec::with_capacity(protocols.len());
            for (addr, assessment) in &protocols {
                rows.push(ProtocolRow {
                    protocol: addr.to_hex(),
                    name: assessment.name.clone(),
                    score: assessment.score,
                    monitored: assessment.is_monitored,
                    alerts: registry.alert_count(addr)?,
                    safe: assessment.score < threshold,
                });
            }
            let total_alerts = registry.total_alerts()?;

            match session.format {
                OutputFormat::Json => {
                    let list: Vec<serde_json::Value> = protocols
                        .iter()
                        .zip(&rows)
                        .map(|((addr, assessment), row)| {
                            serde_json::json!({
                                "protocol": addr,
                                "assessment": assessment,
                                "alerts": row.alerts,
                                "safe": row.safe,
                            })
                        })
                        .collect();
                    println!(
                        "{}",
                        format_json(&serde_json::json!({
                            "threshold": threshold,
                            "total_alerts": total_alerts,
                            "protocols": list,
                        }))
                    );
                }
                OutputFormat::Table => {
                    println!("Threshold: {} bps   Total alerts: {}", threshold, total_alerts);
                    if rows.is_empty() {
                        println!("No protocols registered.");
                    } else {
                        println!("{}", format_table(&rows));
                    }
                }
            }
        }
    }

    Ok(())
}
