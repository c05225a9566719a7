// crates/warden-cli/src/config.rs
//
// Runtime configuration for the warden CLI.
// Loaded from a TOML file or populated with defaults. The genesis sections
// (`governance`, `[gate]`, `[risk]`) are only read by `warden init`, except
// `gate.verifier`, which selects the verifier every gate command runs with
// (overridable per invocation with `--verifier`).

use serde::Deserialize;
use std::fs;

use warden_core::types::{Address, Field};
use warden_gate::{GateGenesis, DEFAULT_VERIFICATION_TTL};
use warden_risk::{
    BreakerPolicy, RiskGenesis, DEFAULT_MAX_ACTIVATIONS_PER_WINDOW, DEFAULT_RATE_LIMIT_WINDOW,
    DEFAULT_RISK_THRESHOLD,
};

#[derive(Debug, Clone, Deserialize)]
pub struct WardenConfig {
    /// Directory holding the RocksDB ledger.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level used when RUST_LOG is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Genesis governance account for both the gate and the registry. Also
    /// the default `--caller`.
    #[serde(default = "default_address")]
    pub governance: Address,

    #[serde(default)]
    pub gate: GateSection,

    #[serde(default)]
    pub risk: RiskSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateSection {
    /// Address of the proof verifier the gate is configured for.
    #[serde(default = "default_address")]
    pub verifier: Address,

    #[serde(default = "default_app_id")]
    pub app_id: String,

    #[serde(default = "default_action_id")]
    pub action_id: String,

    #[serde(default = "default_group_id")]
    pub group_id: u64,

    #[serde(default = "default_verification_ttl_secs")]
    pub verification_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskSection {
    #[serde(default = "default_threshold_bps")]
    pub threshold_bps: u32,

    #[serde(default = "default_breaker_window_secs")]
    pub breaker_window_secs: u64,

    #[serde(default = "default_max_activations_per_window")]
    pub max_activations_per_window: u32,
}

fn default_data_dir() -> String {
    "~/.warden/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_address() -> Address {
    Address::ZERO
}

fn default_app_id() -> String {
    "app_warden".to_string()
}

fn default_action_id() -> String {
    "verify-human".to_string()
}

fn default_group_id() -> u64 {
    1
}

fn default_verification_ttl_secs() -> u64 {
    DEFAULT_VERIFICATION_TTL
}

fn default_threshold_bps() -> u32 {
    DEFAULT_RISK_THRESHOLD
}

fn default_breaker_window_secs() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW
}

fn default_max_activations_per_window() -> u32 {
    DEFAULT_MAX_ACTIVATIONS_PER_WINDOW
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            verifier: default_address(),
            app_id: default_app_id(),
            action_id: default_action_id(),
            group_id: default_group_id(),
            verification_ttl_secs: default_verification_ttl_secs(),
        }
    }
}

impl Default for RiskSection {
    fn default() -> Self {
        Self {
            threshold_bps: default_threshold_bps(),
            breaker_window_secs: default_breaker_window_secs(),
            max_activations_per_window: default_max_activations_per_window(),
        }
    }
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            governance: default_address(),
            gate: GateSection::default(),
            risk: RiskSection::default(),
        }
    }
}

impl WardenConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        let config: WardenConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Replace `gate.verifier` for this invocation when an override is given.
    pub fn with_verifier(mut self, verifier: Option<Address>) -> Self {
        if let Some(addr) = verifier {
            self.gate.verifier = addr;
        }
        self
    }

    /// The ledger directory with `~` expanded.
    pub fn data_path(&self) -> String {
        expand_tilde(&self.data_dir)
    }

    pub fn gate_genesis(&self) -> GateGenesis {
        GateGenesis::new(self.governance, &self.gate.app_id, &self.gate.action_id)
            .with_group_id(Field::from_u64(self.gate.group_id))
            .with_ttl(self.gate.verification_ttl_secs)
    }

    pub fn risk_genesis(&self, genesis_time: u64) -> RiskGenesis {
        RiskGenesis::new(self.governance)
            .with_threshold(self.risk.threshold_bps)
            .with_breaker_policy(BreakerPolicy {
                window_secs: self.risk.breaker_window_secs,
                max_activations: self.risk.max_activations_per_window,
            })
            .at(genesis_time)
    }
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: WardenConfig = toml::from_str("").unwrap();
        assert_eq!(config.data_dir, "~/.warden/data");
        assert_eq!(config.log_level, "info");
        assert!(config.governance.is_zero());
        assert_eq!(config.gate.group_id, 1);
        assert_eq!(config.gate.verification_ttl_secs, 86_400);
        assert_eq!(config.risk.threshold_bps, 7_000);
        assert_eq!(config.risk.breaker_window_secs, 3_600);
        assert_eq!(config.risk.max_activations_per_window, 3);
    }

    #[test]
    fn test_full_file_parses() {
        let config: WardenConfig = toml::from_str(
            r#"
            data_dir = "/var/lib/warden"
            log_level = "debug"
            governance = "0x6060606060606060606060606060606060606060"

            [gate]
            verifier = "0x7070707070707070707070707070707070707070"
            app_id = "app_test"
            action_id = "enter-vault"
            group_id = 2
            verification_ttl_secs = 7200

            [risk]
            threshold_bps = 8000
            breaker_window_secs = 600
            max_activations_per_window = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.governance, Address([0x60; 20]));
        assert_eq!(config.gate.verifier, Address([0x70; 20]));
        assert_eq!(config.gate.action_id, "enter-vault");
        assert_eq!(config.data_path(), "/var/lib/warden");

        let genesis = config.gate_genesis();
        assert_eq!(genesis.group_id, Field::from_u64(2));
        assert_eq!(genesis.verification_ttl, 7_200);

        let risk = config.risk_genesis(42);
        assert_eq!(risk.threshold, 8_000);
        assert_eq!(risk.breaker_policy.window_secs, 600);
        assert_eq!(risk.breaker_policy.max_activations, 5);
        assert_eq!(risk.genesis_time, 42);
    }

    #[test]
    fn test_verifier_override() {
        let config: WardenConfig =
            toml::from_str("[gate]\nverifier = \"0x7070707070707070707070707070707070707070\"\n").unwrap();
        let kept = config.clone().with_verifier(None);
        assert_eq!(kept.gate.verifier, Address([0x70; 20]));
        let swapped = config.with_verifier(Some(Address([0x72; 20])));
        assert_eq!(swapped.gate.verifier, Address([0x72; 20]));
    }

    #[test]
    fn test_bad_address_rejected() {
        let parsed: Result<WardenConfig, _> = toml::from_str(r#"governance = "0x1234""#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/tmp/warden"), "/tmp/warden");
        if dirs::home_dir().is_some() {
            assert!(!expand_tilde("~/.warden").starts_with('~'));
        }
    }
}
