// crates/warden-risk/src/lib.rs
//
// warden-risk: Risk controls for the pooled yield vault.
//
// Sentinels report per-protocol risk scores (basis points, 10,000 = 100%).
// Scores at or above the global threshold raise alerts. Tripping the global
// circuit breaker is a separate, explicit, rate-limited action that the vault
// consults before risk-sensitive operations.

pub mod breaker;
pub mod registry;
pub mod scoring;

// Re-export key types for ergonomic access from downstream crates.
pub use breaker::{
    BreakerPolicy, BreakerStatus, CircuitBreakerState, DEFAULT_MAX_ACTIVATIONS_PER_WINDOW,
    DEFAULT_RATE_LIMIT_WINDOW,
};
pub use registry::{
    validate_threshold, RiskAssessment, RiskConfig, RiskGenesis, RiskRegistry, ScoreUpdate,
    DEFAULT_RISK_THRESHOLD, MAX_RISK_THRESHOLD, MIN_RISK_THRESHOLD,
};
pub use scoring::{evaluate_risk, RiskEvaluation, RiskLevel, MAX_RISK_SCORE};
