// crates/warden-risk/src/scoring.rs
//
// Weighted risk aggregation.
//
// score = floor( sum(factor_i * weight_i) / sum(weight_i) )
//
// A weighted mean of values in [0, 10000] with positive weights always lies
// between the smallest and largest factor, so it never exceeds 10000.

use serde::{Deserialize, Serialize};

use warden_core::error::WardenError;
use warden_core::BASIS_POINTS;

/// Highest valid risk score: 10,000 bps.
pub const MAX_RISK_SCORE: u32 = BASIS_POINTS;

/// Fixed-band classification of an aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Below 2,500 bps.
    Low,
    /// 2,500 to 4,999 bps.
    Moderate,
    /// 5,000 to 7,499 bps.
    High,
    /// 7,500 bps and above.
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=2_499 => RiskLevel::Low,
            2_500..=4_999 => RiskLevel::Moderate,
            5_000..=7_499 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Moderate => write!(f, "moderate"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Output of `evaluate_risk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEvaluation {
    /// Weighted mean of the factors, in bps.
    pub score: u32,
    /// Band the score falls in.
    pub level: RiskLevel,
}

/// Aggregate risk factors into one score. Pure; touches no state.
///
/// # Errors
/// `LengthMismatch` if the slices differ in length, `EmptyFactors` for no
/// input, `InvalidWeight` for a zero weight, `InvalidRiskScore` for a factor
/// above 10,000.
pub fn evaluate_risk(factors: &[u32], weights: &[u32]) -> Result<RiskEvaluation, WardenError> {
    if factors.len() != weights.len() {
        return Err(WardenError::LengthMismatch {
            factors: factors.len(),
            weights: weights.len(),
        });
    }
    if factors.is_empty() {
        return Err(WardenError::EmptyFactors);
    }

    let mut weighted_sum: u128 = 0;
    let mut total_weight: u128 = 0;
    for (index, (&factor, &weight)) in factors.iter().zip(weights).enumerate() {
        if factor > MAX_RISK_SCORE {
            return Err(WardenError::InvalidRiskScore(factor));
        }
        if weight == 0 {
            return Err(WardenError::InvalidWeight { index });
        }
        weighted_sum += u128::from(factor) * u128::from(weight);
        total_weight += u128::from(weight);
    }

    // Bounded by the largest factor, so the cast cannot truncate.
    let score = (weighted_sum / total_weight) as u32;
    Ok(RiskEvaluation {
        score,
        level: RiskLevel::from_score(score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_mean() {
        let eval = evaluate_risk(&[8_000, 2_000], &[3, 1]).unwrap();
        assert_eq!(eval.score, 6_500);
        assert_eq!(eval.level, RiskLevel::High);
    }

    #[test]
    fn test_rounds_toward_zero() {
        // (1 * 1 + 2 * 1) / 2 = 1.5 -> 1
        assert_eq!(evaluate_risk(&[1, 2], &[1, 1]).unwrap().score, 1);
        // (10000 * 1 + 0 * 2) / 3 = 3333.33 -> 3333
        assert_eq!(evaluate_risk(&[10_000, 0], &[1, 2]).unwrap().score, 3_333);
    }

    #[test]
    fn test_single_factor_passes_through() {
        assert_eq!(evaluate_risk(&[4_321], &[999]).unwrap().score, 4_321);
    }

    #[test]
    fn test_result_within_factor_bounds() {
        let samples = [0u32, 1, 999, 2_500, 5_000, 7_499, 9_999, 10_000];
        let weights = [1u32, 2, 7, 500, 999, 1_000];
        for &f1 in &samples {
            for &f2 in &samples {
                for &w1 in &weights {
                    for &w2 in &weights {
                        let s = evaluate_risk(&[f1, f2], &[w1, w2]).unwrap().score;
                        assert!(f1.min(f2) <= s && s <= f1.max(f2), "{f1},{f2},{w1},{w2} -> {s}");
                        assert!(s <= MAX_RISK_SCORE);
                    }
                }
            }
        }
    }

    #[test]
    fn test_large_weights_do_not_overflow() {
        let eval = evaluate_risk(&[10_000, 10_000, 10_000], &[u32::MAX, u32::MAX, u32::MAX]).unwrap();
        assert_eq!(eval.score, 10_000);
        assert_eq!(eval.level, RiskLevel::Critical);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            evaluate_risk(&[1, 2], &[1]),
            Err(WardenError::LengthMismatch { factors: 2, weights: 1 })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(evaluate_risk(&[], &[]), Err(WardenError::EmptyFactors)));
    }

    #[test]
    fn test_zero_weight_rejected() {
        assert!(matches!(
            evaluate_risk(&[100, 200], &[1, 0]),
            Err(WardenError::InvalidWeight { index: 1 })
        ));
    }

    #[test]
    fn test_factor_above_max_rejected() {
        assert!(matches!(
            evaluate_risk(&[10_001], &[1]),
            Err(WardenError::InvalidRiskScore(10_001))
        ));
    }

    #[test]
    fn test_level_bands() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(2_499), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(2_500), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(5_000), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(7_500), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(10_000), RiskLevel::Critical);
    }
}
