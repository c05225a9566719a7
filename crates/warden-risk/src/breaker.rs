// crates/warden-risk/src/breaker.rs
//
// Global circuit breaker with a windowed activation rate limit.
//
// States: Inactive <-> Active. Both transitions are explicit calls.
//   Inactive -> Active   activate(), subject to the rate limit
//   Active   -> Inactive deactivate()
//
// Rate limit: at most `max_activations` activations per window. The window
// restarts (count -> 0, window_start -> now) once `now - window_start`
// exceeds `window_secs`. Only elapsed time resets the counter; deactivating
// does not.

use serde::{Deserialize, Serialize};

use warden_core::error::WardenError;
use warden_core::types::{ReportId, Timestamp};

/// Rate-limit window length: 1 hour.
pub const DEFAULT_RATE_LIMIT_WINDOW: u64 = 3_600;

/// Activations allowed per window.
pub const DEFAULT_MAX_ACTIVATIONS_PER_WINDOW: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerPolicy {
    pub window_secs: u64,
    pub max_activations: u32,
}

impl BreakerPolicy {
    pub fn validate(&self) -> Result<(), WardenError> {
        if self.window_secs == 0 {
            return Err(WardenError::InvalidBreakerPolicy(
                "rate-limit window must be at least one second".to_string(),
            ));
        }
        if self.max_activations == 0 {
            return Err(WardenError::InvalidBreakerPolicy(
                "at least one activation per window must be allowed".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_RATE_LIMIT_WINDOW,
            max_activations: DEFAULT_MAX_ACTIVATIONS_PER_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakerStatus {
    Inactive,
    Active,
}

impl std::fmt::Display for BreakerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakerStatus::Inactive => write!(f, "inactive"),
            BreakerStatus::Active => write!(f, "active"),
        }
    }
}

/// The single global breaker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CircuitBreakerState {
    pub is_active: bool,
    pub activated_at: Timestamp,
    /// Activations within the current window.
    pub activation_count: u32,
    pub window_start: Timestamp,
    pub last_trigger_report_id: ReportId,
}

impl CircuitBreakerState {
    /// A fresh breaker whose first window opens at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            window_start: now,
            ..Self::default()
        }
    }

    pub fn status(&self) -> BreakerStatus {
        if self.is_active {
            BreakerStatus::Active
        } else {
            BreakerStatus::Inactive
        }
    }

    fn window_elapsed(&self, policy: &BreakerPolicy, now: Timestamp) -> bool {
        now.saturating_sub(self.window_start) > policy.window_secs
    }

    /// First timestamp at which the current window will have elapsed.
    pub fn window_resets_at(&self, policy: &BreakerPolicy) -> Timestamp {
        self.window_start
            .saturating_add(policy.window_secs)
            .saturating_add(1)
    }

    /// Activations still available at `now` before the limit is hit.
    pub fn remaining_activations(&self, policy: &BreakerPolicy, now: Timestamp) -> u32 {
        if self.window_elapsed(policy, now) {
            policy.max_activations
        } else {
            policy.max_activations.saturating_sub(self.activation_count)
        }
    }

    /// Trip the breaker. On error the state is left unchanged.
    ///
    /// # Errors
    /// `AlreadyActive` if the breaker is tripped, `RateLimited` if the window
    /// already holds `max_activations` activations.
    pub fn activate(
        &mut self,
        policy: &BreakerPolicy,
        now: Timestamp,
        report_id: ReportId,
    ) -> Result<(), WardenError> {
        if self.is_active {
            return Err(WardenError::AlreadyActive);
        }

        let mut next = *self;
        if next.window_elapsed(policy, now) {
            next.activation_count = 0;
            next.window_start = now;
        }
        if next.activation_count >= policy.max_activations {
            return Err(WardenError::RateLimited {
                count: next.activation_count,
                max: policy.max_activations,
                resets_at: next.window_resets_at(policy),
            });
        }

        next.is_active = true;
        next.activated_at = now;
        next.last_trigger_report_id = report_id;
        next.activation_count += 1;
        *self = next;
        Ok(())
    }

    /// Reset the breaker. Leaves the rate-limit window untouched.
    ///
    /// # Errors
    /// `NotActive` if the breaker is not tripped.
    pub fn deactivate(&mut self) -> Result<(), WardenError> {
        if !self.is_active {
            return Err(WardenError::NotActive);
        }
        self.is_active = false;
        Ok(())
    }
}
