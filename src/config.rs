use std::time::Duration;

/// Settings for token issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultConfig {
    /// Candidate tokens tried for one card before issuance gives up.
    pub max_issue_attempts: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_issue_attempts: 5,
        }
    }
}

/// How the sale processor talks to the gateway.
///
/// Only transport faults are retried; a decline is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayPolicy {
    /// Upper bound on a single `charge` call.
    pub timeout: Duration,
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub backoff: Duration,
}

impl GatewayPolicy {
    /// Delay before retry number `attempt` (1-based), capped at 32× the base.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(5);
        self.backoff * (1u32 << exponent)
    }
}

impl Default for GatewayPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            backoff: Duration::from_millis(200),
        }
    }
}
