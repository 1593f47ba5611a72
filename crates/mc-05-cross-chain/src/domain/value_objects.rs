//! # Value Objects
//!
//! Call identifiers, call states and coordinator configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Default cross-chain timeout (2 minutes).
pub const DEFAULT_CROSS_CHAIN_TIMEOUT_MS: u64 = 120_000;

/// Default block time used to convert timeouts into block budgets.
pub const DEFAULT_BLOCK_TIME_MS: u64 = 5_000;

/// Default limit on nested cross-chain calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 16;

/// Default wall-clock bound for non-deterministic calls.
pub const DEFAULT_NON_DETERMINISTIC_TIMEOUT_MS: u64 = 30_000;

/// Default number of unclaimed non-deterministic results kept.
pub const DEFAULT_SIDE_CHANNEL_CAPACITY: usize = 1_024;

/// Monotonically increasing id of a dispatched call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub u64);

impl CallId {
    /// Raw id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call-{}", self.0)
    }
}

/// Cross-chain call state.
///
/// ```text
/// Pending ──► Dispatched ──► Succeeded | Failed | TimedOut
///    │
///    ├──► Rejected   (pre-dispatch failure)
///    └──► TimedOut   (zero block budget)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    /// Registered, not yet sent.
    #[default]
    Pending,
    /// Sent to the target chain.
    Dispatched,
    /// Target returned successfully within budget.
    Succeeded,
    /// Target returned an error.
    Failed,
    /// Budget exhausted.
    TimedOut,
    /// Refused before dispatch.
    Rejected,
}

impl CallState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: CallState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Dispatched)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::TimedOut)
                | (Self::Dispatched, Self::Succeeded)
                | (Self::Dispatched, Self::Failed)
                | (Self::Dispatched, Self::TimedOut)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::TimedOut | Self::Rejected
        )
    }

    /// Metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispatched => "dispatched",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Rejected => "rejected",
        }
    }
}

/// Whether the caller runs inside a transaction or a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Block execution; results must be deterministic.
    Transaction,
    /// Read-only query.
    Query,
}

/// Flavour of a cross-chain call, used as a metrics label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Deterministic transaction.
    Tx,
    /// Deterministic query.
    Query,
    /// Non-deterministic transaction.
    TxNonDeterministic,
    /// Non-deterministic query.
    QueryNonDeterministic,
}

impl CallKind {
    /// Metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Tx => "tx",
            CallKind::Query => "query",
            CallKind::TxNonDeterministic => "tx_nd",
            CallKind::QueryNonDeterministic => "query_nd",
        }
    }

    /// Whether the target runs against throwaway state.
    pub fn is_query(&self) -> bool {
        matches!(self, CallKind::Query | CallKind::QueryNonDeterministic)
    }
}

/// Coordinator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainConfig {
    /// Expected block time, converts timeouts into block budgets.
    pub block_time_ms: u64,
    /// Timeout applied when a request omits `timeout_ms`.
    pub default_timeout_ms: u64,
    /// Maximum nesting of cross-chain calls.
    pub max_call_depth: usize,
    /// Wall-clock bound on non-deterministic calls.
    pub non_deterministic_timeout_ms: u64,
    /// Unclaimed side-channel results kept before the oldest is evicted.
    pub side_channel_capacity: usize,
}

impl Default for CrossChainConfig {
    fn default() -> Self {
        Self {
            block_time_ms: DEFAULT_BLOCK_TIME_MS,
            default_timeout_ms: DEFAULT_CROSS_CHAIN_TIMEOUT_MS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            non_deterministic_timeout_ms: DEFAULT_NON_DETERMINISTIC_TIMEOUT_MS,
            side_channel_capacity: DEFAULT_SIDE_CHANNEL_CAPACITY,
        }
    }
}

impl CrossChainConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `MC_BLOCK_TIME_MS` | `block_time_ms` |
    /// | `MC_CROSS_CHAIN_TIMEOUT_MS` | `default_timeout_ms` |
    /// | `MC_MAX_CALL_DEPTH` | `max_call_depth` |
    /// | `MC_NON_DETERMINISTIC_TIMEOUT_MS` | `non_deterministic_timeout_ms` |
    /// | `MC_SIDE_CHANNEL_CAPACITY` | `side_channel_capacity` |
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            block_time_ms: env_or("MC_BLOCK_TIME_MS", defaults.block_time_ms),
            default_timeout_ms: env_or("MC_CROSS_CHAIN_TIMEOUT_MS", defaults.default_timeout_ms),
            max_call_depth: env_or("MC_MAX_CALL_DEPTH", defaults.max_call_depth),
            non_deterministic_timeout_ms: env_or(
                "MC_NON_DETERMINISTIC_TIMEOUT_MS",
                defaults.non_deterministic_timeout_ms,
            ),
            side_channel_capacity: env_or(
                "MC_SIDE_CHANNEL_CAPACITY",
                defaults.side_channel_capacity,
            ),
        }
    }

    /// Override the block time.
    pub fn with_block_time_ms(mut self, block_time_ms: u64) -> Self {
        self.block_time_ms = block_time_ms;
        self
    }

    /// Override the maximum call depth.
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Override the non-deterministic wall-clock bound.
    pub fn with_non_deterministic_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.non_deterministic_timeout_ms = timeout_ms;
        self
    }

    /// Override the side-channel capacity.
    pub fn with_side_channel_capacity(mut self, capacity: usize) -> Self {
        self.side_channel_capacity = capacity;
        self
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_state_transitions() {
        assert!(CallState::Pending.can_transition_to(CallState::Dispatched));
        assert!(CallState::Pending.can_transition_to(CallState::Rejected));
        assert!(CallState::Pending.can_transition_to(CallState::TimedOut));
        assert!(CallState::Dispatched.can_transition_to(CallState::Succeeded));
        assert!(!CallState::Pending.can_transition_to(CallState::Succeeded));
        assert!(!CallState::Succeeded.can_transition_to(CallState::Failed));
        assert!(!CallState::Rejected.can_transition_to(CallState::Dispatched));
    }

    #[test]
    fn test_call_state_terminal() {
        assert!(CallState::TimedOut.is_terminal());
        assert!(CallState::Rejected.is_terminal());
        assert!(!CallState::Dispatched.is_terminal());
    }

    #[test]
    fn test_default_config() {
        let config = CrossChainConfig::default();
        assert_eq!(config.default_timeout_ms, 120_000);
        assert_eq!(config.block_time_ms, DEFAULT_BLOCK_TIME_MS);
        assert_eq!(config.side_channel_capacity, DEFAULT_SIDE_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_env_or_falls_back() {
        std::env::set_var("MC_TEST_ENV_OR_GARBAGE", "not-a-number");
        assert_eq!(env_or("MC_TEST_ENV_OR_GARBAGE", 7u64), 7);
        std::env::set_var("MC_TEST_ENV_OR_VALUE", " 42 ");
        assert_eq!(env_or("MC_TEST_ENV_OR_VALUE", 7u64), 42);
        assert_eq!(env_or("MC_TEST_ENV_OR_UNSET_XYZ", 9usize), 9);
    }

    #[test]
    fn test_call_id_display() {
        assert_eq!(CallId(12).to_string(), "call-12");
    }
}
