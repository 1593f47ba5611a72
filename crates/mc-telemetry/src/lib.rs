//! # Multichain Telemetry
//!
//! Logging and metrics shared by every multichain subsystem.
//!
//! ## Components
//!
//! - **Logging**: `tracing` events with consistent fields, installed through
//!   [`init_logging`] as a pretty or JSON `tracing-subscriber` layer.
//! - **Metrics**: Prometheus counters and gauges in a process registry,
//!   exported with [`gather_metrics`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mc_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MC_SERVICE_NAME` | `mythos-multichain` | Service name in logs |
//! | `MC_LOG_LEVEL` | `info` | Log level filter |
//! | `MC_JSON_LOGS` | `false` | JSON formatted logs |
//! | `MC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `MC_NETWORK` | `testnet` | Network name |

#![warn(missing_docs)]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    gather_metrics, record_call, record_error, register_metrics, MetricsHandle,
    ACTIVE_ATOMIC_MARKERS, BOUNDARY_FAULTS, CROSS_CHAIN_CALLS, REGISTERED_CHAINS,
    REGISTRY_MUTATIONS, SUBSYSTEM_ERRORS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A collector could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize metrics and logging.
///
/// The returned guard logs on drop; hold it for the lifetime of the host.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(&config)?;
    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
