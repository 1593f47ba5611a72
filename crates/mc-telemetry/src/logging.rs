//! Structured logging.
//!
//! Every subsystem logs through `tracing` with a consistent set of fields:
//! - `subsystem`: which crate emitted the event (registry, cross_chain, ...)
//! - `chain_id`: the chain the event concerns, when there is one
//! - `call_id` / `tx_hash`: cross-chain call correlation
//!
//! [`init_logging`] installs the global subscriber. Libraries never call it;
//! hosts and test harnesses do.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global `tracing` subscriber.
///
/// Fails with [`TelemetryError::LoggingInit`] if a subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    match (config.console_output, config.json_logs) {
        (true, true) => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);
            registry
                .with(json_layer)
                .try_init()
                .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        }
        (true, false) => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(true);
            registry
                .with(fmt_layer)
                .try_init()
                .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        }
        (false, _) => {
            registry
                .try_init()
                .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        }
    }

    tracing::info!(
        service = %config.service_name,
        network = %config.network,
        json_logs = config.json_logs,
        "Logging initialized"
    );

    Ok(())
}

/// Log an event tagged with its subsystem.
#[macro_export]
macro_rules! log_event {
    ($level:ident, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a chain-scoped event with standard fields.
#[macro_export]
macro_rules! log_chain_event {
    ($level:ident, $subsystem:expr, $msg:expr, $chain_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            chain_id = %$chain_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a cross-chain call event with standard fields.
#[macro_export]
macro_rules! log_call_event {
    ($level:ident, $msg:expr, $call_id:expr, $from_chain:expr, $to_chain:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = "cross_chain",
            call_id = $call_id,
            from_chain = %$from_chain,
            to_chain = %$to_chain,
            $($($field)*,)?
            $msg
        )
    };
}
