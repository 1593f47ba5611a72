//! Prometheus metrics for the multichain subsystems.
//!
//! All metrics follow the naming convention: `mc_<subsystem>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CROSS-CHAIN METRICS
    // =========================================================================

    /// Cross-chain calls by kind and outcome
    pub static ref CROSS_CHAIN_CALLS: IntCounterVec = IntCounterVec::new(
        Opts::new("mc_cross_chain_calls_total", "Total cross-chain calls"),
        &["kind", "outcome"]  // kind: tx/query/tx_nd/query_nd, outcome: succeeded/failed/timed_out/rejected
    ).expect("metric creation failed");

    /// Atomic execution markers currently held
    pub static ref ACTIVE_ATOMIC_MARKERS: IntGauge = IntGauge::new(
        "mc_cross_chain_active_atomic_markers",
        "Atomic execution markers currently held"
    ).expect("metric creation failed");

    /// Host-boundary memory faults
    pub static ref BOUNDARY_FAULTS: IntCounter = IntCounter::new(
        "mc_host_boundary_faults_total",
        "Packed pointers that exceeded guest memory"
    ).expect("metric creation failed");

    // =========================================================================
    // REGISTRY METRICS
    // =========================================================================

    /// Chains currently registered
    pub static ref REGISTERED_CHAINS: IntGauge = IntGauge::new(
        "mc_registry_registered_chains",
        "Number of chains in the subchain registry"
    ).expect("metric creation failed");

    /// Registry mutations by operation
    pub static ref REGISTRY_MUTATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("mc_registry_mutations_total", "Registry commands applied"),
        &["operation"]
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Errors by subsystem and type
    pub static ref SUBSYSTEM_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("mc_subsystem_errors_total", "Total errors by subsystem"),
        &["subsystem", "error_type"]
    ).expect("metric creation failed");
}

/// Handle returned by [`register_metrics`].
#[derive(Debug, Clone, Copy)]
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors in the registry.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with [`REGISTRY`]. Safe to call more than once.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Cross-chain
        Box::new(CROSS_CHAIN_CALLS.clone()),
        Box::new(ACTIVE_ATOMIC_MARKERS.clone()),
        Box::new(BOUNDARY_FAULTS.clone()),
        // Registry
        Box::new(REGISTERED_CHAINS.clone()),
        Box::new(REGISTRY_MUTATIONS.clone()),
        // Errors
        Box::new(SUBSYSTEM_ERRORS.clone()),
    ];

    let registered = metrics.len();
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all registered metrics in the Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Record one resolved cross-chain call.
pub fn record_call(kind: &str, outcome: &str) {
    CROSS_CHAIN_CALLS.with_label_values(&[kind, outcome]).inc();
}

/// Record one error for a subsystem.
pub fn record_error(subsystem: &str, error_type: &str) {
    SUBSYSTEM_ERRORS
        .with_label_values(&[subsystem, error_type])
        .inc();
}
