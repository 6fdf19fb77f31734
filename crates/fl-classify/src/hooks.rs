// SPDX-License-Identifier: MIT OR Apache-2.0
//! Observation seams around the dispatcher: raw-failure loggers fired before
//! classification and post-processors fired after every produced report.

use crate::classifier::Fault;
use fl_problem::FaultReport;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::error;

// ---------------------------------------------------------------------------
// FailureLogger
// ---------------------------------------------------------------------------

/// Receives the unrefined failure before classification, side effect only.
///
/// Logging is best-effort: the dispatcher isolates every call, so a
/// panicking logger can never abort handling.
pub trait FailureLogger: Send + Sync {
    /// Record the raw failure.
    fn log(&self, failure: &Fault);
}

/// The default logger: discards every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl FailureLogger for NoopLogger {
    fn log(&self, _failure: &Fault) {}
}

/// Logs failures through `tracing`, including the direct cause when present.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl FailureLogger for TracingLogger {
    fn log(&self, failure: &Fault) {
        match failure.source() {
            Some(cause) => error!(
                target: "fl_classify.dispatch",
                failure = %failure,
                cause = %cause,
                "handling failure"
            ),
            None => error!(
                target: "fl_classify.dispatch",
                failure = %failure,
                "handling failure"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// PostProcessor
// ---------------------------------------------------------------------------

/// Observes every produced report, including fallback reports.
///
/// Processors receive a shared reference — the report is structurally
/// immutable to them — and run in registration order, each isolated so one
/// failing processor cannot starve the rest.
pub trait PostProcessor: Send + Sync {
    /// Observe the assembled report.
    fn process(&self, report: &FaultReport);

    /// Human-readable name used in tracing output.
    fn name(&self) -> &str;
}

/// Reference post-processor: counts produced reports per error code.
#[derive(Debug, Default)]
pub struct MetricsPostProcessor {
    counts: Mutex<BTreeMap<String, u64>>,
}

impl MetricsPostProcessor {
    /// Create a collector with no recorded reports.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of per-code counts (deterministic ordering).
    #[must_use]
    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.counts.lock().expect("metrics lock poisoned").clone()
    }
}

impl PostProcessor for MetricsPostProcessor {
    fn process(&self, report: &FaultReport) {
        let mut counts = self.counts.lock().expect("metrics lock poisoned");
        for message in &report.errors {
            *counts.entry(message.code.clone()).or_insert(0) += 1;
        }
    }

    fn name(&self) -> &str {
        "metrics"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
