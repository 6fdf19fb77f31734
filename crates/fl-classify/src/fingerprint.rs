// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fingerprint generators: opaque correlation tokens that tie a user-facing
//! report to detailed internal records.
//!
//! Disabled unless a generator is handed to the builder; tokens must stay
//! collision-free even for the same failure shape handled in rapid
//! succession on one process.

use chrono::Utc;
use fl_problem::FaultReport;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Produces the correlation token for one handling occurrence.
pub trait FingerprintGenerator: Send + Sync {
    /// Generate a token for the report-so-far.
    fn generate(&self, report: &FaultReport) -> String;
}

/// Default strategy: a random v4 UUID per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidFingerprint;

impl FingerprintGenerator for UuidFingerprint {
    fn generate(&self, _report: &FaultReport) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Digest strategy: SHA-256 over the report's codes, a nanosecond clock
/// reading, and a process-wide monotonic counter.
///
/// The counter keeps tokens distinct even when the clock resolution is too
/// coarse to separate back-to-back calls.
#[derive(Debug, Default)]
pub struct DigestFingerprint {
    counter: AtomicU64,
}

/// Hex length of an emitted digest token.
const DIGEST_TOKEN_LEN: usize = 32;

impl DigestFingerprint {
    /// Create a generator with a fresh counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FingerprintGenerator for DigestFingerprint {
    fn generate(&self, report: &FaultReport) -> String {
        let mut hasher = Sha256::new();
        for message in &report.errors {
            hasher.update(message.code.as_bytes());
            hasher.update([0]);
        }
        let now = Utc::now();
        hasher.update(now.timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
        hasher.update(
            self.counter
                .fetch_add(1, Ordering::Relaxed)
                .to_be_bytes(),
        );
        let mut token = format!("{:x}", hasher.finalize());
        token.truncate(DIGEST_TOKEN_LEN);
        token
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
