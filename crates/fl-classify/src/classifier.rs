// SPDX-License-Identifier: MIT OR Apache-2.0
//! Classifiers: matchers that turn a recognised failure shape into a
//! [`Classification`].
//!
//! The dispatcher consults classifiers in registration order and the first
//! whose predicate matches wins — a list of trait objects, not a subtype
//! hierarchy.  [`TypedClassifier`] covers the common case of matching one
//! concrete failure type by downcast; [`FnClassifier`] adapts closures for
//! anything irregular.

use crate::expose::ExposurePlan;
use fl_problem::{Classification, Status};

/// The opaque failure value being classified.
///
/// Shape identity is the concrete type behind the trait object; a wrapped
/// cause, when present, is reachable through [`std::error::Error::source`].
pub type Fault = dyn std::error::Error + 'static;

/// A matcher plus producer for one family of failures.
pub trait Classifier: Send + Sync {
    /// Whether this classifier recognises `failure`.
    fn matches(&self, failure: &Fault) -> bool;

    /// Produce the classification for a matched failure.
    ///
    /// Only called after [`matches`] returned `true` for the same failure.
    ///
    /// [`matches`]: Classifier::matches
    fn classify(&self, failure: &Fault) -> Classification;

    /// Human-readable name used in tracing output.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// TypedClassifier
// ---------------------------------------------------------------------------

/// Classifier for one concrete failure type, matched by downcast.
///
/// Carries the code, the transport status, and the [`ExposurePlan`] whose
/// extracted arguments are attached to the code.
pub struct TypedClassifier<E: std::error::Error + 'static> {
    code: String,
    status: Status,
    plan: ExposurePlan<E>,
}

impl<E: std::error::Error + 'static> TypedClassifier<E> {
    /// Map failures of type `E` to `code` with `status` and no arguments.
    #[must_use]
    pub fn new(code: impl Into<String>, status: Status) -> Self {
        Self {
            code: code.into(),
            status,
            plan: ExposurePlan::new(),
        }
    }

    /// Attach the exposure plan used to extract this type's arguments.
    #[must_use]
    pub fn with_plan(mut self, plan: ExposurePlan<E>) -> Self {
        self.plan = plan;
        self
    }
}

impl<E: std::error::Error + 'static> Classifier for TypedClassifier<E> {
    fn matches(&self, failure: &Fault) -> bool {
        failure.is::<E>()
    }

    fn classify(&self, failure: &Fault) -> Classification {
        let classification = Classification::new(&self.code, self.status);
        match failure.downcast_ref::<E>() {
            Some(typed) => {
                let arguments = self.plan.extract(typed);
                if arguments.is_empty() {
                    classification
                } else {
                    classification.with_arguments(&self.code, arguments)
                }
            }
            // Unreachable through the dispatcher, which gates on matches().
            None => classification,
        }
    }

    fn name(&self) -> &str {
        &self.code
    }
}

// ---------------------------------------------------------------------------
// FnClassifier
// ---------------------------------------------------------------------------

/// Closure-backed classifier for failure shapes that need custom matching,
/// multiple codes, or per-instance statuses.
pub struct FnClassifier {
    name: String,
    matcher: Box<dyn Fn(&Fault) -> bool + Send + Sync>,
    producer: Box<dyn Fn(&Fault) -> Classification + Send + Sync>,
}

impl FnClassifier {
    /// Build a classifier from a match predicate and a producer closure.
    pub fn new(
        name: impl Into<String>,
        matcher: impl Fn(&Fault) -> bool + Send + Sync + 'static,
        producer: impl Fn(&Fault) -> Classification + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            matcher: Box::new(matcher),
            producer: Box::new(producer),
        }
    }
}

impl Classifier for FnClassifier {
    fn matches(&self, failure: &Fault) -> bool {
        (self.matcher)(failure)
    }

    fn classify(&self, failure: &Fault) -> Classification {
        (self.producer)(failure)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// The designated terminal classifier: a fixed code and status used when no
/// registered classifier matches, the refiner yields nothing, or the failure
/// is absent altogether.
#[derive(Debug, Clone, PartialEq)]
pub struct Fallback {
    code: String,
    status: Status,
}

impl Fallback {
    /// Use `code` and `status` for every unclassifiable failure.
    #[must_use]
    pub fn new(code: impl Into<String>, status: Status) -> Self {
        Self {
            code: code.into(),
            status,
        }
    }

    /// The fixed fallback code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The fixed fallback status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// The classification every unclassifiable failure receives.
    #[must_use]
    pub fn classification(&self) -> Classification {
        Classification::new(&self.code, self.status)
    }
}

impl Default for Fallback {
    fn default() -> Self {
        Self::new("unknown", Status::INTERNAL_SERVER_ERROR)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
