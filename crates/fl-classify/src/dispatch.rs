// SPDX-License-Identifier: MIT OR Apache-2.0
//! The classification dispatcher: one failure in, one structurally complete
//! [`FaultReport`] out, never a panic.
//!
//! `handle` is a linear pipeline — log, refine, first-match classification,
//! per-code message resolution, optional fingerprint, post-processing — with
//! every collaborator call isolated at the narrowest possible scope.  The
//! registry is assembled once by [`DispatcherBuilder`] and immutable
//! afterwards, so a single dispatcher serves any number of threads without
//! locking.

use crate::classifier::{Classifier, Fallback, Fault};
use crate::fingerprint::FingerprintGenerator;
use crate::hooks::{FailureLogger, NoopLogger, PostProcessor};
use crate::refine::{IdentityRefiner, Refiner};
use fl_catalog::{EmptyMessageSource, Locale, MessageSource};
use fl_problem::{Classification, CodedMessage, ExposurePolicy, FaultReport, WireReport};
use fl_template::interpolate;
use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Panic isolation
// ---------------------------------------------------------------------------

/// Best-effort description of a recovered panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one collaborator call, recovering a panic into `None`.
fn recovered<T>(stage: &str, call: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(value) => Some(value),
        Err(payload) => {
            warn!(
                target: "fl_classify.dispatch",
                stage,
                error = %panic_message(payload),
                "collaborator panic recovered"
            );
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Turns one failure into one [`FaultReport`].
///
/// Build with [`Dispatcher::builder`]; every collaborator has a working
/// default, so the empty builder already yields a dispatcher whose reports
/// carry the fallback code.
pub struct Dispatcher {
    classifiers: Vec<Box<dyn Classifier>>,
    fallback: Fallback,
    refiner: Box<dyn Refiner>,
    logger: Box<dyn FailureLogger>,
    post_processors: Vec<Box<dyn PostProcessor>>,
    fingerprint: Option<Box<dyn FingerprintGenerator>>,
    message_source: Box<dyn MessageSource>,
    exposure: ExposurePolicy,
}

impl Dispatcher {
    /// Start composing a dispatcher.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Handle one failure occurrence.
    ///
    /// An absent failure goes straight to the fallback classification; an
    /// absent locale resolves templates under the root locale.  This method
    /// never panics: every collaborator failure degrades to the narrowest
    /// "no value" outcome and the returned report is always structurally
    /// complete.
    pub fn handle(&self, failure: Option<&Fault>, locale: Option<&Locale>) -> FaultReport {
        let root_locale;
        let locale = match locale {
            Some(locale) => locale,
            None => {
                root_locale = Locale::root();
                &root_locale
            }
        };

        let classification = match failure {
            None => self.fallback.classification(),
            Some(failure) => {
                // Raw-failure logging is side effect only, best effort.
                let _ = recovered("logger", || self.logger.log(failure));

                // A panicking refiner degrades to the unrefined failure.
                let refined = recovered("refiner", || self.refiner.refine(failure))
                    .unwrap_or(Some(failure));
                match refined {
                    None => {
                        debug!(
                            target: "fl_classify.dispatch",
                            "refiner yielded nothing; using fallback"
                        );
                        self.fallback.classification()
                    }
                    Some(refined) => self.classify(refined),
                }
            }
        };

        let errors = self.resolve_messages(&classification, locale);
        let mut report = FaultReport::new(errors, classification.status());

        if let Some(generator) = &self.fingerprint {
            report.fingerprint = recovered("fingerprint", || generator.generate(&report));
        }

        for processor in &self.post_processors {
            let _ = recovered(processor.name(), || processor.process(&report));
        }

        report
    }

    /// Handle one failure and project the report onto its wire shape using
    /// the configured [`ExposurePolicy`].
    pub fn handle_wire(&self, failure: Option<&Fault>, locale: Option<&Locale>) -> WireReport {
        self.handle(failure, locale).to_wire(self.exposure)
    }

    /// The configured argument-exposure policy.
    #[must_use]
    pub const fn exposure(&self) -> ExposurePolicy {
        self.exposure
    }

    /// First-match-wins scan over the registered classifiers.
    fn classify(&self, refined: &Fault) -> Classification {
        for classifier in &self.classifiers {
            // A panicking predicate counts as "does not match".
            let matched =
                recovered("matches", || classifier.matches(refined)).unwrap_or(false);
            if !matched {
                continue;
            }
            return match recovered("classify", || classifier.classify(refined)) {
                Some(classification) => {
                    debug!(
                        target: "fl_classify.dispatch",
                        classifier = classifier.name(),
                        codes = ?classification.codes(),
                        status = %classification.status(),
                        "failure classified"
                    );
                    classification
                }
                // A panicking producer degrades to the fallback so the
                // report stays structurally complete.
                None => self.fallback.classification(),
            };
        }
        debug!(
            target: "fl_classify.dispatch",
            "no classifier matched; using fallback"
        );
        self.fallback.classification()
    }

    /// Resolve one [`CodedMessage`] per distinct code, in encounter order.
    fn resolve_messages(
        &self,
        classification: &Classification,
        locale: &Locale,
    ) -> Vec<CodedMessage> {
        let mut seen: Vec<&str> = Vec::new();
        let mut errors = Vec::new();
        for code in classification.codes() {
            if seen.contains(&code.as_str()) {
                continue;
            }
            seen.push(code);

            let arguments = classification.arguments_for(code);
            // A missing template and a panicking lookup both resolve to a
            // null message; neither is an error.
            let template =
                recovered("message_source", || self.message_source.lookup(code, locale))
                    .flatten();
            let message = template.map(|t| interpolate(&t, arguments));
            errors.push(CodedMessage::new(code, message, arguments.to_vec()));
        }
        errors
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let classifiers: Vec<&str> = self.classifiers.iter().map(|c| c.name()).collect();
        f.debug_struct("Dispatcher")
            .field("classifiers", &classifiers)
            .field("fallback", &self.fallback)
            .field("post_processors", &self.post_processors.len())
            .field("fingerprint", &self.fingerprint.is_some())
            .field("exposure", &self.exposure)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// DispatcherBuilder
// ---------------------------------------------------------------------------

/// Composes a [`Dispatcher`].
///
/// Classifiers and post-processors keep registration order; every other
/// collaborator has a default — identity refiner, no-op logger, empty
/// message source, fallback `unknown`/500, fingerprinting disabled,
/// exposure [`ExposurePolicy::NonEmpty`] — so `build()` cannot fail.
pub struct DispatcherBuilder {
    classifiers: Vec<Box<dyn Classifier>>,
    fallback: Fallback,
    refiner: Box<dyn Refiner>,
    logger: Box<dyn FailureLogger>,
    post_processors: Vec<Box<dyn PostProcessor>>,
    fingerprint: Option<Box<dyn FingerprintGenerator>>,
    message_source: Box<dyn MessageSource>,
    exposure: ExposurePolicy,
}

impl DispatcherBuilder {
    /// Start from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            classifiers: Vec::new(),
            fallback: Fallback::default(),
            refiner: Box::new(IdentityRefiner),
            logger: Box::new(NoopLogger),
            post_processors: Vec::new(),
            fingerprint: None,
            message_source: Box::new(EmptyMessageSource),
            exposure: ExposurePolicy::default(),
        }
    }

    /// Append a classifier; registration order is match order.
    #[must_use]
    pub fn classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifiers.push(Box::new(classifier));
        self
    }

    /// Replace the fallback code and status.
    #[must_use]
    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Replace the refiner.
    #[must_use]
    pub fn refiner(mut self, refiner: impl Refiner + 'static) -> Self {
        self.refiner = Box::new(refiner);
        self
    }

    /// Replace the raw-failure logger.
    #[must_use]
    pub fn logger(mut self, logger: impl FailureLogger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    /// Append a post-processor; registration order is firing order.
    #[must_use]
    pub fn post_processor(mut self, processor: impl PostProcessor + 'static) -> Self {
        self.post_processors.push(Box::new(processor));
        self
    }

    /// Enable fingerprinting with the given generator.
    #[must_use]
    pub fn fingerprint(mut self, generator: impl FingerprintGenerator + 'static) -> Self {
        self.fingerprint = Some(Box::new(generator));
        self
    }

    /// Replace the message source.
    #[must_use]
    pub fn message_source(mut self, source: impl MessageSource + 'static) -> Self {
        self.message_source = Box::new(source);
        self
    }

    /// Set the argument-exposure policy for wire projection.
    #[must_use]
    pub fn exposure(mut self, policy: ExposurePolicy) -> Self {
        self.exposure = policy;
        self
    }

    /// Assemble the dispatcher.  Infallible: every collaborator defaults.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            classifiers: self.classifiers,
            fallback: self.fallback,
            refiner: self.refiner,
            logger: self.logger,
            post_processors: self.post_processors,
            fingerprint: self.fingerprint,
            message_source: self.message_source,
            exposure: self.exposure,
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
