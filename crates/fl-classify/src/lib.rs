// SPDX-License-Identifier: MIT OR Apache-2.0
//! Failure classification for faultline.
//!
//! One [`Dispatcher`] instance, composed once and shared freely, turns any
//! runtime failure into a structurally complete
//! [`FaultReport`](fl_problem::FaultReport):
//!
//! ```
//! use fl_classify::{Dispatcher, ExposurePlan, TypedClassifier};
//! use fl_catalog::{Locale, MessageCatalog};
//! use fl_problem::Status;
//! use serde_json::json;
//! use std::fmt;
//!
//! #[derive(Debug)]
//! struct OutOfRange { min: i64, max: i64 }
//!
//! impl fmt::Display for OutOfRange {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "value out of range")
//!     }
//! }
//!
//! impl std::error::Error for OutOfRange {}
//!
//! let dispatcher = Dispatcher::builder()
//!     .classifier(
//!         TypedClassifier::new("out_of_range", Status::BAD_REQUEST).with_plan(
//!             ExposurePlan::new()
//!                 .expose(0, "min", |e: &OutOfRange| Ok(json!(e.min)))
//!                 .expose(1, "max", |e: &OutOfRange| Ok(json!(e.max))),
//!         ),
//!     )
//!     .message_source(MessageCatalog::new().with_message(
//!         Locale::root(),
//!         "out_of_range",
//!         "Value must be between {min} and {max}",
//!     ))
//!     .build();
//!
//! let report = dispatcher.handle(Some(&OutOfRange { min: 1, max: 10 }), None);
//! assert_eq!(
//!     report.errors[0].message.as_deref(),
//!     Some("Value must be between 1 and 10")
//! );
//! ```
//!
//! `handle` never panics: logger, refiner, predicates, producers, message
//! lookups, exposure accessors, fingerprint generators, and post-processors
//! are each isolated at the narrowest possible scope, and their failures
//! degrade to "no value" outcomes.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod classifier;
pub mod dispatch;
pub mod expose;
pub mod fingerprint;
pub mod hooks;
pub mod refine;

pub use classifier::{Classifier, Fallback, Fault, FnClassifier, TypedClassifier};
pub use dispatch::{Dispatcher, DispatcherBuilder};
pub use expose::{AccessorError, ExposurePlan};
pub use fingerprint::{DigestFingerprint, FingerprintGenerator, UuidFingerprint};
pub use hooks::{FailureLogger, MetricsPostProcessor, NoopLogger, PostProcessor, TracingLogger};
pub use refine::{CauseRefiner, IdentityRefiner, Refiner};
