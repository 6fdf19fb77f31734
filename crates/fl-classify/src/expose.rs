// SPDX-License-Identifier: MIT OR Apache-2.0
//! Exposure plans: explicit, ordered registration of the contextual values a
//! failure type surfaces for message interpolation.
//!
//! A plan replaces reflective marker scanning: each candidate is declared
//! once with an order key, the accessor identifier, an optional exposed-name
//! override, and a value-producing closure.  Extraction is deterministic —
//! candidates sort by (order key, declaration index) and a failing accessor
//! skips only itself.

use fl_problem::Argument;
use serde_json::Value;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::debug;

/// Failure of a single value accessor; skips that candidate only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("accessor failed: {reason}")]
pub struct AccessorError {
    reason: String,
}

impl AccessorError {
    /// Describe why the accessor could not produce a value.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

type Reader<E> = Box<dyn Fn(&E) -> Result<Value, AccessorError> + Send + Sync>;

struct Candidate<E: ?Sized> {
    order: i32,
    accessor: &'static str,
    exposed: Option<&'static str>,
    read: Reader<E>,
}

impl<E> Candidate<E> {
    /// Explicit override name wins over the accessor identifier.
    fn name(&self) -> &'static str {
        self.exposed.unwrap_or(self.accessor)
    }
}

/// Ordered set of exposure candidates for one failure type.
pub struct ExposurePlan<E> {
    candidates: Vec<Candidate<E>>,
}

impl<E> ExposurePlan<E> {
    /// An empty plan: the failure type exposes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Declare a candidate exposed under the accessor's own identifier.
    ///
    /// Lower `order` keys sort first; ties keep declaration order.
    #[must_use]
    pub fn expose(
        self,
        order: i32,
        accessor: &'static str,
        read: impl Fn(&E) -> Result<Value, AccessorError> + Send + Sync + 'static,
    ) -> Self {
        self.push(order, accessor, None, read)
    }

    /// Declare a candidate exposed under an explicit name override.
    #[must_use]
    pub fn expose_as(
        self,
        order: i32,
        accessor: &'static str,
        exposed: &'static str,
        read: impl Fn(&E) -> Result<Value, AccessorError> + Send + Sync + 'static,
    ) -> Self {
        self.push(order, accessor, Some(exposed), read)
    }

    fn push(
        mut self,
        order: i32,
        accessor: &'static str,
        exposed: Option<&'static str>,
        read: impl Fn(&E) -> Result<Value, AccessorError> + Send + Sync + 'static,
    ) -> Self {
        self.candidates.push(Candidate {
            order,
            accessor,
            exposed,
            read: Box::new(read),
        });
        self
    }

    /// Number of declared candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the plan declares no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Read every candidate off `failure` in deterministic order.
    ///
    /// The output order is (order key ascending, declaration index) — the
    /// order positional placeholders index into.  An accessor that returns
    /// an error or panics skips its own candidate and nothing else; this
    /// method never panics.
    #[must_use]
    pub fn extract(&self, failure: &E) -> Vec<Argument> {
        let mut ranked: Vec<&Candidate<E>> = self.candidates.iter().collect();
        // Stable sort: equal order keys keep declaration order.
        ranked.sort_by_key(|c| c.order);

        let mut arguments = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            match catch_unwind(AssertUnwindSafe(|| (candidate.read)(failure))) {
                Ok(Ok(value)) => arguments.push(Argument::from_value(candidate.name(), value)),
                Ok(Err(err)) => {
                    debug!(
                        target: "fl_classify.expose",
                        accessor = candidate.accessor,
                        error = %err,
                        "exposure accessor failed; skipping candidate"
                    );
                }
                Err(_) => {
                    debug!(
                        target: "fl_classify.expose",
                        accessor = candidate.accessor,
                        "exposure accessor panicked; skipping candidate"
                    );
                }
            }
        }
        arguments
    }
}

impl<E> Default for ExposurePlan<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ExposurePlan<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.candidates.iter().map(|c| c.name()).collect();
        f.debug_struct("ExposurePlan")
            .field("candidates", &names)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct RangeFault {
        min: i64,
        max: i64,
        detail: Option<String>,
    }

    impl fmt::Display for RangeFault {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "value out of range")
        }
    }

    impl std::error::Error for RangeFault {}

    fn range_fault() -> RangeFault {
        RangeFault {
            min: 1,
            max: 10,
            detail: None,
        }
    }

    #[test]
    fn order_key_beats_declaration_order() {
        let plan = ExposurePlan::new()
            .expose(5, "max", |f: &RangeFault| Ok(json!(f.max)))
            .expose(1, "min", |f: &RangeFault| Ok(json!(f.min)));
        let args = plan.extract(&range_fault());
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].name, "min");
        assert_eq!(args[1].name, "max");
    }

    #[test]
    fn equal_order_keys_keep_declaration_order() {
        let plan = ExposurePlan::new()
            .expose(0, "b", |_: &RangeFault| Ok(json!(2)))
            .expose(0, "a", |_: &RangeFault| Ok(json!(1)));
        let args = plan.extract(&range_fault());
        assert_eq!(args[0].name, "b");
        assert_eq!(args[1].name, "a");
    }

    #[test]
    fn explicit_name_overrides_accessor_identifier() {
        let plan = ExposurePlan::new()
            .expose_as(0, "min", "lowerBound", |f: &RangeFault| Ok(json!(f.min)));
        let args = plan.extract(&range_fault());
        assert_eq!(args[0].name, "lowerBound");
        assert_eq!(args[0].value, json!(1));
    }

    #[test]
    fn failing_accessor_skips_only_itself() {
        let plan = ExposurePlan::new()
            .expose(0, "min", |f: &RangeFault| Ok(json!(f.min)))
            .expose(1, "detail", |f: &RangeFault| {
                f.detail
                    .clone()
                    .map(|d| json!(d))
                    .ok_or_else(|| AccessorError::new("no detail recorded"))
            })
            .expose(2, "max", |f: &RangeFault| Ok(json!(f.max)));
        let args = plan.extract(&range_fault());
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].name, "min");
        assert_eq!(args[1].name, "max");
    }

    #[test]
    fn panicking_accessor_skips_only_itself() {
        let plan = ExposurePlan::new()
            .expose(0, "boom", |_: &RangeFault| panic!("accessor exploded"))
            .expose(1, "max", |f: &RangeFault| Ok(json!(f.max)));
        let args = plan.extract(&range_fault());
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name, "max");
    }

    #[test]
    fn null_value_survives_extraction() {
        let plan =
            ExposurePlan::new().expose(0, "detail", |_: &RangeFault| Ok(Value::Null));
        let args = plan.extract(&range_fault());
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].value, Value::Null);
    }

    #[test]
    fn empty_plan_extracts_nothing() {
        let plan: ExposurePlan<RangeFault> = ExposurePlan::new();
        assert!(plan.is_empty());
        assert!(plan.extract(&range_fault()).is_empty());
    }
}
