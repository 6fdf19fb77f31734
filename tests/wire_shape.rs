// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire-shape coverage: the exact JSON a transport adapter receives, across
//! the full exposure-policy matrix and with fingerprinting on and off.

use fl_catalog::{Locale, MessageCatalog};
use fl_classify::{Dispatcher, DispatcherBuilder, ExposurePlan, TypedClassifier, UuidFingerprint};
use fl_problem::{ExposurePolicy, Status};
use serde_json::{Value, json};
use std::fmt;

#[derive(Debug)]
struct LoginFault {
    attempts: u32,
}

impl fmt::Display for LoginFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "too many login attempts ({})", self.attempts)
    }
}

impl std::error::Error for LoginFault {}

#[derive(Debug)]
struct BareFault;

impl fmt::Display for BareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bare")
    }
}

impl std::error::Error for BareFault {}

fn builder() -> DispatcherBuilder {
    Dispatcher::builder()
        .classifier(
            TypedClassifier::new("too_many_attempts", Status::FORBIDDEN).with_plan(
                ExposurePlan::new().expose(0, "attempts", |f: &LoginFault| Ok(json!(f.attempts))),
            ),
        )
        .classifier(TypedClassifier::<BareFault>::new(
            "bare_failure",
            Status::BAD_REQUEST,
        ))
        .message_source(MessageCatalog::new().with_message(
            Locale::root(),
            "too_many_attempts",
            "Locked after {attempts} attempts",
        ))
}

#[test]
fn non_empty_policy_wire_shape() {
    let dispatcher = builder().build();
    let wire = dispatcher.handle_wire(Some(&LoginFault { attempts: 3 }), None);
    assert_eq!(
        serde_json::to_value(&wire).unwrap(),
        json!({
            "errors": [{
                "code": "too_many_attempts",
                "message": "Locked after 3 attempts",
                "arguments": {"attempts": 3}
            }],
            "status": 403,
            "fingerprint": null
        })
    );
}

#[test]
fn non_empty_policy_omits_empty_argument_lists() {
    let dispatcher = builder().build();
    let wire = dispatcher.handle_wire(Some(&BareFault), None);
    assert_eq!(
        serde_json::to_value(&wire).unwrap(),
        json!({
            "errors": [{"code": "bare_failure", "message": null}],
            "status": 400,
            "fingerprint": null
        })
    );
}

#[test]
fn never_policy_strips_arguments_entirely() {
    let dispatcher = builder().exposure(ExposurePolicy::Never).build();
    let wire = dispatcher.handle_wire(Some(&LoginFault { attempts: 3 }), None);
    let v = serde_json::to_value(&wire).unwrap();
    assert!(v["errors"][0].get("arguments").is_none());
    // The message still interpolates from the full argument list.
    assert_eq!(v["errors"][0]["message"], "Locked after 3 attempts");
}

#[test]
fn always_policy_emits_empty_argument_objects() {
    let dispatcher = builder().exposure(ExposurePolicy::Always).build();
    let wire = dispatcher.handle_wire(Some(&BareFault), None);
    let v = serde_json::to_value(&wire).unwrap();
    assert_eq!(v["errors"][0]["arguments"], json!({}));
}

#[test]
fn fingerprint_appears_on_the_wire_when_enabled() {
    let dispatcher = builder().fingerprint(UuidFingerprint).build();
    let wire = dispatcher.handle_wire(Some(&LoginFault { attempts: 1 }), None);
    let v = serde_json::to_value(&wire).unwrap();
    assert!(matches!(&v["fingerprint"], Value::String(s) if !s.is_empty()));
}

#[test]
fn fallback_report_wire_shape() {
    let dispatcher = builder().build();
    let wire = dispatcher.handle_wire(None, None);
    assert_eq!(
        serde_json::to_value(&wire).unwrap(),
        json!({
            "errors": [{"code": "unknown", "message": null}],
            "status": 500,
            "fingerprint": null
        })
    );
}

#[test]
fn wire_report_roundtrips_through_json() {
    let dispatcher = builder().exposure(ExposurePolicy::Always).build();
    let wire = dispatcher.handle_wire(Some(&LoginFault { attempts: 9 }), None);
    let text = serde_json::to_string(&wire).unwrap();
    let back: fl_problem::WireReport = serde_json::from_str(&text).unwrap();
    assert_eq!(back, wire);
}
