//! Coded-error data model for faultline.
//!
//! A handled failure is described by one or more stable business error
//! codes, a transport [`Status`], per-code contextual [`Argument`]s, and an
//! optional correlation fingerprint.  [`Classification`] is what a
//! classifier produces; [`FaultReport`] is the final externally visible
//! value; [`WireReport`] is its serialisable shape with the configured
//! [`ExposurePolicy`] applied.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Transport status code attached to a classification.
///
/// Kept as a plain number on the wire so the core stays independent of any
/// particular transport framework.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Status(u16);

impl Status {
    /// 400 Bad Request.
    pub const BAD_REQUEST: Status = Status(400);
    /// 401 Unauthorized.
    pub const UNAUTHORIZED: Status = Status(401);
    /// 403 Forbidden.
    pub const FORBIDDEN: Status = Status(403);
    /// 404 Not Found.
    pub const NOT_FOUND: Status = Status(404);
    /// 409 Conflict.
    pub const CONFLICT: Status = Status(409);
    /// 422 Unprocessable Content.
    pub const UNPROCESSABLE: Status = Status(422);
    /// 500 Internal Server Error.
    pub const INTERNAL_SERVER_ERROR: Status = Status(500);
    /// 503 Service Unavailable.
    pub const SERVICE_UNAVAILABLE: Status = Status(503);

    /// Wrap a raw status number.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// The raw status number.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Whether this status is in the client-error range (400–499).
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Whether this status is in the server-error range (500–599).
    #[must_use]
    pub const fn is_server_error(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Argument
// ---------------------------------------------------------------------------

/// A named contextual value exposed for message interpolation.
///
/// Arguments are immutable once built and compare by name plus value.  A
/// `null` value is legal and distinct from the argument being absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Argument {
    /// Placeholder name used in templates and on the wire.
    pub name: String,
    /// The exposed value; `Value::Null` when the failure carried none.
    pub value: Value,
}

impl Argument {
    /// Build an argument from any serialisable value.
    ///
    /// Values that cannot be serialised degrade to `null` — argument
    /// construction never fails and never panics.
    pub fn new(name: impl Into<String>, value: impl Serialize) -> Self {
        Self {
            name: name.into(),
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        }
    }

    /// Build an argument from an already-converted JSON value.
    pub fn from_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Build an argument with an explicit `null` value.
    pub fn null(name: impl Into<String>) -> Self {
        Self::from_value(name, Value::Null)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Errors raised when constructing an invalid [`Classification`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    /// No error code was supplied.
    #[error("a classification must carry at least one error code")]
    EmptyCodes,
    /// A supplied error code was blank.
    #[error("error codes must not be blank")]
    BlankCode,
}

/// The error codes, transport status, and per-code arguments chosen for one
/// failure.
///
/// Codes keep their encounter order; `arguments_for` resolves missing codes
/// to an empty slice, so consumers never observe an absent-vs-empty split.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    codes: Vec<String>,
    status: Status,
    arguments: BTreeMap<String, Vec<Argument>>,
}

/// Shared empty slice backing `arguments_for` misses.
const NO_ARGUMENTS: &[Argument] = &[];

impl Classification {
    /// Build a single-code classification.
    ///
    /// # Panics
    ///
    /// Panics if `code` is blank; a classifier emitting a blank code is a
    /// programming error, not a runtime condition.  Use [`with_codes`] for
    /// fallible construction from dynamic input.
    ///
    /// [`with_codes`]: Classification::with_codes
    #[must_use]
    pub fn new(code: impl Into<String>, status: Status) -> Self {
        let code = code.into();
        assert!(!code.trim().is_empty(), "error code must not be blank");
        Self {
            codes: vec![code],
            status,
            arguments: BTreeMap::new(),
        }
    }

    /// Build a classification from a dynamic code list.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::EmptyCodes`] for an empty list and
    /// [`ClassificationError::BlankCode`] when any entry is blank.
    pub fn with_codes(
        codes: Vec<String>,
        status: Status,
    ) -> Result<Self, ClassificationError> {
        if codes.is_empty() {
            return Err(ClassificationError::EmptyCodes);
        }
        if codes.iter().any(|c| c.trim().is_empty()) {
            return Err(ClassificationError::BlankCode);
        }
        Ok(Self {
            codes,
            status,
            arguments: BTreeMap::new(),
        })
    }

    /// Append another error code, preserving encounter order.
    #[must_use]
    pub fn and_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        assert!(!code.trim().is_empty(), "error code must not be blank");
        self.codes.push(code);
        self
    }

    /// Attach one argument to a code's ordered argument list.
    #[must_use]
    pub fn with_argument(mut self, code: impl Into<String>, argument: Argument) -> Self {
        self.arguments.entry(code.into()).or_default().push(argument);
        self
    }

    /// Replace a code's ordered argument list wholesale.
    #[must_use]
    pub fn with_arguments(mut self, code: impl Into<String>, arguments: Vec<Argument>) -> Self {
        self.arguments.insert(code.into(), arguments);
        self
    }

    /// The error codes in encounter order.
    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// The transport status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Ordered arguments for `code`; an empty slice when none were attached.
    #[must_use]
    pub fn arguments_for(&self, code: &str) -> &[Argument] {
        self.arguments
            .get(code)
            .map_or(NO_ARGUMENTS, Vec::as_slice)
    }
}

// ---------------------------------------------------------------------------
// CodedMessage
// ---------------------------------------------------------------------------

/// One resolved error entry of a [`FaultReport`].
///
/// `message` is `None` when no template was found for the code and locale —
/// a valid, non-error state; the code and arguments still reach the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CodedMessage {
    /// Stable business error code.
    pub code: String,
    /// Interpolated message text, or `None` when no template was found.
    pub message: Option<String>,
    /// Ordered contextual arguments for this code.
    pub arguments: Vec<Argument>,
}

impl CodedMessage {
    /// Build a coded message.
    pub fn new(
        code: impl Into<String>,
        message: Option<String>,
        arguments: Vec<Argument>,
    ) -> Self {
        Self {
            code: code.into(),
            message,
            arguments,
        }
    }
}

// ---------------------------------------------------------------------------
// ExposurePolicy
// ---------------------------------------------------------------------------

/// Governs whether a message's arguments appear in the wire payload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ExposurePolicy {
    /// Arguments are always omitted from the payload.
    Never,
    /// Arguments are omitted only when a code's list is empty.
    #[default]
    NonEmpty,
    /// Arguments are always present, possibly as an empty object.
    Always,
}

// ---------------------------------------------------------------------------
// FaultReport
// ---------------------------------------------------------------------------

/// The final externally visible outcome of handling one failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultReport {
    /// Resolved error entries in classification order.
    pub errors: Vec<CodedMessage>,
    /// Transport status for the whole report.
    pub status: Status,
    /// Correlation token, when fingerprinting is enabled.
    pub fingerprint: Option<String>,
}

impl FaultReport {
    /// Build a report without a fingerprint.
    #[must_use]
    pub fn new(errors: Vec<CodedMessage>, status: Status) -> Self {
        Self {
            errors,
            status,
            fingerprint: None,
        }
    }

    /// Attach a correlation fingerprint.
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// The first error code, when any entry is present.
    #[must_use]
    pub fn primary_code(&self) -> Option<&str> {
        self.errors.first().map(|m| m.code.as_str())
    }

    /// Project this report onto its wire shape under `policy`.
    #[must_use]
    pub fn to_wire(&self, policy: ExposurePolicy) -> WireReport {
        WireReport {
            errors: self
                .errors
                .iter()
                .map(|m| WireMessage::project(m, policy))
                .collect(),
            status: self.status,
            fingerprint: self.fingerprint.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire DTOs
// ---------------------------------------------------------------------------

/// Serialisable shape of one error entry.
///
/// `arguments` is keyed by argument name; on duplicate names the first
/// occurrence wins, matching the interpolator's name resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WireMessage {
    /// Stable business error code.
    pub code: String,
    /// Resolved message text, `null` when no template was found.
    pub message: Option<String>,
    /// Arguments by name; presence is governed by [`ExposurePolicy`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<BTreeMap<String, Value>>,
}

impl WireMessage {
    fn project(message: &CodedMessage, policy: ExposurePolicy) -> Self {
        let arguments = match policy {
            ExposurePolicy::Never => None,
            ExposurePolicy::NonEmpty if message.arguments.is_empty() => None,
            ExposurePolicy::NonEmpty | ExposurePolicy::Always => {
                let mut map = BTreeMap::new();
                for a in &message.arguments {
                    // First occurrence wins.
                    map.entry(a.name.clone()).or_insert_with(|| a.value.clone());
                }
                Some(map)
            }
        };
        Self {
            code: message.code.clone(),
            message: message.message.clone(),
            arguments,
        }
    }
}

/// Serialisable shape of a whole [`FaultReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WireReport {
    /// Error entries in classification order.
    pub errors: Vec<WireMessage>,
    /// Transport status.
    pub status: Status,
    /// Correlation token, `null` when fingerprinting is disabled.
    pub fingerprint: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
