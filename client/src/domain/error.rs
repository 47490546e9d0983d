//! Gate-level error types and rejection-message rules.
//!
//! Errors from the session gate carry a ready-to-display string; the
//! screens render `message` verbatim and never see raw payloads,
//! except through the deliberate stringified-dump fallback in the
//! registration chain.

use serde_json::Value;
use thiserror::Error;

/// Default message when a login rejection has no usable `detail`.
pub const LOGIN_FAILED: &str = "Login failed";

/// Default message when a password-reset rejection has no `detail`.
pub const PASSWORD_RESET_FAILED: &str = "Password reset failed";

/// Errors surfaced by the session gate.
///
/// Both variants are recoverable by correcting input and re-submitting
/// the form; the gate never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Credential rejected, or the transport failed during login.
    #[error("{message}")]
    Authentication { message: String },
    /// Registration rejected by the remote API.
    #[error("{message}")]
    Registration { message: String },
}

impl SessionError {
    /// Helper for authentication failures.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Helper for registration failures.
    pub fn registration(message: impl Into<String>) -> Self {
        Self::Registration {
            message: message.into(),
        }
    }

    /// The display string carried by either variant.
    pub fn message(&self) -> &str {
        match self {
            Self::Authentication { message } | Self::Registration { message } => message.as_str(),
        }
    }
}

/// Message for a rejected login: the payload's `detail` string, or the
/// generic fallback when the payload has none.
pub(crate) fn login_rejection_message(payload: &Value) -> String {
    payload
        .get("detail")
        .and_then(Value::as_str)
        .map_or_else(|| LOGIN_FAILED.to_owned(), str::to_owned)
}

/// Message for a rejected registration.
///
/// The priority order is a contract the screens rely on: field error
/// lists for `email`, then `password`, then `password2`, then the
/// `non_field_errors` list, then a `detail` string, and as a last
/// resort the whole payload stringified. Payload shapes beyond these
/// branches deliberately fall through to the dump.
pub(crate) fn registration_rejection_message(payload: &Value) -> String {
    for field in ["email", "password", "password2", "non_field_errors"] {
        if let Some(message) = first_field_error(payload, field) {
            return message;
        }
    }
    if let Some(detail) = payload.get("detail").and_then(Value::as_str) {
        return detail.to_owned();
    }
    payload.to_string()
}

fn first_field_error(payload: &Value, field: &str) -> Option<String> {
    let first = payload.get(field)?.as_array()?.first()?;
    Some(
        first
            .as_str()
            .map_or_else(|| first.to_string(), str::to_owned),
    )
}
