//! Authenticated identity and account roles.
//!
//! The identity is the profile the remote API returns after login. The
//! gate only interprets the fields it needs for routing and display;
//! everything else the API sends is carried opaquely in `extra` so a
//! cached identity round-trips without loss.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account class gating which screens are reachable.
///
/// The set is closed: the remote API only issues these three values.
/// A payload that omits the role (the degraded minimal identity, see
/// [`Identity::minimal`]) defaults to [`Role::User`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary account: submits and views its own cases.
    #[default]
    User,
    /// Analyst account: works the analysis queue.
    Analyst,
    /// Administrator account: manages users and cases.
    Admin,
}

impl Role {
    /// Wire representation of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Analyst => "analyst",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "analyst" => Ok(Self::Analyst),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Profile data held by the session for the authenticated account.
///
/// ## Invariants
/// - `email` is always present; it is the login key and the one field
///   the gate can guarantee even when profile enrichment fails.
/// - Fields the gate does not interpret stay in `extra` untouched, so
///   serialising a cached identity reproduces the API payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    role: Role,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Identity {
    /// Degraded identity carrying only the login email.
    ///
    /// Used when the profile fetch after a successful login fails: the
    /// user is still signed in, just without enrichment.
    pub fn minimal(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::default(),
            extra: Map::new(),
        }
    }

    /// Replace the role, chiefly for fixtures and tests.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Replace the name parts, chiefly for fixtures and tests.
    #[must_use]
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Account identifier, absent on a degraded identity.
    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    /// Login email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Given name, possibly empty.
    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    /// Family name, possibly empty.
    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    /// Account role used by the routing rules.
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Display name joined from the name parts, falling back to the
    /// email when both are empty.
    pub fn display_name(&self) -> String {
        let joined = format!("{} {}", self.first_name, self.last_name);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            self.email.clone()
        } else {
            trimmed.to_owned()
        }
    }

    /// Fields the gate carries opaquely.
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub(crate) fn apply_display_name(&mut self, name: &str) {
        let (first, last) = split_display_name(name);
        self.first_name = first;
        self.last_name = last;
    }

    pub(crate) fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }
}

/// Split a free-form display name into the first token and the joined
/// remainder.
///
/// This mirrors what the registration form does before submitting: a
/// presentation convenience, not a legal-name parser. The remainder is
/// empty when the name is a single token.
pub fn split_display_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_owned();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}
