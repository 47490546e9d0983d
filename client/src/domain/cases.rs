//! Case entities and the intake draft payload.
//!
//! A pragmatic typed subset of what the remote API serialises for a
//! case. The API attaches many optional intake and analysis fields;
//! the ones screens do not interpret structurally stay in `extra` so
//! nothing is lost when a case is re-serialised.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Workflow state of a case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl CaseStatus {
    /// Wire representation of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incident category chosen during intake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCategory {
    #[default]
    General,
    Fraud,
    Security,
    Compliance,
    Financial,
    Cybercrime,
    IdentityTheft,
    IntellectualProperty,
    Corruption,
    MoneyLaundering,
    DataBreach,
    Regulatory,
}

/// Intake priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Intake severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSeverity {
    Minor,
    #[default]
    Moderate,
    Major,
    Severe,
}

/// AI analysis attached to a case once the analyse action has run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub category_confidence: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub analyzed_at: Option<DateTime<Utc>>,
}

/// Comment left on a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub content: String,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A case as the remote API serialises it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: u64,
    /// Human-facing case number assigned by the backend.
    pub case_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: CaseCategory,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub priority: CasePriority,
    #[serde(default)]
    pub severity: CaseSeverity,
    #[serde(default)]
    pub incident_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub involved_parties: Option<String>,
    #[serde(default)]
    pub confidential: bool,
    #[serde(default)]
    pub created_by_name: Option<String>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub analysis: Option<Analysis>,
    /// Analysis summary mirrored inline on the case record.
    #[serde(default)]
    pub analysis_summary: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Intake and analysis fields the client carries opaquely.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating a case through the intake wizard.
///
/// Optional fields are omitted from the request body entirely so the
/// backend applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CaseDraft {
    pub title: String,
    pub description: String,
    pub category: CaseCategory,
    pub priority: CasePriority,
    pub severity: CaseSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub involved_parties: Option<String>,
    pub confidential: bool,
}
