//! Driven port for the remote domain endpoints.
//!
//! Everything the screens do after login — cases, the administrator
//! surface, the assistant chat — goes through this trait. Every
//! operation takes the caller's access token; the session gate owns
//! where that token comes from.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::admin::{ActivityLogEntry, ManagedUser, ManagedUserUpdate};
use crate::domain::cases::{Case, CaseDraft, Comment};
use crate::domain::chat::{ChatReply, ChatSession};

/// Errors surfaced by domain-endpoint adapters.
///
/// Unlike the authentication port, rejections here carry an already
/// extracted display message: the screens show it verbatim and never
/// apply field-level fallback rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseGatewayError {
    /// The remote API answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The request never produced a usable response.
    #[error("{message}")]
    Transport { message: String },
    /// A success response carried a body the client could not decode.
    #[error("remote API response could not be decoded: {message}")]
    Decode { message: String },
}

impl CaseGatewayError {
    /// Helper for rejection responses.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Helper for transport failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for decode failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Driven port for the remote API's case, admin, and chat surfaces.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseGateway: Send + Sync {
    /// List the cases visible to the caller.
    async fn list_cases(&self, access_token: &str) -> Result<Vec<Case>, CaseGatewayError>;

    /// Fetch one case with its analysis and comments.
    async fn case(&self, access_token: &str, id: u64) -> Result<Case, CaseGatewayError>;

    /// Submit the intake wizard's draft.
    async fn create_case(
        &self,
        access_token: &str,
        draft: &CaseDraft,
    ) -> Result<Case, CaseGatewayError>;

    /// Trigger server-side AI analysis and return the updated case.
    async fn analyze_case(&self, access_token: &str, id: u64) -> Result<Case, CaseGatewayError>;

    /// Close a case.
    async fn close_case(&self, access_token: &str, id: u64) -> Result<Case, CaseGatewayError>;

    /// Approve a case.
    async fn approve_case(&self, access_token: &str, id: u64) -> Result<Case, CaseGatewayError>;

    /// Attach a comment to a case.
    async fn add_comment(
        &self,
        access_token: &str,
        id: u64,
        content: &str,
    ) -> Result<Comment, CaseGatewayError>;

    /// List accounts (administrator only).
    async fn list_managed_users(
        &self,
        access_token: &str,
    ) -> Result<Vec<ManagedUser>, CaseGatewayError>;

    /// Apply a partial update to an account (administrator only).
    async fn update_managed_user(
        &self,
        access_token: &str,
        id: i64,
        update: &ManagedUserUpdate,
    ) -> Result<ManagedUser, CaseGatewayError>;

    /// Delete an account (administrator only).
    async fn delete_managed_user(
        &self,
        access_token: &str,
        id: i64,
    ) -> Result<(), CaseGatewayError>;

    /// Read the activity log (administrator only).
    async fn activity_logs(
        &self,
        access_token: &str,
    ) -> Result<Vec<ActivityLogEntry>, CaseGatewayError>;

    /// List the caller's chat sessions.
    async fn chat_sessions(&self, access_token: &str)
    -> Result<Vec<ChatSession>, CaseGatewayError>;

    /// Start a new chat session.
    async fn create_chat_session(
        &self,
        access_token: &str,
    ) -> Result<ChatSession, CaseGatewayError>;

    /// Send a message and receive the assistant's reply.
    async fn send_chat_message(
        &self,
        access_token: &str,
        session_id: u64,
        content: &str,
    ) -> Result<ChatReply, CaseGatewayError>;
}
