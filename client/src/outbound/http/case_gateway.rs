//! Reqwest-backed domain-endpoint gateway.
//!
//! One adapter covers the case, admin, and chat surfaces: they share
//! an origin, bearer authentication, and rejection conventions. The
//! display message for a rejection is extracted here (`detail` first,
//! then `error`, then a status fallback) because the screens render
//! gateway errors verbatim.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{build_client, ensure_trailing_slash};
use crate::domain::admin::{ActivityLogEntry, ManagedUser, ManagedUserUpdate};
use crate::domain::cases::{Case, CaseDraft, Comment};
use crate::domain::chat::{ChatReply, ChatSession};
use crate::domain::ports::{CaseGateway, CaseGatewayError};

const CASES_PATH: &str = "api/cases/";
const MANAGED_USERS_PATH: &str = "api/auth/manage/users/";
const ACTIVITY_LOGS_PATH: &str = "api/auth/admin/activity-logs/";
const CHAT_SESSIONS_PATH: &str = "api/chat/sessions/";

/// Domain-endpoint adapter performing HTTP requests against one
/// origin.
pub struct HttpCaseGateway {
    client: Client,
    base: Url,
}

impl HttpCaseGateway {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            base: ensure_trailing_slash(base),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CaseGatewayError> {
        self.base
            .join(path)
            .map_err(|error| CaseGatewayError::transport(format!("invalid endpoint URL: {error}")))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
        body: Option<Value>,
    ) -> Result<Vec<u8>, CaseGatewayError> {
        let mut request = self
            .client
            .request(method, self.endpoint(path)?)
            .bearer_auth(access_token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if status.is_success() {
            Ok(bytes.to_vec())
        } else {
            Err(CaseGatewayError::rejected(
                status.as_u16(),
                rejection_message(status, bytes.as_ref()),
            ))
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
        body: Option<Value>,
    ) -> Result<T, CaseGatewayError> {
        let bytes = self.send(method, path, access_token, body).await?;
        serde_json::from_slice(&bytes)
            .map_err(|error| CaseGatewayError::decode(error.to_string()))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
    ) -> Result<(), CaseGatewayError> {
        self.send(method, path, access_token, None).await.map(|_| ())
    }
}

#[async_trait]
impl CaseGateway for HttpCaseGateway {
    async fn list_cases(&self, access_token: &str) -> Result<Vec<Case>, CaseGatewayError> {
        self.fetch(Method::GET, CASES_PATH, access_token, None).await
    }

    async fn case(&self, access_token: &str, id: u64) -> Result<Case, CaseGatewayError> {
        self.fetch(Method::GET, &format!("{CASES_PATH}{id}/"), access_token, None)
            .await
    }

    async fn create_case(
        &self,
        access_token: &str,
        draft: &CaseDraft,
    ) -> Result<Case, CaseGatewayError> {
        let body = serde_json::to_value(draft)
            .map_err(|error| CaseGatewayError::decode(error.to_string()))?;
        self.fetch(Method::POST, CASES_PATH, access_token, Some(body))
            .await
    }

    async fn analyze_case(&self, access_token: &str, id: u64) -> Result<Case, CaseGatewayError> {
        self.fetch(
            Method::POST,
            &format!("{CASES_PATH}{id}/analyze/"),
            access_token,
            None,
        )
        .await
    }

    async fn close_case(&self, access_token: &str, id: u64) -> Result<Case, CaseGatewayError> {
        self.fetch(
            Method::POST,
            &format!("{CASES_PATH}{id}/close/"),
            access_token,
            None,
        )
        .await
    }

    async fn approve_case(&self, access_token: &str, id: u64) -> Result<Case, CaseGatewayError> {
        self.fetch(
            Method::POST,
            &format!("{CASES_PATH}{id}/approve/"),
            access_token,
            None,
        )
        .await
    }

    async fn add_comment(
        &self,
        access_token: &str,
        id: u64,
        content: &str,
    ) -> Result<Comment, CaseGatewayError> {
        self.fetch(
            Method::POST,
            &format!("{CASES_PATH}{id}/add_comment/"),
            access_token,
            Some(json!({ "content": content })),
        )
        .await
    }

    async fn list_managed_users(
        &self,
        access_token: &str,
    ) -> Result<Vec<ManagedUser>, CaseGatewayError> {
        self.fetch(Method::GET, MANAGED_USERS_PATH, access_token, None)
            .await
    }

    async fn update_managed_user(
        &self,
        access_token: &str,
        id: i64,
        update: &ManagedUserUpdate,
    ) -> Result<ManagedUser, CaseGatewayError> {
        let body = serde_json::to_value(update)
            .map_err(|error| CaseGatewayError::decode(error.to_string()))?;
        self.fetch(
            Method::PATCH,
            &format!("{MANAGED_USERS_PATH}{id}/"),
            access_token,
            Some(body),
        )
        .await
    }

    async fn delete_managed_user(
        &self,
        access_token: &str,
        id: i64,
    ) -> Result<(), CaseGatewayError> {
        self.execute(
            Method::DELETE,
            &format!("{MANAGED_USERS_PATH}{id}/"),
            access_token,
        )
        .await
    }

    async fn activity_logs(
        &self,
        access_token: &str,
    ) -> Result<Vec<ActivityLogEntry>, CaseGatewayError> {
        self.fetch(Method::GET, ACTIVITY_LOGS_PATH, access_token, None)
            .await
    }

    async fn chat_sessions(
        &self,
        access_token: &str,
    ) -> Result<Vec<ChatSession>, CaseGatewayError> {
        self.fetch(Method::GET, CHAT_SESSIONS_PATH, access_token, None)
            .await
    }

    async fn create_chat_session(
        &self,
        access_token: &str,
    ) -> Result<ChatSession, CaseGatewayError> {
        self.fetch(Method::POST, CHAT_SESSIONS_PATH, access_token, Some(json!({})))
            .await
    }

    async fn send_chat_message(
        &self,
        access_token: &str,
        session_id: u64,
        content: &str,
    ) -> Result<ChatReply, CaseGatewayError> {
        self.fetch(
            Method::POST,
            &format!("{CHAT_SESSIONS_PATH}{session_id}/messages/"),
            access_token,
            Some(json!({ "content": content })),
        )
        .await
    }
}

fn map_transport_error(error: reqwest::Error) -> CaseGatewayError {
    CaseGatewayError::transport(error.to_string())
}

fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|payload| {
            ["detail", "error"].iter().find_map(|key| {
                payload
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
        })
        .unwrap_or_else(|| format!("request failed with status {status}"))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(br#"{"detail":"Not found."}"#.as_slice(), "Not found.")]
    #[case(br#"{"error":"Chat session not found"}"#.as_slice(), "Chat session not found")]
    #[case(b"<html></html>".as_slice(), "request failed with status 404 Not Found")]
    fn rejection_messages_prefer_detail_then_error(#[case] body: &[u8], #[case] expected: &str) {
        assert_eq!(rejection_message(StatusCode::NOT_FOUND, body), expected);
    }
}
