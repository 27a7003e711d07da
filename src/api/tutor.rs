//! AI tutor webhook client.
//!
//! The tutor is an external service, so requests carry no bearer token and do
//! not go through the backend base URL.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;
use url::Url;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::Role;
use crate::request_span;

/// Fixed payload the webhook expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequest {
    pub user_role: Role,
    pub language: String,
    pub level: String,
    pub topic: String,
    pub lesson_type: String,
    pub student_id: String,
    pub message: String,
}

impl TutorRequest {
    pub fn validate(&self) -> ClientResult<()> {
        if self.message.trim().is_empty() {
            return Err(ClientError::validation("Please type a question for the tutor"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TutorClient {
    http: reqwest::Client,
    webhook: Url,
}

impl TutorClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        let webhook = config.tutor_webhook()?;
        Self::with_webhook(webhook, config.request_timeout_duration())
    }

    pub fn with_webhook(webhook: Url, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, webhook })
    }

    /// Send one tutor turn and return the reply text
    pub async fn ask(&self, request: &TutorRequest) -> ClientResult<String> {
        request.validate()?;
        let span = request_span!("POST", self.webhook.path());

        self.post_turn(request).instrument(span).await
    }

    async fn post_turn(&self, request: &TutorRequest) -> ClientResult<String> {
        let response = self
            .http
            .post(self.webhook.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(request)?)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        tracing::Span::current().record("status_code", status.as_u16());

        if !status.is_success() {
            let body = serde_json::from_slice::<Value>(&bytes).ok();
            return Err(ClientError::from_response(status, body.as_ref()));
        }

        let payload: Value = serde_json::from_slice(&bytes)?;
        extract_reply(&payload).ok_or(ClientError::EmptyReply)
    }
}

/// Reply text: `output ?? response ?? message ?? text`, also inside a
/// one-element array, or a bare JSON string.
pub fn extract_reply(payload: &Value) -> Option<String> {
    match payload {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(items) => items.first().and_then(extract_reply),
        Value::Object(_) => crate::models::decode::first_str(payload, &["output", "response", "message", "text"]),
        _ => None,
    }
}
