//! HTTP/JSON client for the timer service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::timer_service::{ServiceError, TimerService};
use crate::state::Timer;

const TIMERS_PATH: &str = "/api/v1/timers";

#[derive(Serialize)]
struct DurationRequest {
    duration: i64,
}

#[derive(Serialize)]
struct EmptyRequest {}

/// The list endpoint has shipped with several body shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Items { items: Vec<Timer> },
    Timers { timers: Vec<Timer> },
    Bare(Vec<Timer>),
}

impl ListBody {
    fn into_timers(self) -> Vec<Timer> {
        match self {
            ListBody::Items { items } => items,
            ListBody::Timers { timers } => timers,
            ListBody::Bare(timers) => timers,
        }
    }
}

/// Timer service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpTimerService {
    client: Client,
    base_url: String,
}

impl HttpTimerService {
    /// Create a client for the service at `base_url`, e.g. `http://localhost:8000`
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ServiceError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timers_url(&self) -> String {
        format!("{}{}", self.base_url, TIMERS_PATH)
    }

    fn timer_url(&self, id: &str, action: Option<&str>) -> String {
        match action {
            Some(action) => format!("{}/{}/{}", self.timers_url(), id, action),
            None => format!("{}/{}", self.timers_url(), id),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&body);
            warn!("Timer service responded {}: {:?}", status, message);
            return Err(ServiceError::status(status.as_u16(), message));
        }

        serde_json::from_slice(&body).map_err(|e| ServiceError::Malformed(e.to_string()))
    }

    async fn post_action(&self, id: &str, action: &str) -> Result<Timer, ServiceError> {
        debug!("POST {} for timer {}", action, id);
        self.send(self.client.post(self.timer_url(id, Some(action))).json(&EmptyRequest {}))
            .await
    }
}

/// Pull a human readable message out of an error payload. FastAPI puts it
/// under `detail`, either as a string or a list of validation errors.
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;

    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[async_trait]
impl TimerService for HttpTimerService {
    async fn create(&self, duration: i64) -> Result<Timer, ServiceError> {
        debug!("Creating timer with duration {}s", duration);
        self.send(self.client.post(self.timers_url()).json(&DurationRequest { duration }))
            .await
    }

    async fn start(&self, id: &str) -> Result<Timer, ServiceError> {
        self.post_action(id, "start").await
    }

    async fn stop(&self, id: &str) -> Result<Timer, ServiceError> {
        self.post_action(id, "stop").await
    }

    async fn reset(&self, id: &str) -> Result<Timer, ServiceError> {
        self.post_action(id, "reset").await
    }

    async fn set_duration(&self, id: &str, duration: i64) -> Result<Timer, ServiceError> {
        debug!("Setting duration of timer {} to {}s", id, duration);
        self.send(self.client.post(self.timer_url(id, None)).json(&DurationRequest { duration }))
            .await
    }

    async fn list(&self) -> Result<Vec<Timer>, ServiceError> {
        let body: ListBody = self.send(self.client.get(self.timers_url())).await?;
        Ok(body.into_timers())
    }

    async fn health(&self) -> Result<(), ServiceError> {
        let _: Value = self
            .send(self.client.get(format!("{}/health", self.base_url)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let service = HttpTimerService::with_client(Client::new(), "http://localhost:8000/");
        assert_eq!(service.base_url(), "http://localhost:8000");
        assert_eq!(service.timers_url(), "http://localhost:8000/api/v1/timers");
        assert_eq!(
            service.timer_url("abc", Some("start")),
            "http://localhost:8000/api/v1/timers/abc/start"
        );
        assert_eq!(service.timer_url("abc", None), "http://localhost:8000/api/v1/timers/abc");
    }

    #[test]
    fn error_message_reads_message_then_detail() {
        assert_eq!(error_message(br#"{"message": "boom"}"#).as_deref(), Some("boom"));
        assert_eq!(
            error_message(br#"{"detail": "Timer not found"}"#).as_deref(),
            Some("Timer not found")
        );
        assert_eq!(
            error_message(br#"{"detail": [{"loc": ["body"], "msg": "value must be > 0"}]}"#)
                .as_deref(),
            Some("value must be > 0")
        );
        assert_eq!(error_message(b"<html>bad gateway</html>"), None);
        assert_eq!(error_message(b""), None);
    }

    #[test]
    fn list_body_accepts_every_shape() {
        let timer = r#"{"id": "a", "duration": 10}"#;
        for body in [
            format!(r#"{{"items": [{timer}], "count": 1}}"#),
            format!(r#"{{"timers": [{timer}]}}"#),
            format!("[{timer}]"),
        ] {
            let parsed: ListBody = serde_json::from_str(&body).unwrap();
            let timers = parsed.into_timers();
            assert_eq!(timers.len(), 1, "body: {body}");
            assert_eq!(timers[0].id, "a");
        }
    }
}
