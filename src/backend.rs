// src/backend.rs
// HTTP surface of the gesture recognition client. Every endpoint the panel
// touches goes through the `Backend` trait so controller logic can be
// exercised against a fake without a network.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Debug;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{PanelError, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of a form submission response. The backend answers with
/// `{status, message}` on success and `{error}` (or nothing useful) on
/// failure; none of the fields are load-bearing enough to enforce.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitReply {
    pub status: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Result of a form POST that produced an HTTP response at all.
/// Transport failures surface as `Err` instead.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub ok: bool,
    pub reply: SubmitReply,
}

#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// GET the named preset as a flat field→value map.
    async fn fetch_preset(&self, name: &str) -> Result<Vec<(String, String)>>;

    /// POST the form fields (already including the `action` field) to `/`.
    async fn submit_form(&self, fields: Vec<(String, String)>) -> Result<SubmitOutcome>;

    /// GET /start. `Ok(true)` means the response was 2xx.
    async fn start_recognition(&self) -> Result<bool>;

    /// GET /stop.
    async fn stop_recognition(&self) -> Result<bool>;

    /// GET /stop_client, asking the remote client process to exit.
    async fn stop_client(&self) -> Result<bool>;

    /// GET /check_server, the command-server health probe.
    async fn check_server(&self) -> Result<bool>;

    /// Cache-busted URL of the MJPEG feed.
    fn video_feed_url(&self, ts: u64) -> String;
}

/// Milliseconds since the epoch, the same cache-buster the browser used.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// `Backend` implementation over reqwest against a single base URL.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_status(&self, path: &str) -> Result<bool> {
        let response = self.client.get(self.url(path)).send().await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_preset(&self, name: &str) -> Result<Vec<(String, String)>> {
        let response = self
            .client
            .get(self.url("/get_json_file"))
            .query(&[("file", name)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PanelError::BackendStatus {
                endpoint: "/get_json_file",
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let document: Value = serde_json::from_str(&body)?;
        let Value::Object(map) = document else {
            return Err(PanelError::ConfigError(format!(
                "preset {:?} is not a JSON object",
                name
            )));
        };

        Ok(map
            .into_iter()
            .map(|(key, value)| (key, value_to_text(&value)))
            .collect())
    }

    async fn submit_form(&self, fields: Vec<(String, String)>) -> Result<SubmitOutcome> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }

        let response = self.client.post(self.url("/")).multipart(form).send().await?;
        let ok = response.status().is_success();
        // Reply bodies are advisory; a non-JSON body reads as empty.
        let reply = response.json::<SubmitReply>().await.unwrap_or_default();
        Ok(SubmitOutcome { ok, reply })
    }

    async fn start_recognition(&self) -> Result<bool> {
        self.get_status("/start").await
    }

    async fn stop_recognition(&self) -> Result<bool> {
        self.get_status("/stop").await
    }

    async fn stop_client(&self) -> Result<bool> {
        self.get_status("/stop_client").await
    }

    async fn check_server(&self) -> Result<bool> {
        self.get_status("/check_server").await
    }

    fn video_feed_url(&self, ts: u64) -> String {
        format!("{}/video_feed?ts={}", self.base_url, ts)
    }
}

/// Preset values arrive as strings or numbers; form fields only hold text.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
