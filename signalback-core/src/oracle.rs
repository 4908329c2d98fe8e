//! Decision oracle: the external collaborator that turns a ticker and a
//! date into a natural-language recommendation.
//!
//! The engine only sees the trait. Failures are treated as retryable on a
//! future run and nothing is assumed about side effects on the oracle's
//! end, so a failed call simply leaves its date eligible again.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::OracleConfigSnapshot;

/// Errors from oracle invocations. All variants are retryable.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Http(String),

    #[error("oracle returned an error: {0}")]
    Api(String),

    #[error("oracle returned an empty recommendation")]
    EmptyResponse,
}

/// A recommendation source for a ticker on a given analysis date.
pub trait Oracle {
    /// Human-readable name of this oracle.
    fn name(&self) -> &str;

    /// Produce a free-text recommendation for `ticker` as of `date`.
    fn analyze(&self, ticker: &str, date: NaiveDate) -> Result<String, OracleError>;

    /// Configuration snapshot persisted with each signal.
    fn config_snapshot(&self) -> OracleConfigSnapshot;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Oracle backed by an OpenAI-compatible chat-completions endpoint.
pub struct ChatOracle {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    config: OracleConfigSnapshot,
}

impl ChatOracle {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            config: OracleConfigSnapshot::default(),
        }
    }

    pub fn with_config(mut self, config: OracleConfigSnapshot) -> Self {
        self.config = config;
        self
    }

    fn prompt(ticker: &str, date: NaiveDate) -> String {
        format!(
            "You are a trading analyst. As of {date}, give a one-paragraph \
             trading recommendation for {ticker}. Lead with one of BUY, SELL, \
             or HOLD and qualify it as strong, moderate, or weak."
        )
    }
}

impl Oracle for ChatOracle {
    fn name(&self) -> &str {
        "chat-completions"
    }

    fn analyze(&self, ticker: &str, date: NaiveDate) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: &self.config.deep_model,
            messages: vec![ChatMessage {
                role: "user",
                content: Self::prompt(ticker, date),
            }],
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| OracleError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(OracleError::Api(format!("HTTP {status}: {body}")));
        }

        let parsed: ChatResponse = resp.json().map_err(|e| OracleError::Http(e.to_string()))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(OracleError::EmptyResponse);
        }
        Ok(text)
    }

    fn config_snapshot(&self) -> OracleConfigSnapshot {
        self.config.clone()
    }
}
