/// HTTP client for the external NLP microservice
///
/// The collaborator exposes `GET /ai-search?q=` (semantic product search) and
/// `GET /health`. Its unavailability is an expected operating condition: every
/// failure mode here maps to an error the cascade silently falls through on.
/// Rows come back as loose JSON and are only given a shape by the normalizer.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum NlpError {
    #[error("NLP service unavailable: {0}")]
    Unavailable(String),

    #[error("NLP service returned status {status}")]
    Api { status: u16 },

    #[error("Malformed NLP response: {0}")]
    Malformed(String),
}

/// Abstraction over the semantic search collaborator.
///
/// The cascade depends on this trait rather than the concrete client so tests
/// can substitute scripted backends.
#[async_trait]
pub trait SemanticBackend: Send + Sync {
    /// Run a semantic search for `query`. Rows are raw JSON objects.
    async fn search(&self, query: &str) -> Result<Vec<Value>, NlpError>;

    /// Probe the collaborator's health endpoint. Never errors.
    async fn health(&self) -> bool;
}

/// reqwest-backed client for the NLP microservice.
pub struct NlpClient {
    client: reqwest::Client,
    base_url: String,
    search_timeout: Duration,
    health_timeout: Duration,
}

impl NlpClient {
    pub fn new(base_url: String, search_timeout_ms: u64, health_timeout_ms: u64) -> Self {
        NlpClient {
            client: reqwest::Client::new(),
            base_url,
            search_timeout: Duration::from_millis(search_timeout_ms),
            health_timeout: Duration::from_millis(health_timeout_ms),
        }
    }
}

#[async_trait]
impl SemanticBackend for NlpClient {
    async fn search(&self, query: &str) -> Result<Vec<Value>, NlpError> {
        let url = format!("{}/ai-search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .timeout(self.search_timeout)
            .send()
            .await
            .map_err(|e| NlpError::Unavailable(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(NlpError::Api { status });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| NlpError::Malformed(e.to_string()))?;

        // The service may respond { results: [...] } or a bare array;
        // any other shape counts as zero results.
        Ok(extract_rows(body))
    }

    async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);

        let body: Option<Value> = match self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp.json().await.ok(),
            _ => None,
        };

        body.and_then(|v| v.get("ok").and_then(Value::as_bool))
            .unwrap_or(false)
    }
}

/// Flatten the two accepted response envelopes into a row list.
fn extract_rows(body: Value) -> Vec<Value> {
    match body {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_rows_enveloped() {
        let rows = extract_rows(json!({ "results": [{"id": 1}, {"id": 2}] }));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_extract_rows_bare_array() {
        let rows = extract_rows(json!([{"id": 7}]));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_extract_rows_unexpected_shape_is_empty() {
        assert!(extract_rows(json!({ "results": "nope" })).is_empty());
        assert!(extract_rows(json!("just a string")).is_empty());
        assert!(extract_rows(json!(42)).is_empty());
    }
}
