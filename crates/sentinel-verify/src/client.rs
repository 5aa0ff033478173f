//! HTTP verification client.

use crate::cache::ResponseCache;
use crate::error::{Result, VerifyError};
use async_trait::async_trait;
use reqwest::Client;
use sentinel_core::{PiiCategory, RuleMatch, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout for connectivity probes (`GET /health`).
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Seam for escalating candidate text to the remote verification
/// service. Tests substitute fakes; the coordinator only depends on
/// this trait.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Verify `text` against the selected pattern namespaces.
    ///
    /// Returns the confirmed matches (each tagged `verified = true`),
    /// or [`VerifyError::ServiceUnavailable`] when the service cannot
    /// answer in time — the caller falls back to client-only results.
    async fn verify(
        &self,
        text: &str,
        namespaces: &[String],
        max_matches: u32,
    ) -> Result<Vec<RuleMatch>>;
}

/// Reachability report from the verification service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    /// Whether the service answered the probe
    pub online: bool,
    /// Service version string
    pub version: String,
    /// Namespaces the service can match against
    pub namespaces: Vec<String>,
    /// Number of patterns the service has loaded
    pub pattern_count: u32,
}

impl HealthStatus {
    /// The offline placeholder used when the probe fails.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            online: false,
            version: String::new(),
            namespaces: Vec::new(),
            pattern_count: 0,
        }
    }
}

/// Verification client backed by the remote HTTP service.
///
/// Holds a response cache keyed by content fingerprint so identical
/// text is never verified twice within the cache TTL.
pub struct HttpVerifier {
    client: Client,
    base_url: String,
    cache: ResponseCache,
}

impl HttpVerifier {
    /// Create a client for the given endpoint with the given inline
    /// scan timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerifyError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            cache: ResponseCache::default(),
        })
    }

    /// Replace the default response cache (used to tune TTL/capacity).
    #[must_use]
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    /// Probe the service. Never required for core scanning; failures
    /// yield the offline placeholder rather than an error.
    pub async fn health_check(&self) -> HealthStatus {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<HealthResponse>().await {
                Ok(body) => HealthStatus {
                    online: true,
                    version: body.version,
                    namespaces: body.namespaces,
                    pattern_count: body.patterns_loaded,
                },
                Err(e) => {
                    tracing::warn!("Health response not decodable: {e}");
                    HealthStatus::offline()
                }
            },
            Ok(resp) => {
                tracing::debug!("Health probe returned HTTP {}", resp.status());
                HealthStatus::offline()
            }
            Err(e) => {
                tracing::debug!("Health probe failed: {e}");
                HealthStatus::offline()
            }
        }
    }
}

#[async_trait]
impl Verifier for HttpVerifier {
    async fn verify(
        &self,
        text: &str,
        namespaces: &[String],
        max_matches: u32,
    ) -> Result<Vec<RuleMatch>> {
        let key = ResponseCache::fingerprint(namespaces, text);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("Verification cache hit");
            return Ok(cached);
        }

        let request = FindRequest {
            text,
            namespaces,
            max_matches,
            // The service must not echo matched text back.
            include_matched_text: false,
        };

        let response = self
            .client
            .post(format!("{}/find", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::ServiceUnavailable {
                reason: format!("HTTP {status}"),
            });
        }

        let body: FindResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::InvalidResponse(e.to_string()))?;

        let matches: Vec<RuleMatch> = body
            .matches
            .into_iter()
            .map(|m| RuleMatch {
                category: m.category,
                severity: m.severity,
                rule_id: m.rule_id,
                span_len: 0,
                verified: true,
            })
            .collect();

        self.cache.insert(key, matches.clone());
        Ok(matches)
    }
}

#[derive(Debug, Serialize)]
struct FindRequest<'a> {
    text: &'a str,
    namespaces: &'a [String],
    max_matches: u32,
    include_matched_text: bool,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    matches: Vec<FindMatch>,
}

#[derive(Debug, Deserialize)]
struct FindMatch {
    category: PiiCategory,
    severity: Severity,
    rule_id: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    version: String,
    patterns_loaded: u32,
    namespaces: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_request_shape() {
        let namespaces = vec!["comm".to_string()];
        let request = FindRequest {
            text: "candidate",
            namespaces: &namespaces,
            max_matches: 50,
            include_matched_text: false,
        };
        let json = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(json["include_matched_text"], false);
        assert_eq!(json["max_matches"], 50);
        assert_eq!(json["namespaces"][0], "comm");
    }

    #[test]
    fn test_find_response_decoding() {
        let body = r#"{"matches":[{"category":"email","severity":"medium","rule_id":"comm/email"}],"mode":"api"}"#;
        let decoded: FindResponse = serde_json::from_str(body).expect("decode response");
        assert_eq!(decoded.matches.len(), 1);
        assert_eq!(decoded.matches[0].category, PiiCategory::Email);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_service_unavailable() {
        // Nothing listens on this port; the request must fail fast with
        // ServiceUnavailable rather than any other variant.
        let verifier = HttpVerifier::new("http://127.0.0.1:1", Duration::from_millis(200))
            .expect("build client");
        let result = verifier
            .verify("jane@example.com", &["comm".to_string()], 10)
            .await;
        assert!(matches!(
            result,
            Err(VerifyError::ServiceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_health_check_offline_on_failure() {
        let verifier = HttpVerifier::new("http://127.0.0.1:1", Duration::from_millis(200))
            .expect("build client");
        let status = verifier.health_check().await;
        assert!(!status.online);
        assert_eq!(status.pattern_count, 0);
    }
}
