//! KuCoin REST transport.
//!
//! One `get` is one logical HTTP call. No retries: backoff is the caller's
//! concern, and a failed call surfaces as a `TransportError`.

use super::signer;
use super::KuCoinOptions;
use crate::credentials::Credentials;
use crate::importer::TransportError;
use chrono::Utc;
use std::time::Duration;

/// Raw GET access to the KuCoin REST API.
///
/// Returns the response body of a 2xx reply; interpreting it is the
/// importer's job, so malformed payloads stay distinguishable from transport
/// failures.
pub trait KuCoinTransport: Send + Sync {
    /// Public endpoints pass `None` for `credentials`.
    fn get(
        &self,
        credentials: Option<&Credentials>,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<String, TransportError>;
}

/// Join query parameters in the given order.
///
/// KuCoin symbols and numeric parameters need no percent-encoding; the
/// string is signed byte-for-byte as sent.
pub fn build_endpoint(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let qs = query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{qs}")
}

/// `reqwest::blocking` transport with KuCoin request signing.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(options: &KuCoinOptions) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(concat!("tradexport/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl KuCoinTransport for HttpTransport {
    fn get(
        &self,
        credentials: Option<&Credentials>,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<String, TransportError> {
        let endpoint = build_endpoint(path, query);
        let url = format!("{}{endpoint}", self.base_url);

        let mut request = self.client.get(&url);
        if let Some(credentials) = credentials {
            let now_ms = Utc::now().timestamp_millis();
            for (name, value) in signer::auth_headers(credentials, now_ms, "GET", &endpoint) {
                request = request.header(name, value);
            }
        }

        tracing::debug!(%endpoint, "GET");
        let resp = request
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| TransportError::Network(format!("failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                body: truncate(&body, 256),
            });
        }
        Ok(body)
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
