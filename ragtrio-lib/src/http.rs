//! Blocking HTTP plumbing shared by the hosted service clients.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Result};

/// Build a client that sends `Authorization: Bearer <api_key>` on every request.
pub(crate) fn bearer_client(service: &str, api_key: &str, timeout: Duration) -> Result<Client> {
    if api_key.trim().is_empty() {
        return Err(Error::Config(format!("missing {service} API key")));
    }

    let mut headers = HeaderMap::new();
    let auth = format!("Bearer {}", api_key.trim());
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth)
            .map_err(|_| Error::Config(format!("invalid {service} API key")))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Config(format!("failed to build {service} HTTP client: {e}")))
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// POST a JSON body and decode a JSON response.
///
/// Transport failures, non-success statuses and undecodable bodies all come
/// back as a message; callers wrap it in the error variant for their service.
pub(crate) fn post_json<B, R>(client: &Client, url: &str, body: &B) -> std::result::Result<R, String>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let resp = client
        .post(url)
        .json(body)
        .send()
        .map_err(|e| format!("request to {url} failed: {e}"))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp
            .text()
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        return Err(format!("{url} returned {status}: {text}"));
    }

    resp.json()
        .map_err(|e| format!("failed to parse response from {url}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/", "/embeddings"),
            "https://api.openai.com/v1/embeddings"
        );
        assert_eq!(
            endpoint("https://api.cohere.com/v1", "rerank"),
            "https://api.cohere.com/v1/rerank"
        );
    }

    #[test]
    fn test_blank_key_is_config_error() {
        let err = bearer_client("OpenAI", "   ", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_key_with_newline_is_rejected() {
        let err = bearer_client("Cohere", "abc\ndef", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
