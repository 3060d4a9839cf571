use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::auth::Token;
use crate::error::{ExportError, Result};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("gha-timings/", env!("CARGO_PKG_VERSION"));

/// Read access to a JSON REST API.
///
/// `path` is relative to the API base (`repos/o/r/actions/runs/1`); `params`
/// are appended as the query string. Implementations return the parsed body
/// or fail with `ExportError::Fetch` on transport errors and non-2xx status.
pub trait ApiClient {
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value>;
}

/// GitHub REST API client.
///
/// One request at a time, no retries and no timeout beyond reqwest's
/// defaults; the first failure aborts the export.
pub struct GitHubClient {
    client: Client,
    api_url: Url,
}

impl GitHubClient {
    /// Create a client for `base_url` (e.g. `https://api.github.com`).
    ///
    /// Without a token requests go out unauthenticated, which is enough for
    /// public repositories within the anonymous rate limit.
    pub fn new(base_url: &str, token: Option<&Token>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        if let Some(token) = token {
            let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|e| ExportError::Config(format!("Invalid token: {e}")))?;
            bearer.set_sensitive(true);
            headers.insert(AUTHORIZATION, bearer);
            headers.insert(
                HeaderName::from_static("x-github-api-version"),
                HeaderValue::from_static(API_VERSION),
            );
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| ExportError::Config(format!("Failed to create HTTP client: {e}")))?;

        // `Url::join` drops the last segment unless the base ends with '/'
        let base = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let api_url = Url::parse(&base)
            .map_err(|e| ExportError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self { client, api_url })
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = self
            .api_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ExportError::Config(format!("Invalid API path {path}: {e}")))?;

        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

impl ApiClient for GitHubClient {
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = self.endpoint(path, params)?;
        debug!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ExportError::Fetch {
                endpoint: url.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::Fetch {
                endpoint: url.to_string(),
                detail: format!("HTTP {}: {}", status.as_u16(), error_message(&body)),
            });
        }

        response.json().await.map_err(|e| ExportError::Parse {
            endpoint: url.to_string(),
            detail: e.to_string(),
        })
    }
}

/// GitHub error bodies look like `{"message": "Not Found", ...}`; fall back
/// to the raw text for anything else.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}
