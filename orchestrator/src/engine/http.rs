use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::{BootstrapEngine, EngineError};
use crate::types::BootstrapPlan;

/// Structured error body returned by the engine API
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub request_id: Option<String>,
    pub retry_after: Option<u64>,
    pub hint: Option<String>,
}

impl ErrorResponse {
    fn render(&self) -> String {
        let mut msg = self
            .error
            .clone()
            .unwrap_or_else(|| "unknown error".to_string());
        if let Some(code) = &self.error_code {
            msg.push_str(&format!(" (code={})", code));
        }
        if let Some(id) = &self.request_id {
            msg.push_str(&format!(" request_id={}", id));
        }
        if let Some(hint) = &self.hint {
            msg.push_str(&format!(" hint: {}", hint));
        }
        msg
    }
}

#[derive(Debug, Deserialize)]
struct KubeconfigResponse {
    kubeconfig: String,
}

/// Bootstrap engine reached over its HTTP API
///
/// `POST /api/clusters` provisions a cluster from a [`BootstrapPlan`] and
/// `GET /api/clusters/{name}/kubeconfig` returns its credentials.
#[derive(Clone)]
pub struct HttpBootstrapEngine {
    base_url: Url,
    http: reqwest::Client,
    user_agent: String,
    retries: u32,
}

impl HttpBootstrapEngine {
    /// `retries` only applies to the kubeconfig fetch; provisioning is never retried.
    pub fn new(base_url: &str, retries: u32) -> Result<Self, EngineError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| EngineError::Other(format!("invalid engine URL {}: {}", base_url, e)))?;

        // Provisioning can run for a long time, so only connecting is bounded
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("kubeforge/{}", env!("CARGO_PKG_VERSION")),
            retries,
        })
    }

    fn build_url(&self, path: &str) -> Result<Url, EngineError> {
        self.base_url.join(path).map_err(|e| {
            EngineError::Other(format!(
                "failed to join base_url={} with path={}: {}",
                self.base_url, path, e
            ))
        })
    }

    fn kubeconfig_url(&self, cluster_name: &str) -> Result<Url, EngineError> {
        let mut url = self.build_url("/api/clusters")?;
        url.path_segments_mut()
            .map_err(|_| {
                EngineError::Other(format!("engine URL {} cannot carry a path", self.base_url))
            })?
            .push(cluster_name)
            .push("kubeconfig");
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("user-agent", &self.user_agent)
            .header("x-request-id", Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BootstrapEngine for HttpBootstrapEngine {
    async fn create_cluster(&self, plan: &BootstrapPlan) -> Result<(), EngineError> {
        let url = self.build_url("/api/clusters")?;
        info!("Requesting cluster {} from bootstrap engine at {}", plan.cluster_name, url);

        let resp = self.request(Method::POST, url).json(plan).send().await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        Ok(())
    }

    async fn kubeconfig(&self, cluster_name: &str) -> Result<String, EngineError> {
        let url = self.kubeconfig_url(cluster_name)?;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            debug!("HTTP GET {} (attempt {})", url, attempt);

            let resp = self.request(Method::GET, url.clone()).send().await?;
            let status = resp.status();

            if status.is_success() {
                let body = resp.json::<KubeconfigResponse>().await?;
                return Ok(body.kubeconfig);
            }

            let retry_after_header = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            let bytes = resp.bytes().await.unwrap_or_default();
            let err = serde_json::from_slice::<ErrorResponse>(&bytes).ok();

            if attempt <= self.retries && should_retry(status) {
                let sleep_dur = retry_sleep(status, retry_after_header, err.as_ref());
                tokio::time::sleep(sleep_dur).await;
                continue;
            }

            return Err(status_error_from(status, &bytes, err));
        }
    }
}

async fn status_error(resp: Response) -> EngineError {
    let status = resp.status();
    let bytes = resp.bytes().await.unwrap_or_default();
    let err = serde_json::from_slice::<ErrorResponse>(&bytes).ok();
    status_error_from(status, &bytes, err)
}

fn status_error_from(status: StatusCode, bytes: &[u8], err: Option<ErrorResponse>) -> EngineError {
    let message = match err {
        Some(e) => e.render(),
        None => String::from_utf8_lossy(bytes).to_string(),
    };

    EngineError::Status {
        status: status.as_u16(),
        message,
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retry_sleep(
    status: StatusCode,
    retry_after_header: Option<u64>,
    err: Option<&ErrorResponse>,
) -> Duration {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let secs = retry_after_header
            .or_else(|| err.and_then(|e| e.retry_after))
            .unwrap_or(1);
        return Duration::from_secs(secs);
    }
    Duration::from_millis(300)
}
