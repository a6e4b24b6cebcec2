use commonware_codec::{DecodeExt, Encode};
use commonware_utils::hex;
use reqwest::{Client as HttpClient, Response, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use url::Url;
use wildlink_types::{Request, RequestEnvelope, ResponseEnvelope, MAX_BATCH_REQUESTS};

use crate::{
    dispatch::{DispatchError, Dispatcher},
    Error, Result,
};

/// Timeout for connections and requests
const TIMEOUT: Duration = Duration::from_secs(30);

/// Retry policy for transient HTTP failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per batch (including the first attempt).
    pub max_attempts: usize,
    /// Initial backoff delay after the first retryable failure.
    pub initial_backoff: Duration,
    /// Maximum backoff delay between attempts.
    pub max_backoff: Duration,
    /// Whether batches that commit server state may be retried.
    pub retry_non_idempotent: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
            retry_non_idempotent: false,
        }
    }
}

/// Dispatcher that posts batches to `{base}/rpc`.
#[derive(Clone)]
pub struct HttpDispatcher {
    pub base_url: Url,
    pub http_client: HttpClient,

    rpc_url: Url,
    auth_token: Option<String>,
    retry_policy: RetryPolicy,
}

impl HttpDispatcher {
    #[allow(clippy::result_large_err)]
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidScheme(scheme.to_string())),
        }
        let mut rpc_base = base_url.clone();
        if !rpc_base.path().ends_with('/') {
            let path = format!("{}/", rpc_base.path());
            rpc_base.set_path(&path);
        }
        let rpc_url = rpc_base.join("rpc")?;

        let http_client = HttpClient::builder()
            .timeout(TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            http_client,
            rpc_url,
            auth_token: None,
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Returns a new dispatcher that sends `token` as a bearer credential.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Returns a copy of the current retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Returns a new dispatcher with the provided retry policy.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    async fn post_with_retry(
        &self,
        body: Vec<u8>,
        idempotent: bool,
    ) -> std::result::Result<Response, reqwest::Error> {
        let max_attempts = if idempotent || self.retry_policy.retry_non_idempotent {
            self.retry_policy.max_attempts.max(1)
        } else {
            1
        };
        let mut attempt = 0usize;
        let mut backoff = self.retry_policy.initial_backoff;
        loop {
            attempt += 1;
            let mut request = self.http_client.post(self.rpc_url.clone()).body(body.clone());
            if let Some(token) = &self.auth_token {
                request = request.bearer_auth(token);
            }
            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if !is_retryable_status(status) || attempt >= max_attempts {
                        return Ok(response);
                    }
                    debug!(%status, attempt, "retrying batch");
                }
                Err(err) => {
                    if attempt >= max_attempts || !is_retryable_error(&err) {
                        return Err(err);
                    }
                    debug!(?err, attempt, "retrying batch");
                }
            }

            if backoff > Duration::ZERO {
                sleep(backoff).await;
                backoff = std::cmp::min(backoff.saturating_mul(2), self.retry_policy.max_backoff);
            }
        }
    }
}

impl Dispatcher for HttpDispatcher {
    async fn send(&self, batch: Vec<Request>) -> std::result::Result<Vec<Vec<u8>>, DispatchError> {
        if batch.len() > MAX_BATCH_REQUESTS {
            return Err(DispatchError::TooManyRequests {
                got: batch.len(),
                max: MAX_BATCH_REQUESTS,
            });
        }
        let idempotent = batch.iter().all(|request| request.kind().is_idempotent());
        let body = RequestEnvelope { requests: batch }.encode().to_vec();
        debug!(url = %self.rpc_url, bytes = body.len(), idempotent, "posting batch");

        let response = self
            .post_with_retry(body, idempotent)
            .await
            .map_err(|err| DispatchError::Transport(err.to_string()))?;
        match response.status() {
            StatusCode::OK => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|err| DispatchError::Transport(err.to_string()))?;
                let envelope = ResponseEnvelope::decode(bytes.as_ref()).map_err(|err| {
                    debug!(body = %hex(bytes.as_ref()), "undecodable response envelope");
                    DispatchError::Transport(format!("invalid response envelope: {err}"))
                })?;
                Ok(envelope.into_payloads())
            }
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                Err(DispatchError::Auth(format!("server returned {status}")))
            }
            status => Err(DispatchError::Transport(format!("server returned {status}"))),
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            HttpDispatcher::new("ws://localhost:8080"),
            Err(Error::InvalidScheme(scheme)) if scheme == "ws"
        ));
        assert!(matches!(HttpDispatcher::new("not a url"), Err(Error::Url(_))));
    }

    #[test]
    fn test_rpc_url() {
        let dispatcher = HttpDispatcher::new("http://127.0.0.1:8080/").unwrap();
        assert_eq!(dispatcher.rpc_url.as_str(), "http://127.0.0.1:8080/rpc");
        assert_eq!(dispatcher.retry_policy(), RetryPolicy::default());

        let dispatcher = HttpDispatcher::new("http://127.0.0.1:8080/api").unwrap();
        assert_eq!(dispatcher.rpc_url.as_str(), "http://127.0.0.1:8080/api/rpc");
        assert_eq!(dispatcher.base_url.as_str(), "http://127.0.0.1:8080/api");

        let dispatcher = HttpDispatcher::new("https://example.com/api/").unwrap();
        assert_eq!(dispatcher.rpc_url.as_str(), "https://example.com/api/rpc");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::OK));
    }
}
