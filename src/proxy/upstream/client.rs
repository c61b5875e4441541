// Outbound call executor for the quest API.
// Every attempt builds its own client so a proxy binding never leaks between accounts.

use super::retry::{preview_body, CallError, CallFailure, RetryPolicy};
use reqwest::{header::HeaderMap, Client, Method};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CallRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub proxy: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl CallRequest {
    pub fn new(method: Method, url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            proxy: None,
            timeout,
            retry,
        }
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn proxy(mut self, proxy: Option<&str>) -> Self {
        self.proxy = proxy.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallExecutor;

impl CallExecutor {
    pub fn new() -> Self {
        Self
    }

    fn build_client(request: &CallRequest) -> Result<Client, CallError> {
        let builder = Client::builder()
            .timeout(request.timeout)
            .connect_timeout(request.timeout)
            .pool_max_idle_per_host(0);

        let builder = match request.proxy.as_deref() {
            Some(url) => {
                let proxy = reqwest::Proxy::all(url).map_err(|e| CallError::Proxy {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
                builder.proxy(proxy)
            }
            // Never fall back to HTTP(S)_PROXY from the environment.
            None => builder.no_proxy(),
        };

        builder
            .build()
            .map_err(|e| CallError::Transport(format!("failed to build client: {}", e)))
    }

    async fn attempt(request: &CallRequest) -> Result<Value, CallError> {
        let client = Self::build_client(request)?;
        let mut builder = client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CallError::Status {
                status: status.as_u16(),
                body: preview_body(&text),
            });
        }

        serde_json::from_str::<Value>(&text).map_err(|e| CallError::Decode(e.to_string()))
    }

    /// Runs the request until it yields a JSON body or the attempt budget is spent.
    pub async fn execute(&self, request: CallRequest) -> Result<Value, CallFailure> {
        self.execute_map(request, Ok).await
    }

    /// Like [`execute`](Self::execute), but `extract` also runs inside the retry
    /// loop, so a body missing required fields consumes an attempt.
    pub async fn execute_map<T, F>(&self, request: CallRequest, extract: F) -> Result<T, CallFailure>
    where
        F: Fn(Value) -> Result<T, CallError>,
    {
        let max_attempts = request.retry.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match Self::attempt(&request).await.and_then(&extract) {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(
                            "[Upstream] {} {} succeeded on attempt {}/{}",
                            request.method,
                            request.url,
                            attempt,
                            max_attempts
                        );
                    }
                    return Ok(value);
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::warn!(
                        "[Upstream] {} {} failed after {} attempt(s): {}",
                        request.method,
                        request.url,
                        attempt,
                        e
                    );
                    return Err(CallFailure {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        "[Upstream] {} {} attempt {}/{} failed: {}, retrying in {:?}",
                        request.method,
                        request.url,
                        attempt,
                        max_attempts,
                        e,
                        request.retry.delay
                    );
                    request.retry.pause().await;
                }
            }
        }
    }
}
