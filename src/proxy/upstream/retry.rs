use std::time::Duration;
use thiserror::Error;

/// A single failed attempt. Every variant is retried within the call budget.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("invalid proxy {url}: {reason}")]
    Proxy { url: String, reason: String },
}

impl CallError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CallError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Returned once the attempt budget is spent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("request failed after {attempts} attempt(s): {last_error}")]
pub struct CallFailure {
    pub attempts: usize,
    pub last_error: CallError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(retry: &crate::models::RetryConfig) -> Self {
        Self::new(retry.max_attempts, retry.delay())
    }

    pub fn with_attempts(self, max_attempts: usize) -> Self {
        Self::new(max_attempts, self.delay)
    }

    /// Suspends only the calling task between attempts.
    pub async fn pause(&self) {
        if self.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Truncates an upstream error body so it stays readable in a log line.
pub fn preview_body(body: &str) -> String {
    const MAX_PREVIEW_CHARS: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let mut preview: String = trimmed.chars().take(MAX_PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
