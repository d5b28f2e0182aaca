use std::time::Duration;

use thiserror::Error;

/// A single page load handed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub url: String,
    pub timeout: Duration,
}

impl LoadRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

/// Events a renderer reports back for its current load.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Progress(f64),
    NavigationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("redirect limit exceeded")]
    RedirectLimitExceeded,
    #[error("response too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for RenderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return RenderError::Timeout;
        }
        if err.is_redirect() {
            return RenderError::RedirectLimitExceeded;
        }
        RenderError::Network(err.to_string())
    }
}
