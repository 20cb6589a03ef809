//! URL-fetch capability used by the harvest core
//!
//! The core never talks to an HTTP library directly: every request goes
//! through the [`Fetcher`] trait so tests can stub the network and the
//! binary can plug in the reqwest-backed [`HttpFetcher`].

mod http;

pub use http::{build_http_client, HttpFetcher};

use crate::HarvestError;
use async_trait::async_trait;
use std::time::Duration;

/// Request method, with the form body for POST requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMethod {
    Get,
    /// `application/x-www-form-urlencoded` POST
    PostForm(Vec<(String, String)>),
}

/// A single outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: FetchMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl FetchRequest {
    /// A GET request with the default timeout and no extra headers
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: FetchMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            timeout: Duration::from_secs(10),
        }
    }

    /// A form POST request with the default timeout
    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: FetchMethod::PostForm(form),
            ..Self::get(url)
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Host part of the URL, used for politeness pacing
    pub fn host(&self) -> String {
        ::url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_default()
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches a URL and returns its status and body
///
/// Implementations report transport failures as errors; non-2xx statuses are
/// returned as ordinary responses so callers decide how to treat them.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, HarvestError>;
}
