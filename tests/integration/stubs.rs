//! Stub fetchers and HTML fixtures shared by the integration tests

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use vaga_harvest::config::Config;
use vaga_harvest::fetch::{FetchRequest, FetchResponse, Fetcher};
use vaga_harvest::HarvestError;

/// What a stub route answers with
#[derive(Debug, Clone)]
pub enum Reply {
    Body(String),
    Status(u16),
    Fail,
}

/// Fetcher answering from URL-fragment routes and recording every call
///
/// Routes are tried in insertion order; the first fragment contained in the
/// requested URL wins. Unrouted URLs get a 404.
#[derive(Default)]
pub struct StubFetcher {
    routes: Vec<(String, Reply)>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, fragment: &str, reply: Reply) -> Self {
        self.routes.push((fragment.to_string(), reply));
        self
    }

    pub fn body(self, fragment: &str, body: impl Into<String>) -> Self {
        self.route(fragment, Reply::Body(body.into()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, HarvestError> {
        self.calls.lock().unwrap().push(request.url.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let reply = self
            .routes
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or(Reply::Status(404));

        match reply {
            Reply::Body(body) => Ok(FetchResponse { status: 200, body }),
            Reply::Status(status) => Ok(FetchResponse {
                status,
                body: String::new(),
            }),
            Reply::Fail => Err(HarvestError::Timeout {
                url: request.url.clone(),
            }),
        }
    }
}

/// Default config without politeness pacing
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.harvest.politeness_delay_ms = 0;
    config
}

/// A LinkedIn guest search page with one card per (title, url)
pub fn linkedin_listing(jobs: &[(&str, &str)]) -> String {
    let items: String = jobs
        .iter()
        .map(|(title, url)| {
            format!(
                r#"<li>
                    <a class="base-card__full-link" href="{url}">view</a>
                    <h3 class="base-search-card__title">{title}</h3>
                    <h4 class="base-search-card__subtitle">Acme</h4>
                    <span class="job-search-card__location">São Paulo, SP</span>
                    <time>1 day ago</time>
                </li>"#
            )
        })
        .collect();
    format!(r#"<html><body><ul class="jobs-search__results-list">{items}</ul></body></html>"#)
}

/// A LinkedIn posting page
pub fn linkedin_detail(description: &str) -> String {
    format!(
        r#"<html><body><div class="show-more-less-html__markup">{description}</div></body></html>"#
    )
}

/// A 99jobs listing page with one card per href
pub fn jobs99_listing(hrefs: &[&str]) -> String {
    let cards: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<a class="opportunity-card" href="{href}">
                    <div class="opportunity-company-infos"><h2>Beta</h2></div>
                    <div class="opportunity-address">Curitiba - PR</div>
                </a>"#
            )
        })
        .collect();
    format!("<html><body>{cards}</body></html>")
}

/// A 99jobs posting page
pub fn jobs99_detail(title: &str, description: &str) -> String {
    format!(
        r#"<html><body>
            <div class="details"><h2>{title}</h2>
              <div class="subscription-btn">Faltam 5 dias <a href="/apply">Candidatar</a></div>
            </div>
            <div class="opportunities-details">{description}</div>
        </body></html>"#
    )
}
