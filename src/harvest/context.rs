//! Shared per-harvest context handed to every adapter
//!
//! The context bundles the collaborators an adapter needs (fetcher, deadline,
//! politeness pacer, global permit pool, scorer) and exposes one checkpointed
//! fetch path. Adapters never touch the network any other way, which keeps
//! the deadline, pacing and concurrency rules in a single place.

use crate::config::Config;
use crate::fetch::{FetchRequest, Fetcher};
use crate::harvest::{Deadline, HostPacer};
use crate::scoring::Scorer;
use crate::search::RecencyFilter;
use crate::HarvestError;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Limits and options that shape one adapter run
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    /// Maximum cards processed per search URL
    pub card_cap: usize,
    /// Concurrent listing fetches
    pub listing_workers: usize,
    /// Cap on the sqrt-scaled detail pool
    pub max_detail_workers: usize,
    /// Post-hoc filter applied to cards before their detail fetch
    pub recency: RecencyFilter,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Keep raw descriptions on the emitted postings
    pub include_descriptions: bool,
}

impl AdapterSettings {
    pub fn from_config(config: &Config, recency: RecencyFilter) -> Self {
        Self {
            card_cap: config.harvest.card_cap,
            listing_workers: config.harvest.listing_workers,
            max_detail_workers: config.harvest.max_detail_workers,
            recency,
            request_timeout: Duration::from_secs(config.http.timeout_secs),
            include_descriptions: config.output.include_descriptions,
        }
    }
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self::from_config(&Config::default(), RecencyFilter::Any)
    }
}

/// Everything an adapter shares with the rest of one harvest
#[derive(Clone)]
pub struct HarvestContext {
    fetcher: Arc<dyn Fetcher>,
    deadline: Deadline,
    pacer: Arc<HostPacer>,
    permits: Arc<Semaphore>,
    keywords: Arc<[String]>,
    scorer: Scorer,
    settings: Arc<AdapterSettings>,
    today: NaiveDate,
}

impl HarvestContext {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        deadline: Deadline,
        pacer: Arc<HostPacer>,
        permits: Arc<Semaphore>,
        keywords: Vec<String>,
        scorer: Scorer,
        settings: AdapterSettings,
    ) -> Self {
        Self {
            fetcher,
            deadline,
            pacer,
            permits,
            keywords: keywords.into(),
            scorer,
            settings: Arc::new(settings),
            today: chrono::Local::now().date_naive(),
        }
    }

    /// A context with no pacing and default settings, for tests and tools
    pub fn standalone(fetcher: Arc<dyn Fetcher>, keywords: Vec<String>) -> Self {
        Self::new(
            fetcher,
            Deadline::new(),
            Arc::new(HostPacer::new(Duration::ZERO)),
            Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)),
            keywords,
            Scorer::default(),
            AdapterSettings::default(),
        )
    }

    /// Replaces the reference date used to classify posted-at strings
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_settings(mut self, settings: AdapterSettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_expired()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// GET `url` and return the body of a 2xx response
    pub async fn get(&self, url: &str) -> Option<String> {
        self.fetch(FetchRequest::get(url)).await
    }

    /// POST `form` to `url` and return the body of a 2xx response
    pub async fn post_form(&self, url: &str, form: Vec<(String, String)>) -> Option<String> {
        self.fetch(FetchRequest::post_form(url, form)).await
    }

    /// GET `url` and decode a 2xx JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let request = FetchRequest::get(url).with_header("Accept", "application/json");
        let body = self.fetch(request).await?;
        decode_json(url, &body)
    }

    /// Runs one request through the deadline, pacing and permit checkpoints
    ///
    /// Returns `None` when the deadline has fired, on transport errors and on
    /// non-2xx statuses; failures are logged and never propagated.
    pub async fn fetch(&self, request: FetchRequest) -> Option<String> {
        if self.is_expired() {
            tracing::debug!("Deadline expired, skipping {}", request.url);
            return None;
        }

        if !self.pacer.wait_turn(&request.host(), &self.deadline).await {
            tracing::debug!("Deadline expired while pacing, skipping {}", request.url);
            return None;
        }

        let request = request.with_timeout(self.settings.request_timeout);
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::warn!("Fetch permits closed, skipping {}", request.url);
                return None;
            }
        };

        tracing::debug!("Fetching {}", request.url);
        match self.fetcher.fetch(&request).await {
            Ok(response) if response.is_success() => Some(response.body),
            Ok(response) => {
                let error = HarvestError::Status {
                    url: request.url.clone(),
                    status: response.status,
                };
                tracing::warn!("{}", error);
                None
            }
            Err(e) => {
                tracing::warn!("Fetch failed: {}", e);
                None
            }
        }
    }
}

/// Decodes a JSON body, logging instead of failing
pub(crate) fn decode_json<T: DeserializeOwned>(url: &str, body: &str) -> Option<T> {
    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(source) => {
            let error = HarvestError::Json {
                url: url.to_string(),
                source,
            };
            tracing::warn!("{}", error);
            None
        }
    }
}
