//! Gupy portal
//!
//! A JSON API: every record of the `data` array already carries the full
//! description, so there is no separate detail fetch.

use super::{DetailSource, ListingPage, Site, SiteAdapter};
use crate::harvest::HarvestContext;
use crate::model::{JobCard, JobDetail};
use crate::search::{encode, Location, RecencyFilter};
use async_trait::async_trait;
use serde::Deserialize;

const BASE_URL: &str = "https://portal.api.gupy.io";

#[derive(Debug, Deserialize)]
struct JobsResponse {
    #[serde(default)]
    data: Vec<GupyJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GupyJob {
    name: Option<String>,
    career_page_name: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    job_url: Option<String>,
}

impl GupyJob {
    fn into_card(self) -> JobCard {
        let location: Vec<String> = [self.city, self.state, self.country]
            .into_iter()
            .flatten()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect();

        JobCard {
            title: self.name,
            company: self.career_page_name,
            location: (!location.is_empty()).then(|| location.join(", ")),
            // ISO timestamp; only the calendar date is kept
            posted_at: self
                .published_date
                .as_deref()
                .and_then(|date| date.split('T').next())
                .map(str::to_string),
            url: self.job_url,
            detail_key: None,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GupyAdapter {
    base_url: String,
}

impl GupyAdapter {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for GupyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteAdapter for GupyAdapter {
    fn site(&self) -> Site {
        Site::Gupy
    }

    fn base_url(&self) -> Option<&str> {
        Some(&self.base_url)
    }

    async fn search_urls(
        &self,
        ctx: &HarvestContext,
        title: &str,
        _location: &Location,
        _recency: RecencyFilter,
    ) -> Vec<String> {
        vec![format!(
            "{}/api/v1/jobs?jobName={}&limit={}&offset=0",
            self.base_url,
            encode(title),
            ctx.settings().card_cap
        )]
    }

    fn parse_listing(&self, body: &str) -> ListingPage {
        match serde_json::from_str::<JobsResponse>(body) {
            Ok(response) => {
                ListingPage::single(response.data.into_iter().map(GupyJob::into_card).collect())
            }
            Err(e) => {
                tracing::warn!("Gupy returned an unreadable listing: {}", e);
                ListingPage::default()
            }
        }
    }

    fn detail_source(&self, _card: &JobCard) -> Option<DetailSource> {
        Some(DetailSource::Embedded)
    }

    fn parse_detail(&self, card: &JobCard, _body: &str) -> Option<JobDetail> {
        card.description.clone().map(JobDetail::with_description)
    }
}
