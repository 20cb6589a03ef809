//! Indeed Brasil
//!
//! Single result list; posting links are rebuilt from the job key carried by
//! the title anchor.

use super::html::{self, select_all, select_attr, select_first, select_text};
use super::{DetailSource, ListingPage, Site, SiteAdapter};
use crate::harvest::HarvestContext;
use crate::model::{JobCard, JobDetail};
use crate::search::{Location, RecencyFilter};
use async_trait::async_trait;
use scraper::{ElementRef, Html};

const BASE_URL: &str = "https://br.indeed.com";

fn query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[derive(Debug, Clone)]
pub struct IndeedAdapter {
    base_url: String,
}

impl IndeedAdapter {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<JobCard> {
        let heading = select_first(card, "h2.jobTitle")?;
        let title = html::element_text(heading);
        if title.is_empty() {
            return None;
        }

        let url = select_attr(heading, "a", "data-jk").map(|jk| {
            let tk = select_attr(heading, "a", "data-mobtk").unwrap_or_default();
            format!(
                "{}/viewjob?jk={}&tk={}&from=serp&vjs=3",
                self.base_url, jk, tk
            )
        });
        // "Posted" label is a visually hidden child of the date span
        let posted_at = select_first(card, "span.date")
            .map(|date| html::text_without(date, "span.visually-hidden"))
            .filter(|text| !text.is_empty());

        Some(JobCard {
            title: Some(title),
            company: select_text(card, "span.companyName"),
            location: select_text(card, "div.companyLocation"),
            posted_at,
            url,
            ..Default::default()
        })
    }
}

impl Default for IndeedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteAdapter for IndeedAdapter {
    fn site(&self) -> Site {
        Site::Indeed
    }

    fn base_url(&self) -> Option<&str> {
        Some(&self.base_url)
    }

    async fn search_urls(
        &self,
        _ctx: &HarvestContext,
        title: &str,
        location: &Location,
        recency: RecencyFilter,
    ) -> Vec<String> {
        let mut url = format!("{}/jobs?q={}", self.base_url, query_value(title));

        let place: Vec<&str> = [location.city.as_deref(), location.state.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !place.is_empty() {
            url.push_str(&format!("&l={}", query_value(&place.join(", "))));
        }
        if let Some(days) = recency.days() {
            url.push_str(&format!("&fromage={}", days));
        }
        vec![url]
    }

    fn parse_listing(&self, body: &str) -> ListingPage {
        let document = Html::parse_document(body);
        let mut items = select_all(&document, "ul.jobsearch-ResultsList > li");
        if items.is_empty() {
            items = select_all(&document, "li");
        }
        ListingPage::single(items.into_iter().filter_map(|li| self.parse_card(li)).collect())
    }

    fn detail_source(&self, card: &JobCard) -> Option<DetailSource> {
        card.url.clone().map(DetailSource::Page)
    }

    fn parse_detail(&self, _card: &JobCard, body: &str) -> Option<JobDetail> {
        let document = Html::parse_document(body);
        let root = document.root_element();
        select_text(root, "#jobDescriptionText")
            .or_else(|| select_text(root, "div.jobDescriptionText"))
            .map(JobDetail::with_description)
    }
}
