//! LinkedIn public job search
//!
//! Single listing page from the guest search, one posting page per card.

use super::html::{self, select_all, select_attr, select_text};
use super::{DetailSource, ListingPage, Site, SiteAdapter};
use crate::harvest::HarvestContext;
use crate::model::{JobCard, JobDetail};
use crate::search::{encode, Location, RecencyFilter};
use async_trait::async_trait;
use scraper::{ElementRef, Html};

const BASE_URL: &str = "https://www.linkedin.com";

#[derive(Debug, Clone)]
pub struct LinkedInAdapter {
    base_url: String,
}

impl LinkedInAdapter {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<JobCard> {
        let title = select_text(card, "h3.base-search-card__title")?;
        Some(JobCard {
            title: Some(title),
            company: select_text(card, "h4.base-search-card__subtitle"),
            location: select_text(card, "span.job-search-card__location"),
            posted_at: select_text(card, "time"),
            url: select_attr(card, "a[href]", "href")
                .and_then(|href| html::absolutize(&self.base_url, &href)),
            ..Default::default()
        })
    }
}

impl Default for LinkedInAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteAdapter for LinkedInAdapter {
    fn site(&self) -> Site {
        Site::LinkedIn
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
        let mut url = format!(
            "{}/jobs/search?keywords={}&location={}",
            self.base_url,
            encode(title),
            encode(&location.raw)
        );
        if let Some(seconds) = recency.seconds() {
            url.push_str(&format!("&f_TPR=r{}", seconds));
        }
        url.push_str("&position=1&pageNum=0");
        vec![url]
    }

    fn parse_listing(&self, body: &str) -> ListingPage {
        let document = Html::parse_document(body);
        let mut items = select_all(&document, "ul.jobs-search__results-list li");
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
        select_text(root, "div.show-more-less-html__markup")
            .or_else(|| select_text(root, "div.description__text"))
            .map(JobDetail::with_description)
    }
}
