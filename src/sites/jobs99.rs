//! 99jobs
//!
//! Paginated HTML card list; the posting page carries the description, the
//! title and a "days remaining" subscription widget.

use super::html::{self, select_all, select_first, select_text};
use super::{DetailSource, ListingPage, Site, SiteAdapter};
use crate::harvest::HarvestContext;
use crate::model::{JobCard, JobDetail};
use crate::search::{encode, Location, RecencyFilter};
use async_trait::async_trait;
use scraper::{ElementRef, Html};

const BASE_URL: &str = "https://99jobs.com";

#[derive(Debug, Clone)]
pub struct Jobs99Adapter {
    base_url: String,
}

impl Jobs99Adapter {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<JobCard> {
        let href = card.value().attr("href")?;
        Some(JobCard {
            url: html::absolutize(&self.base_url, href),
            location: select_text(card, "div.opportunity-address"),
            company: select_text(card, "div.opportunity-company-infos h2"),
            ..Default::default()
        })
    }
}

impl Default for Jobs99Adapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Largest page number printed in the pagination widget
fn total_pages(document: &Html) -> Option<u32> {
    select_all(
        document,
        ".pagination a, .pagination li, .pagination span",
    )
    .into_iter()
    .filter_map(|item| html::element_text(item).parse::<u32>().ok())
    .max()
}

#[async_trait]
impl SiteAdapter for Jobs99Adapter {
    fn site(&self) -> Site {
        Site::Jobs99
    }

    fn base_url(&self) -> Option<&str> {
        Some(&self.base_url)
    }

    async fn search_urls(
        &self,
        _ctx: &HarvestContext,
        title: &str,
        location: &Location,
        _recency: RecencyFilter,
    ) -> Vec<String> {
        let mut url = format!(
            "{}/opportunities/filtered_search?utf8=%E2%9C%93&utm_source=tagportal&utm_medium=busca&utm_campaign=home&utm_id=001&search%5Bterm%5D={}",
            self.base_url,
            encode(title)
        );
        if let Some(state) = &location.state {
            url.push_str(&format!("&search%5Bstate%5D={}", encode(state)));
        }
        if let Some(city) = &location.city {
            url.push_str(&format!("&search%5Bcity%5D%5B%5D={}", encode(city)));
        }
        vec![url]
    }

    fn parse_listing(&self, body: &str) -> ListingPage {
        let document = Html::parse_document(body);
        let cards = select_all(&document, "a.opportunity-card")
            .into_iter()
            .filter_map(|card| self.parse_card(card))
            .collect();
        ListingPage {
            cards,
            total_pages: total_pages(&document),
        }
    }

    fn page_url(&self, search_url: &str, page: u32) -> Option<String> {
        Some(format!("{}&page={}", search_url, page))
    }

    fn detail_source(&self, card: &JobCard) -> Option<DetailSource> {
        card.url.clone().map(DetailSource::Page)
    }

    fn parse_detail(&self, _card: &JobCard, body: &str) -> Option<JobDetail> {
        let document = Html::parse_document(body);
        let root = document.root_element();
        let description = select_text(root, "div.opportunities-details")?;

        let side_bar = select_first(root, "div.details");
        let title = side_bar
            .and_then(|bar| select_text(bar, "h2"))
            .or_else(|| select_text(root, "h1"));
        // The widget embeds an "apply" link whose label must not leak into the date
        let posted_at = side_bar
            .and_then(|bar| select_first(bar, "div.subscription-btn"))
            .map(|widget| html::text_without(widget, "a"))
            .filter(|text| !text.is_empty());

        Some(JobDetail {
            description,
            title,
            posted_at,
            ..Default::default()
        })
    }
}
