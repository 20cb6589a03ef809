//! InfoJobs Brasil
//!
//! Cards live in the filter sidebar of a paginated search page; the page
//! count is printed in a caption. Search URLs need the city resolved to a
//! numeric location id through the site's autocomplete API first.

use super::html::{self, select_all, select_attr, select_first, select_text};
use super::{DetailSource, ListingPage, Site, SiteAdapter};
use crate::harvest::HarvestContext;
use crate::model::{JobCard, JobDetail};
use crate::search::{encode, Location, RecencyFilter};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use serde::Deserialize;

const BASE_URL: &str = "https://www.infojobs.com.br";

#[derive(Debug, Deserialize)]
struct LocationSuggestions {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    data: SuggestionData,
}

#[derive(Debug, Deserialize)]
struct SuggestionData {
    id: serde_json::Value,
}

impl SuggestionData {
    fn id(&self) -> Option<String> {
        match &self.id {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InfoJobsAdapter {
    base_url: String,
}

impl InfoJobsAdapter {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolves a city name to InfoJobs location ids
    pub async fn location_ids(&self, ctx: &HarvestContext, city: &str) -> Vec<String> {
        let url = format!(
            "{}/mf-publicarea/api/autocompleteapi/locations?query={}",
            self.base_url,
            encode(city)
        );
        let Some(found) = ctx.get_json::<LocationSuggestions>(&url).await else {
            return Vec::new();
        };
        found
            .suggestions
            .iter()
            .filter_map(|suggestion| suggestion.data.id())
            .collect()
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<JobCard> {
        let title = select_text(card, "h2.h3")?;
        Some(JobCard {
            title: Some(title),
            posted_at: select_text(card, r#"div[class="text-medium small"]"#),
            url: select_attr(card, "div.py-16", "data-href")
                .map(|href| format!("{}{}", self.base_url, href)),
            location: select_text(card, r#"div[class="small text-medium mr-24"]"#),
            company: select_text(card, "a.text-body.text-decoration-none"),
            ..Default::default()
        })
    }
}

impl Default for InfoJobsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// "1 de 12" style caption: the last token is the page count
fn total_pages(document: &Html) -> Option<u32> {
    let resume = select_all(document, "#resumeVacancies").into_iter().next()?;
    let caption = select_first(resume, "div.col-auto.caption")?;
    html::element_text(caption)
        .split_whitespace()
        .last()?
        .parse()
        .ok()
}

#[async_trait]
impl SiteAdapter for InfoJobsAdapter {
    fn site(&self) -> Site {
        Site::InfoJobs
    }

    fn base_url(&self) -> Option<&str> {
        Some(&self.base_url)
    }

    async fn search_urls(
        &self,
        ctx: &HarvestContext,
        title: &str,
        location: &Location,
        _recency: RecencyFilter,
    ) -> Vec<String> {
        let mut url = format!(
            "{}/empregos.aspx?palabra={}",
            self.base_url,
            encode(title).replace("%20", "+")
        );
        if let Some(city) = &location.city {
            match self.location_ids(ctx, city).await.into_iter().next() {
                Some(id) => url.push_str(&format!("&poblacion={}", id)),
                None => tracing::warn!("InfoJobs has no location id for '{}'", city),
            }
        }
        vec![url]
    }

    fn parse_listing(&self, body: &str) -> ListingPage {
        let document = Html::parse_document(body);
        let cards = select_all(&document, "#filterSideBar div.card")
            .into_iter()
            .filter_map(|card| self.parse_card(card))
            .collect();
        ListingPage {
            cards,
            total_pages: total_pages(&document),
        }
    }

    fn page_url(&self, search_url: &str, page: u32) -> Option<String> {
        let separator = if search_url.contains('?') { '&' } else { '?' };
        Some(format!("{}{}page={}", search_url, separator, page))
    }

    fn detail_source(&self, card: &JobCard) -> Option<DetailSource> {
        card.url.clone().map(DetailSource::Page)
    }

    fn parse_detail(&self, _card: &JobCard, body: &str) -> Option<JobDetail> {
        let document = Html::parse_document(body);
        select_text(document.root_element(), "div.js_vacancyDataPanels")
            .map(JobDetail::with_description)
    }
}
