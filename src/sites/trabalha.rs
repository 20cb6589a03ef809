//! Trabalha Brasil

use super::html::{select_all, select_text, select_texts};
use super::{DetailSource, ListingPage, Site, SiteAdapter};
use crate::harvest::HarvestContext;
use crate::model::{JobCard, JobDetail};
use crate::search::{encode, slugify, Location, RecencyFilter};
use async_trait::async_trait;
use scraper::{ElementRef, Html};

const BASE_URL: &str = "https://www.trabalhabrasil.com.br";

#[derive(Debug, Clone)]
pub struct TrabalhaAdapter {
    base_url: String,
}

impl TrabalhaAdapter {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<JobCard> {
        let title = select_text(card, "h2.job__name")?;
        // Several detail lines per card; the location is always the last one
        let location = select_texts(card, "h3.job__detail").pop();

        Some(JobCard {
            title: Some(title),
            company: select_text(card, "h3.job__company"),
            location,
            url: card
                .value()
                .attr("href")
                .map(|href| format!("{}{}", self.base_url, href.trim())),
            ..Default::default()
        })
    }
}

impl Default for TrabalhaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteAdapter for TrabalhaAdapter {
    fn site(&self) -> Site {
        Site::TrabalhaBrasil
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
        let place: Vec<String> = [&location.city, &location.state]
            .into_iter()
            .flatten()
            .map(|part| slugify(part))
            .filter(|part| !part.is_empty())
            .collect();

        let url = if place.is_empty() {
            format!("{}/vagas-empregos/{}", self.base_url, encode(title))
        } else {
            format!(
                "{}/vagas-empregos-em-{}/{}",
                self.base_url,
                place.join("-"),
                encode(title)
            )
        };
        vec![url]
    }

    fn parse_listing(&self, body: &str) -> ListingPage {
        let document = Html::parse_document(body);
        let cards = select_all(&document, "div#jobs-wrapper a.job__vacancy")
            .into_iter()
            .filter_map(|card| self.parse_card(card))
            .collect();
        ListingPage::single(cards)
    }

    fn detail_source(&self, card: &JobCard) -> Option<DetailSource> {
        card.url.clone().map(DetailSource::Page)
    }

    fn parse_detail(&self, _card: &JobCard, body: &str) -> Option<JobDetail> {
        let document = Html::parse_document(body);
        select_text(document.root_element(), "div.jobview__info")
            .map(JobDetail::with_description)
    }
}
