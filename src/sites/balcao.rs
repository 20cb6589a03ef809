//! Balcão de Empregos
//!
//! Cards are positional panels inside a fieldset; the public posting link is
//! only present inside an HTML comment of the card. Descriptions come from a
//! JSON endpoint queried with a form POST keyed by the card's job id.

use super::html::{self, direct_children, select_all};
use super::{DetailSource, ListingPage, Site, SiteAdapter};
use crate::harvest::HarvestContext;
use crate::model::{JobCard, JobDetail};
use crate::search::{encode, slugify, Location, RecencyFilter};
use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use std::sync::OnceLock;

const BASE_URL: &str = "https://www.balcaodeempregos.com.br";

fn href_regex() -> &'static Regex {
    static HREF: OnceLock<Regex> = OnceLock::new();
    HREF.get_or_init(|| Regex::new(r#"href="(.+?)""#).expect("href pattern is valid"))
}

#[derive(Debug, Deserialize)]
struct VagaResponse {
    vaga: Vaga,
}

#[derive(Debug, Deserialize)]
struct Vaga {
    #[serde(rename = "Descricao")]
    descricao: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BalcaoAdapter {
    base_url: String,
}

impl BalcaoAdapter {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Reads a card from its positional sections
    ///
    /// 0: title and posted date, 1: location prefixed by a label,
    /// 3: company and the commented-out posting link.
    fn parse_card(&self, card: ElementRef<'_>) -> Option<JobCard> {
        let sections = direct_children(card, "div");
        let heading = direct_children(*sections.first()?, "div");
        let title = heading
            .first()
            .map(|el| html::element_text(*el))
            .filter(|text| !text.is_empty())?;
        let posted_at = heading
            .get(1)
            .and_then(|el| html::select_text(*el, "strong"));

        let location = sections.get(1).map(|el| {
            let text = html::element_text(*el);
            text.split(' ').skip(1).collect::<Vec<_>>().join(" ")
        });

        let details = sections.get(3);
        let company = details.and_then(|el| company_name(*el));
        let url = details
            .and_then(|el| html::first_comment(*el))
            .and_then(|comment| {
                href_regex()
                    .captures(&comment)
                    .map(|caps| format!("{}{}", self.base_url, &caps[1]))
            });

        Some(JobCard {
            title: Some(title),
            company,
            location: location.filter(|text| !text.is_empty()),
            posted_at,
            url,
            detail_key: card.value().attr("id-vaga").map(|id| id.trim().to_string()),
            description: None,
        })
    }
}

impl Default for BalcaoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// The span following the first label of the details block
fn company_name(details: ElementRef<'_>) -> Option<String> {
    let block = direct_children(details, "div").into_iter().next()?;
    let label = direct_children(block, "strong").into_iter().next()?;
    label
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "span")
        .map(html::element_text)
        .filter(|text| !text.is_empty())
}

#[async_trait]
impl SiteAdapter for BalcaoAdapter {
    fn site(&self) -> Site {
        Site::BalcaoDeEmpregos
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
        let place = location
            .city
            .as_deref()
            .or(location.state.as_deref())
            .unwrap_or_default();
        vec![format!(
            "{}/vagas-por-cargo/{}?criterio={}&cidadeEstado={}",
            self.base_url,
            slugify(title),
            encode(title),
            encode(place)
        )]
    }

    fn parse_listing(&self, body: &str) -> ListingPage {
        let document = Html::parse_document(body);
        let cards: Vec<JobCard> = select_all(&document, "fieldset")
            .into_iter()
            .next()
            .map(|fieldset| {
                html::selector("div.panel-body.panel-vaga.link-draw-vaga")
                    .map(|selector| {
                        fieldset
                            .select(&selector)
                            .filter_map(|card| self.parse_card(card))
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        let total_pages = select_all(&document, "ul.pagination")
            .into_iter()
            .next()
            .map(|pagination| direct_children(pagination, "li").len() as u32)
            .filter(|count| *count > 0);

        ListingPage { cards, total_pages }
    }

    fn page_url(&self, search_url: &str, page: u32) -> Option<String> {
        search_url
            .contains('?')
            .then(|| search_url.replacen('?', &format!("?pagina={}&", page), 1))
    }

    fn detail_source(&self, card: &JobCard) -> Option<DetailSource> {
        let id = card.detail_key.clone()?;
        Some(DetailSource::Form {
            url: format!("{}/Vaga/GetVagaById", self.base_url),
            form: vec![("id".to_string(), id)],
        })
    }

    fn parse_detail(&self, _card: &JobCard, body: &str) -> Option<JobDetail> {
        let url = format!("{}/Vaga/GetVagaById", self.base_url);
        let response: VagaResponse = crate::harvest::decode_json(&url, body)?;
        let raw = response.vaga.descricao?;
        // The endpoint returns HTML markup inside the JSON string
        let fragment = Html::parse_fragment(&raw);
        let description = html::element_text(fragment.root_element());
        (!description.is_empty()).then(|| JobDetail::with_description(description))
    }
}
