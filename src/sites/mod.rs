//! Site adapters
//!
//! Every job board is handled by one [`SiteAdapter`]. The trait carries the
//! shared template (paginated listing fetch, detail fetch, posting assembly)
//! as default methods; a concrete adapter only supplies the site-specific
//! pieces: how to build a search URL, how to read cards out of a listing page,
//! where a card's detail lives and how to read it.
//!
//! [`run_adapter`] drives one adapter over its batch of search URLs with the
//! nested fan-out (listing pool, then a sqrt-scaled detail pool per card
//! group) under the harvest's deadline.

pub mod html;

mod balcao;
mod gupy;
mod indeed;
mod infojobs;
mod jobs99;
mod linkedin;
mod trabalha;

pub use balcao::BalcaoAdapter;
pub use gupy::GupyAdapter;
pub use indeed::IndeedAdapter;
pub use infojobs::InfoJobsAdapter;
pub use jobs99::Jobs99Adapter;
pub use linkedin::LinkedInAdapter;
pub use trabalha::TrabalhaAdapter;

use crate::harvest::HarvestContext;
use crate::model::{
    HarvestOutcome, JobCard, JobDetail, JobPosting, COMPANY_FALLBACK, LOCATION_FALLBACK,
    POSTED_AT_FALLBACK,
};
use crate::scoring::classify_posted_at;
use crate::search::{Location, RecencyFilter};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

/// Supported job boards
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Site {
    LinkedIn,
    Jobs99,
    InfoJobs,
    Gupy,
    TrabalhaBrasil,
    BalcaoDeEmpregos,
    Indeed,
}

impl Site {
    /// Every supported site, in partition order
    pub fn all() -> [Site; 7] {
        [
            Site::LinkedIn,
            Site::Jobs99,
            Site::InfoJobs,
            Site::Gupy,
            Site::TrabalhaBrasil,
            Site::BalcaoDeEmpregos,
            Site::Indeed,
        ]
    }

    /// Short lowercase name, also accepted by `--site`
    pub fn name(&self) -> &'static str {
        match self {
            Site::LinkedIn => "linkedin",
            Site::Jobs99 => "99jobs",
            Site::InfoJobs => "infojobs",
            Site::Gupy => "gupy",
            Site::TrabalhaBrasil => "trabalhabrasil",
            Site::BalcaoDeEmpregos => "balcaodeempregos",
            Site::Indeed => "indeed",
        }
    }

    /// Substring of the site's domain used to route search URLs
    pub fn domain_fragment(&self) -> &'static str {
        self.name()
    }

    /// Routes a search URL to its site by the domain fragment of its host
    ///
    /// Only the host is inspected, so a site name inside the path or query
    /// (a searched title, say) never reroutes the URL. Unparseable URLs
    /// belong to no site.
    pub fn from_url(url: &str) -> Option<Site> {
        Url::parse(url).ok().as_ref().and_then(Site::from_host)
    }

    /// Site whose domain fragment appears in the host of `url`
    pub fn from_host(url: &Url) -> Option<Site> {
        let host = url.host_str()?.to_lowercase();
        Site::all()
            .into_iter()
            .find(|site| host.contains(site.domain_fragment()))
    }

    /// The production adapter for this site
    pub fn default_adapter(&self) -> Arc<dyn SiteAdapter> {
        match self {
            Site::LinkedIn => Arc::new(LinkedInAdapter::new()),
            Site::Jobs99 => Arc::new(Jobs99Adapter::new()),
            Site::InfoJobs => Arc::new(InfoJobsAdapter::new()),
            Site::Gupy => Arc::new(GupyAdapter::new()),
            Site::TrabalhaBrasil => Arc::new(TrabalhaAdapter::new()),
            Site::BalcaoDeEmpregos => Arc::new(BalcaoAdapter::new()),
            Site::Indeed => Arc::new(IndeedAdapter::new()),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(Site::LinkedIn),
            "99jobs" | "jobs99" => Ok(Site::Jobs99),
            "infojobs" => Ok(Site::InfoJobs),
            "gupy" => Ok(Site::Gupy),
            "trabalhabrasil" | "trabalha" => Ok(Site::TrabalhaBrasil),
            "balcaodeempregos" | "balcao" => Ok(Site::BalcaoDeEmpregos),
            "indeed" => Ok(Site::Indeed),
            other => Err(format!("unknown site '{}'", other)),
        }
    }
}

/// Cards read from one listing page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    pub cards: Vec<JobCard>,
    /// Page count advertised by the page, for paginated sites
    pub total_pages: Option<u32>,
}

impl ListingPage {
    pub fn single(cards: Vec<JobCard>) -> Self {
        Self {
            cards,
            total_pages: None,
        }
    }
}

/// Where a card's full description comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailSource {
    /// An HTML page fetched with GET
    Page(String),
    /// A JSON endpoint queried with a form POST
    Form {
        url: String,
        form: Vec<(String, String)>,
    },
    /// The listing already carried the description
    Embedded,
}

/// One job board
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    fn site(&self) -> Site;

    /// Root the adapter builds its URLs from, when it has one
    fn base_url(&self) -> Option<&str> {
        None
    }

    /// Returns true if `url` should be harvested by this adapter
    ///
    /// A URL belongs to the adapter when its host names the site, or when it
    /// shares scheme, host and port with the adapter's base URL.
    fn handles(&self, url: &Url) -> bool {
        Site::from_host(url) == Some(self.site())
            || self
                .base_url()
                .and_then(|base| Url::parse(base).ok())
                .is_some_and(|base| base.origin() == url.origin())
    }

    /// Search URLs for one title on this site
    async fn search_urls(
        &self,
        ctx: &HarvestContext,
        title: &str,
        location: &Location,
        recency: RecencyFilter,
    ) -> Vec<String>;

    /// Reads the cards (and page count) out of a listing body
    fn parse_listing(&self, body: &str) -> ListingPage;

    /// URL of listing page `page` (1-based) for a search URL
    ///
    /// Sites without pagination keep the default and are fetched once.
    fn page_url(&self, _search_url: &str, _page: u32) -> Option<String> {
        None
    }

    /// Where the detail of `card` lives, or `None` if it cannot be located
    fn detail_source(&self, card: &JobCard) -> Option<DetailSource>;

    /// Reads the detail out of a fetched body
    fn parse_detail(&self, card: &JobCard, body: &str) -> Option<JobDetail>;

    /// Fetches the cards of one search URL, following pagination
    ///
    /// Stops once the card cap is reached, the advertised pages are
    /// exhausted, a page comes back empty or unreachable, or the deadline
    /// fires. The result never holds more than `card_cap` cards.
    async fn fetch_listing(&self, ctx: &HarvestContext, search_url: &str) -> Vec<JobCard> {
        let cap = ctx.settings().card_cap;
        let Some(body) = ctx.get(search_url).await else {
            return Vec::new();
        };

        let first = self.parse_listing(&body);
        let total_pages = first.total_pages.unwrap_or(1);
        let mut cards = first.cards;
        let mut page = 1;

        while cards.len() < cap && page < total_pages {
            if ctx.is_expired() {
                tracing::debug!("{}: deadline hit after page {}", self.site(), page);
                break;
            }
            page += 1;
            let Some(url) = self.page_url(search_url, page) else {
                break;
            };
            let Some(body) = ctx.get(&url).await else {
                break;
            };
            let listing = self.parse_listing(&body);
            if listing.cards.is_empty() {
                break;
            }
            cards.extend(listing.cards);
        }

        tracing::debug!(
            "{}: {} card(s) over {} page(s) for {}",
            self.site(),
            cards.len(),
            page,
            search_url
        );
        cards.truncate(cap);
        cards
    }

    /// Fetches the detail of one card
    async fn fetch_detail(&self, ctx: &HarvestContext, card: &JobCard) -> Option<JobDetail> {
        if ctx.is_expired() {
            return None;
        }

        match self.detail_source(card)? {
            DetailSource::Embedded => card
                .description
                .as_deref()
                .map(html::clean_text)
                .filter(|text| !text.is_empty())
                .map(JobDetail::with_description),
            DetailSource::Page(url) => {
                let body = ctx.get(&url).await?;
                self.parse_detail(card, &body)
            }
            DetailSource::Form { url, form } => {
                let body = ctx.post_form(&url, form).await?;
                self.parse_detail(card, &body)
            }
        }
    }

    /// Assembles and scores the posting for a card and its detail
    ///
    /// Returns `None` unless there is a non-empty description, a title and a
    /// URL; the other fields fall back to placeholders.
    fn to_posting(
        &self,
        ctx: &HarvestContext,
        card: &JobCard,
        detail: JobDetail,
    ) -> Option<JobPosting> {
        let description = html::clean_text(&detail.description);
        if description.is_empty() {
            return None;
        }
        let title = first_present(detail.title, card.title.as_deref())?;
        let url = first_present(card.url.clone(), None)?;

        let relevance_score = if ctx.keywords().is_empty() {
            0.0
        } else {
            ctx.scorer().score(ctx.keywords(), &description)
        };

        Some(JobPosting {
            title,
            company: first_present(detail.company, card.company.as_deref())
                .unwrap_or_else(|| COMPANY_FALLBACK.to_string()),
            posted_at: first_present(detail.posted_at, card.posted_at.as_deref())
                .unwrap_or_else(|| POSTED_AT_FALLBACK.to_string()),
            url,
            location: first_present(detail.location, card.location.as_deref())
                .unwrap_or_else(|| LOCATION_FALLBACK.to_string()),
            description: ctx.settings().include_descriptions.then_some(description),
            relevance_score,
        })
    }
}

/// First non-blank value, cleaned
fn first_present(preferred: Option<String>, fallback: Option<&str>) -> Option<String> {
    preferred
        .as_deref()
        .map(html::clean_text)
        .filter(|value| !value.is_empty())
        .or_else(|| {
            fallback
                .map(html::clean_text)
                .filter(|value| !value.is_empty())
        })
}

/// Size of the detail pool for a group of `cards` cards
///
/// Grows with the square root of the group so one site never sees hundreds
/// of simultaneous connections.
pub fn detail_workers(cards: usize, max_workers: usize) -> usize {
    let scaled = (cards as f64).sqrt().ceil() as usize;
    scaled.clamp(1, max_workers.max(1))
}

/// Returns true if `card` survives the harvest's recency filter
///
/// Cards without a date, or with one that cannot be read, are kept.
pub fn passes_recency(ctx: &HarvestContext, card: &JobCard) -> bool {
    let filter = ctx.settings().recency;
    if filter.threshold().is_none() {
        return true;
    }
    match card
        .posted_at
        .as_deref()
        .and_then(|text| classify_posted_at(text, ctx.today()))
    {
        Some(bucket) => filter.admits(bucket),
        None => true,
    }
}

async fn process_card(
    adapter: &dyn SiteAdapter,
    ctx: &HarvestContext,
    card: &JobCard,
) -> Option<JobPosting> {
    if ctx.is_expired() {
        return None;
    }
    let detail = adapter.fetch_detail(ctx, card).await?;
    adapter.to_posting(ctx, card, detail)
}

/// Runs one adapter over its search URLs and returns its postings
///
/// Listing fetches run in a pool of `listing_workers`. Each URL's card group
/// is then processed in turn: cards failing the recency filter are dropped
/// before any detail fetch, the rest go through a pool sized by
/// [`detail_workers`]. Cards reached after the deadline yield nothing.
pub async fn run_adapter(
    adapter: Arc<dyn SiteAdapter>,
    ctx: HarvestContext,
    urls: Vec<String>,
) -> HarvestOutcome {
    let site = adapter.site();
    let url_count = urls.len();
    let listing_workers = ctx.settings().listing_workers.max(1);

    let groups: Vec<Vec<JobCard>> = stream::iter(urls)
        .map(|url| {
            let adapter = Arc::clone(&adapter);
            let ctx = ctx.clone();
            async move { adapter.fetch_listing(&ctx, &url).await }
        })
        .buffer_unordered(listing_workers)
        .collect()
        .await;

    let card_total: usize = groups.iter().map(Vec::len).sum();
    tracing::info!(
        "{}: {} card(s) from {} search URL(s)",
        site,
        card_total,
        url_count
    );

    let mut jobs = Vec::new();
    for group in groups {
        if ctx.is_expired() {
            tracing::info!("{}: deadline reached, skipping remaining cards", site);
            break;
        }

        let before = group.len();
        let retained: Vec<JobCard> = group
            .into_iter()
            .filter(|card| passes_recency(&ctx, card))
            .collect();
        if retained.len() < before {
            tracing::debug!(
                "{}: recency filter dropped {} card(s)",
                site,
                before - retained.len()
            );
        }
        if retained.is_empty() {
            continue;
        }

        let workers = detail_workers(retained.len(), ctx.settings().max_detail_workers);
        let postings: Vec<Option<JobPosting>> = stream::iter(retained)
            .map(|card| {
                let adapter = Arc::clone(&adapter);
                let ctx = ctx.clone();
                async move { process_card(adapter.as_ref(), &ctx, &card).await }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        jobs.extend(postings.into_iter().flatten());
    }

    tracing::info!("{}: {} posting(s) assembled", site, jobs.len());
    HarvestOutcome::from_jobs(jobs)
}
