//! Orchestrator tests driven by in-memory fetchers

use crate::stubs::{fast_config, jobs99_detail, jobs99_listing, linkedin_detail, linkedin_listing, Reply, StubFetcher};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use vaga_harvest::harvest::{Deadline, HarvestContext};
use vaga_harvest::model::{JobCard, JobDetail};
use vaga_harvest::search::{Location, RecencyFilter};
use vaga_harvest::sites::{DetailSource, ListingPage, Site, SiteAdapter};
use vaga_harvest::Harvester;

const LINKEDIN_SEARCH: &str = "https://www.linkedin.com/jobs/search?keywords=analista&location=Brazil&position=1&pageNum=0";
const JOBS99_SEARCH: &str = "https://99jobs.com/opportunities/filtered_search?search%5Bterm%5D=analista";

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn linkedin_stub() -> StubFetcher {
    StubFetcher::new()
        .body(
            "/jobs/view/1",
            linkedin_detail("Gerenciar projeto e arquivos do computador"),
        )
        .body(
            "/jobs/search",
            linkedin_listing(&[("Analista Administrativo", "https://www.linkedin.com/jobs/view/1")]),
        )
}

/// Adapter whose listing parser always panics
struct PanickingAdapter;

#[async_trait]
impl SiteAdapter for PanickingAdapter {
    fn site(&self) -> Site {
        Site::Jobs99
    }

    async fn search_urls(
        &self,
        _ctx: &HarvestContext,
        _title: &str,
        _location: &Location,
        _recency: RecencyFilter,
    ) -> Vec<String> {
        Vec::new()
    }

    fn parse_listing(&self, _body: &str) -> ListingPage {
        panic!("listing markup changed");
    }

    fn detail_source(&self, _card: &JobCard) -> Option<DetailSource> {
        None
    }

    fn parse_detail(&self, _card: &JobCard, _body: &str) -> Option<JobDetail> {
        None
    }
}

#[tokio::test]
async fn test_scores_linkedin_posting_end_to_end() {
    let stub = Arc::new(linkedin_stub());
    let harvester = Harvester::new(fast_config(), stub.clone());

    let outcome = harvester
        .harvest(
            &[LINKEDIN_SEARCH.to_string()],
            &keywords(&["projeto", "arquivos"]),
            RecencyFilter::Any,
        )
        .await;

    assert_eq!(outcome.total_count, 1);
    let job = &outcome.jobs[0];
    assert_eq!(job.title, "Analista Administrativo");
    assert_eq!(job.company, "Acme");
    assert_eq!(job.url, "https://www.linkedin.com/jobs/view/1");
    assert!((job.relevance_score - 5.0 * 2.0 / 12.0).abs() < 1e-9);
    assert_eq!(stub.call_count(), 2);
}

#[tokio::test]
async fn test_failing_site_does_not_affect_others() {
    let stub = Arc::new(linkedin_stub().route("99jobs", Reply::Fail));
    let harvester = Harvester::new(fast_config(), stub.clone());

    let outcome = harvester
        .harvest(
            &[LINKEDIN_SEARCH.to_string(), JOBS99_SEARCH.to_string()],
            &keywords(&["projeto"]),
            RecencyFilter::Any,
        )
        .await;

    assert_eq!(outcome.total_count, 1);
    assert_eq!(outcome.jobs[0].url, "https://www.linkedin.com/jobs/view/1");
    assert!(stub.calls().iter().any(|url| url.contains("99jobs")));
}

#[tokio::test]
async fn test_panicking_adapter_is_isolated() {
    let stub = Arc::new(linkedin_stub().body("99jobs", jobs99_listing(&["/opportunities/7"])));
    let harvester =
        Harvester::new(fast_config(), stub).with_adapter(Site::Jobs99, Arc::new(PanickingAdapter));

    let outcome = harvester
        .harvest(
            &[JOBS99_SEARCH.to_string(), LINKEDIN_SEARCH.to_string()],
            &keywords(&["arquivos"]),
            RecencyFilter::Any,
        )
        .await;

    assert_eq!(outcome.total_count, 1);
    assert_eq!(outcome.jobs[0].title, "Analista Administrativo");
}

#[tokio::test]
async fn test_merges_postings_from_every_site() {
    let stub = Arc::new(
        linkedin_stub()
            .body(
                "99jobs.com/opportunities/7",
                jobs99_detail("Assistente", "Organizar arquivos"),
            )
            .body(
                "99jobs.com/opportunities/8",
                jobs99_detail("Auxiliar", "Controlar projeto"),
            )
            .body(
                "filtered_search",
                jobs99_listing(&["/opportunities/7", "/opportunities/8"]),
            ),
    );
    let harvester = Harvester::new(fast_config(), stub);

    let outcome = harvester
        .harvest(
            &[JOBS99_SEARCH.to_string(), LINKEDIN_SEARCH.to_string()],
            &keywords(&["arquivos"]),
            RecencyFilter::Any,
        )
        .await;

    assert_eq!(outcome.total_count, 3);
    assert_eq!(outcome.jobs.len(), 3);

    let mut titles: Vec<&str> = outcome.jobs.iter().map(|j| j.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["Analista Administrativo", "Assistente", "Auxiliar"]);

    let assistente = outcome.jobs.iter().find(|j| j.title == "Assistente").unwrap();
    assert_eq!(assistente.company, "Beta");
    assert!(outcome
        .jobs
        .iter()
        .all(|j| (0.0..=5.0).contains(&j.relevance_score)));
}

#[tokio::test]
async fn test_unknown_urls_are_never_fetched() {
    let stub = Arc::new(linkedin_stub());
    let harvester = Harvester::new(fast_config(), stub.clone());

    harvester
        .harvest(
            &[
                "https://unknown.example/jobs?q=analista".to_string(),
                LINKEDIN_SEARCH.to_string(),
            ],
            &[],
            RecencyFilter::Any,
        )
        .await;

    let calls = stub.calls();
    assert!(!calls.is_empty());
    assert!(calls.iter().all(|url| url.contains("linkedin.com")));
}

#[tokio::test]
async fn test_no_keywords_scores_zero() {
    let harvester = Harvester::new(fast_config(), Arc::new(linkedin_stub()));

    let outcome = harvester
        .harvest(&[LINKEDIN_SEARCH.to_string()], &[], RecencyFilter::Any)
        .await;

    assert_eq!(outcome.total_count, 1);
    assert_eq!(outcome.jobs[0].relevance_score, 0.0);
}

#[tokio::test]
async fn test_expired_deadline_issues_no_requests() {
    let stub = Arc::new(linkedin_stub());
    let harvester = Harvester::new(fast_config(), stub.clone());

    let deadline = Deadline::new();
    deadline.expire();

    let outcome = harvester
        .harvest_with_deadline(
            &[LINKEDIN_SEARCH.to_string(), JOBS99_SEARCH.to_string()],
            &keywords(&["projeto"]),
            RecencyFilter::Any,
            deadline,
        )
        .await;

    assert_eq!(outcome.total_count, 0);
    assert!(outcome.jobs.is_empty());
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_deadline_cuts_slow_harvest_short() {
    let listing: Vec<(String, String)> = (0..10)
        .map(|i| {
            (
                format!("Vaga {}", i),
                format!("https://www.linkedin.com/jobs/view/{}", i),
            )
        })
        .collect();
    let listing: Vec<(&str, &str)> = listing
        .iter()
        .map(|(title, url)| (title.as_str(), url.as_str()))
        .collect();

    let stub = Arc::new(
        StubFetcher::new()
            .body("/jobs/view/", linkedin_detail("Gerenciar projeto"))
            .body("/jobs/search", linkedin_listing(&listing))
            .with_delay(Duration::from_millis(300)),
    );
    let harvester = Harvester::new(fast_config(), stub.clone());

    let deadline = Deadline::new();
    let timer = deadline.arm(Duration::from_millis(100));
    let started = Instant::now();

    let outcome = harvester
        .harvest_with_deadline(
            &[LINKEDIN_SEARCH.to_string()],
            &keywords(&["projeto"]),
            RecencyFilter::Any,
            deadline.clone(),
        )
        .await;
    timer.disarm().await;

    assert!(deadline.is_expired());
    assert!(outcome.total_count < 10);
    // Only the listing fetch was in flight when the deadline fired
    assert_eq!(stub.call_count(), 1);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_recency_filter_drops_old_cards_before_detail_fetch() {
    let listing = r#"<ul class="jobs-search__results-list">
        <li>
          <a href="https://www.linkedin.com/jobs/view/1">x</a>
          <h3 class="base-search-card__title">Antiga</h3>
          <time>3 months ago</time>
        </li>
        <li>
          <a href="https://www.linkedin.com/jobs/view/2">x</a>
          <h3 class="base-search-card__title">Recente</h3>
          <time>2 hours ago</time>
        </li>
    </ul>"#;
    let stub = Arc::new(
        StubFetcher::new()
            .body("/jobs/view/2", linkedin_detail("Gerenciar projeto"))
            .body("/jobs/view/1", linkedin_detail("Gerenciar projeto"))
            .body("/jobs/search", listing),
    );
    let harvester = Harvester::new(fast_config(), stub.clone());

    let outcome = harvester
        .harvest(
            &[LINKEDIN_SEARCH.to_string()],
            &keywords(&["projeto"]),
            RecencyFilter::Week,
        )
        .await;

    assert_eq!(outcome.total_count, 1);
    assert_eq!(outcome.jobs[0].title, "Recente");
    assert!(!stub.calls().iter().any(|url| url.ends_with("/jobs/view/1")));
}
