//! Fan-out orchestrator
//!
//! This module contains the harvest entry point that coordinates one
//! end-to-end run, including:
//! - Partitioning search URLs by site
//! - Running one adapter task per site under a shared deadline
//! - Isolating adapter failures (errors and panics)
//! - Merging and shuffling the partial results

use crate::config::{load_config, Config};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::harvest::{AdapterSettings, Deadline, HarvestContext, HostPacer};
use crate::model::HarvestOutcome;
use crate::scoring::Scorer;
use crate::search::{self, RecencyFilter, SearchRequest};
use crate::sites::{self, Site, SiteAdapter};
use crate::HarvestError;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Main harvest coordinator
///
/// A `Harvester` is cheap to share: the politeness pacer and the global
/// fetch permits live as long as the harvester, so concurrent harvests on
/// one instance share the same per-host pacing and the same bound on
/// in-flight requests.
pub struct Harvester {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    pacer: Arc<HostPacer>,
    permits: Arc<Semaphore>,
    adapters: HashMap<Site, Arc<dyn SiteAdapter>>,
}

impl Harvester {
    /// Creates a harvester with the production adapter for every site
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let pacer = Arc::new(HostPacer::new(Duration::from_millis(
            config.harvest.politeness_delay_ms,
        )));
        let permits = Arc::new(Semaphore::new(config.harvest.max_concurrent_fetches));
        let adapters = Site::all()
            .into_iter()
            .map(|site| (site, site.default_adapter()))
            .collect();

        Self {
            config,
            fetcher,
            pacer,
            permits,
            adapters,
        }
    }

    /// Creates a harvester backed by the reqwest fetcher
    pub fn with_http(config: Config) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Creates an HTTP-backed harvester from a TOML config file
    pub fn from_config_file(path: &Path) -> Result<Self, HarvestError> {
        let config = load_config(path)?;
        Self::with_http(config)
    }

    /// Replaces the adapter used for `site`
    pub fn with_adapter(mut self, site: Site, adapter: Arc<dyn SiteAdapter>) -> Self {
        self.adapters.insert(site, adapter);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Groups URLs by the registered adapter that handles them
    ///
    /// Sites are tried in [`Site::all`] order; unparseable URLs and URLs no
    /// adapter claims are dropped.
    pub fn partition_urls(&self, urls: &[String]) -> Vec<(Site, Vec<String>)> {
        let mut batches: BTreeMap<Site, Vec<String>> = BTreeMap::new();
        for url in urls {
            let site = Url::parse(url).ok().and_then(|parsed| {
                Site::all().into_iter().find(|site| {
                    self.adapters
                        .get(site)
                        .is_some_and(|adapter| adapter.handles(&parsed))
                })
            });
            match site {
                Some(site) => batches.entry(site).or_default().push(url.clone()),
                None => tracing::debug!("No adapter for {}, dropping it", url),
            }
        }
        batches.into_iter().collect()
    }

    /// Builds the context shared by every adapter of one harvest
    pub fn context(
        &self,
        keywords: Vec<String>,
        recency: RecencyFilter,
        deadline: Deadline,
    ) -> HarvestContext {
        HarvestContext::new(
            Arc::clone(&self.fetcher),
            deadline,
            Arc::clone(&self.pacer),
            Arc::clone(&self.permits),
            keywords,
            Scorer::new(
                self.config.scoring.scale_factor,
                self.config.scoring.fold_accents,
            ),
            AdapterSettings::from_config(&self.config, recency),
        )
    }

    /// Harvests `urls` under the configured deadline ceiling
    pub async fn harvest(
        &self,
        urls: &[String],
        keywords: &[String],
        recency: RecencyFilter,
    ) -> HarvestOutcome {
        let deadline = Deadline::new();
        let timer = deadline.arm(Duration::from_secs(self.config.harvest.deadline_secs));
        let ctx = self.context(keywords.to_vec(), recency, deadline);

        let outcome = self.harvest_in(ctx, urls).await;
        timer.disarm().await;
        outcome
    }

    /// Harvests `urls` under a deadline owned by the caller
    pub async fn harvest_with_deadline(
        &self,
        urls: &[String],
        keywords: &[String],
        recency: RecencyFilter,
        deadline: Deadline,
    ) -> HarvestOutcome {
        let ctx = self.context(keywords.to_vec(), recency, deadline);
        self.harvest_in(ctx, urls).await
    }

    /// Plans the search URLs of a request, then harvests them
    ///
    /// `sites` restricts planning to the given sites. Planning (which may
    /// call location lookups) runs under the same deadline as the harvest.
    pub async fn search(
        &self,
        request: &SearchRequest,
        sites: Option<&[Site]>,
    ) -> HarvestOutcome {
        let deadline = Deadline::new();
        let timer = deadline.arm(Duration::from_secs(self.config.harvest.deadline_secs));
        let ctx = self.context(request.keywords.clone(), request.recency, deadline);

        let adapters = self.selected_adapters(sites);
        let urls = search::plan(request, &adapters, &ctx).await;
        tracing::info!("Planned {} search URL(s)", urls.len());
        let outcome = self.harvest_in(ctx, &urls).await;

        timer.disarm().await;
        outcome
    }

    /// Search URLs for a request, restricted to `sites` when given
    pub async fn plan(&self, request: &SearchRequest, sites: Option<&[Site]>) -> Vec<String> {
        let ctx = self.context(request.keywords.clone(), request.recency, Deadline::new());
        let adapters = self.selected_adapters(sites);
        search::plan(request, &adapters, &ctx).await
    }

    fn selected_adapters(&self, sites: Option<&[Site]>) -> Vec<Arc<dyn SiteAdapter>> {
        let mut selected: Vec<(Site, Arc<dyn SiteAdapter>)> = self
            .adapters
            .iter()
            .filter(|(site, _)| sites.map_or(true, |wanted| wanted.contains(site)))
            .map(|(site, adapter)| (*site, Arc::clone(adapter)))
            .collect();
        selected.sort_by_key(|(site, _)| *site);
        selected.into_iter().map(|(_, adapter)| adapter).collect()
    }

    /// Runs one task per site batch and merges what comes back
    async fn harvest_in(&self, ctx: HarvestContext, urls: &[String]) -> HarvestOutcome {
        let batches = self.partition_urls(urls);
        tracing::info!(
            "Harvesting {} URL(s) across {} site(s)",
            urls.len(),
            batches.len()
        );

        let mut tasks = Vec::with_capacity(batches.len());
        for (site, batch) in batches {
            let Some(adapter) = self.adapters.get(&site).cloned() else {
                tracing::warn!("No adapter registered for {}", site);
                continue;
            };
            let ctx = ctx.clone();
            tasks.push((site, tokio::spawn(sites::run_adapter(adapter, ctx, batch))));
        }

        let mut merged = HarvestOutcome::default();
        for (site, task) in tasks {
            match task.await {
                Ok(outcome) => merged.merge(outcome),
                Err(e) => {
                    let error = HarvestError::AdapterFailed {
                        site: site.to_string(),
                        message: e.to_string(),
                    };
                    tracing::error!("{}", error);
                }
            }
        }

        merged.jobs.shuffle(&mut rand::thread_rng());
        tracing::info!(
            "Harvest complete: {} posting(s){}",
            merged.total_count,
            if ctx.is_expired() {
                " (deadline reached)"
            } else {
                ""
            }
        );
        merged
    }
}
