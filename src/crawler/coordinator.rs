//! Phase orchestration
//!
//! The pipeline runs three phases strictly in order:
//! 1. Last-page discovery for every query without a page count
//! 2. Listing scraping for every query with pagination links
//! 3. Detail scraping for every listing still in summary state
//!
//! Each phase reads its candidates fresh from storage, submits one task per
//! candidate to the bounded pool, and waits for every task to settle before
//! the next phase starts. Task failures are counted, never propagated.

use crate::config::Config;
use crate::crawler::backoff::{retry_with_backoff, BackoffPolicy};
use crate::crawler::discovery::discover_last_page;
use crate::crawler::executor::{TaskExecutor, TaskOutcome};
use crate::crawler::fetcher::ProxyClient;
use crate::extract::{extract_details, extract_listings, PageExtraction};
use crate::output::Spillover;
use crate::storage::{ListingRecord, SearchQueryRecord, Storage};
use crate::url::probe_url;
use crate::{Result, TrawlError};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    LastPageDiscovery,
    ListingScraping,
    DetailScraping,
}

impl Phase {
    /// Every phase in execution order
    pub const ALL: [Phase; 3] = [
        Phase::LastPageDiscovery,
        Phase::ListingScraping,
        Phase::DetailScraping,
    ];

    /// Short name used on the command line
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::LastPageDiscovery => "discover",
            Self::ListingScraping => "listings",
            Self::DetailScraping => "details",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LastPageDiscovery => "last-page discovery",
            Self::ListingScraping => "listing scraping",
            Self::DetailScraping => "detail scraping",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.cli_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown phase '{}' (expected discover, listings or details)", s))
    }
}

/// Summary of one completed phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl PhaseReport {
    fn from_outcomes<T>(phase: Phase, outcomes: &[TaskOutcome<T>], elapsed: Duration) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            phase,
            succeeded,
            failed: outcomes.len() - succeeded,
            elapsed,
        }
    }

    /// Number of tasks the phase submitted
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Runs the pipeline phases against a storage backend
pub struct Coordinator {
    config: Arc<Config>,
    storage: Arc<dyn Storage>,
    client: ProxyClient,
    policy: BackoffPolicy,
    executor: TaskExecutor,
    spillover: Arc<Spillover>,
}

impl Coordinator {
    /// Creates a coordinator
    ///
    /// Opens the spillover file named in the configuration, so an unwritable
    /// path fails here rather than mid-run.
    pub fn new(config: Config, storage: Arc<dyn Storage>, client: ProxyClient) -> Result<Self> {
        let spillover = Spillover::open(Path::new(&config.output.spillover_path))?;

        Ok(Self {
            policy: BackoffPolicy::from_config(&config.pipeline),
            executor: TaskExecutor::new(config.pipeline.pool_size as usize),
            config: Arc::new(config),
            storage,
            client,
            spillover: Arc::new(spillover),
        })
    }

    /// Runs all three phases in order
    pub async fn run(&self) -> Result<Vec<PhaseReport>> {
        let started = Instant::now();
        let mut reports = Vec::with_capacity(Phase::ALL.len());

        for phase in Phase::ALL {
            reports.push(self.run_phase(phase).await?);
        }

        let failed: usize = reports.iter().map(|r| r.failed).sum();
        tracing::info!(
            "Pipeline completed in {:?} with {} failed tasks",
            started.elapsed(),
            failed
        );

        Ok(reports)
    }

    /// Runs a single phase to completion
    ///
    /// Only a failure to read the phase's candidates is returned as an error.
    pub async fn run_phase(&self, phase: Phase) -> Result<PhaseReport> {
        tracing::info!("Starting {}", phase);
        let started = Instant::now();

        let report = match phase {
            Phase::LastPageDiscovery => {
                let outcomes = self.discover_last_pages().await?;
                PhaseReport::from_outcomes(phase, &outcomes, started.elapsed())
            }
            Phase::ListingScraping => {
                let outcomes = self.scrape_listings().await?;
                PhaseReport::from_outcomes(phase, &outcomes, started.elapsed())
            }
            Phase::DetailScraping => {
                let outcomes = self.scrape_details().await?;
                PhaseReport::from_outcomes(phase, &outcomes, started.elapsed())
            }
        };

        tracing::info!(
            "Finished {} in {:?}: {} succeeded, {} failed",
            phase,
            report.elapsed,
            report.succeeded,
            report.failed
        );

        Ok(report)
    }

    async fn discover_last_pages(&self) -> Result<Vec<TaskOutcome<()>>> {
        let queries = self.storage.queries_pending_discovery()?;
        tracing::info!("{} queries awaiting last-page discovery", queries.len());

        let tasks = queries
            .into_iter()
            .map(|query| {
                let label = format!("discover query {} ({})", query.id, query.title);
                let storage = Arc::clone(&self.storage);
                let client = self.client.clone();
                let policy = self.policy.clone();
                let spillover = Arc::clone(&self.spillover);

                let task = async move {
                    discover_query(query, storage.as_ref(), &client, &policy, &spillover).await
                };
                (label, task)
            })
            .collect();

        Ok(self.executor.run_all(tasks).await)
    }

    async fn scrape_listings(&self) -> Result<Vec<TaskOutcome<usize>>> {
        let include_scraped = self.config.pipeline.rescrape_existing;
        let queries = self.storage.queries_with_pagination(include_scraped)?;
        tracing::info!("{} queries awaiting listing scraping", queries.len());

        let tasks = queries
            .into_iter()
            .map(|query| {
                let label = format!("scrape listings for query {} ({})", query.id, query.title);
                let storage = Arc::clone(&self.storage);
                let client = self.client.clone();
                let policy = self.policy.clone();
                let config = Arc::clone(&self.config);

                let task = async move {
                    scrape_query_pages(
                        query,
                        storage.as_ref(),
                        &client,
                        &policy,
                        &config.site.base_url,
                        config.pipeline.rescrape_existing,
                    )
                    .await
                };
                (label, task)
            })
            .collect();

        Ok(self.executor.run_all(tasks).await)
    }

    async fn scrape_details(&self) -> Result<Vec<TaskOutcome<()>>> {
        let listings = self.storage.listings_pending_details()?;
        tracing::info!("{} listings awaiting detail scraping", listings.len());

        let tasks = listings
            .into_iter()
            .map(|listing| {
                let label = format!("scrape details for listing {}", listing.id);
                let storage = Arc::clone(&self.storage);
                let client = self.client.clone();
                let policy = self.policy.clone();

                let task = async move {
                    scrape_listing_details(listing, storage.as_ref(), &client, &policy).await
                };
                (label, task)
            })
            .collect();

        Ok(self.executor.run_all(tasks).await)
    }
}

/// Discovers and records the page count of one query
///
/// The probe URL goes to the spillover file when fetching exhausts its retries;
/// the query stays undiscovered so a later run picks it up again.
async fn discover_query(
    query: SearchQueryRecord,
    storage: &dyn Storage,
    client: &ProxyClient,
    policy: &BackoffPolicy,
    spillover: &Spillover,
) -> Result<()> {
    match discover_last_page(client, policy, &query.query_url).await {
        Ok(last_page) => {
            storage.record_last_page(query.id, last_page)?;
            tracing::info!("Query {} ({}): {}", query.id, query.title, last_page);
            Ok(())
        }
        Err(e @ TrawlError::Fetch(_)) => {
            let probe = probe_url(&query.query_url);
            if let Err(spill_error) = spillover.append(&probe) {
                tracing::error!(
                    "Failed to record {} in spillover file {}: {}",
                    probe,
                    spillover.path().display(),
                    spill_error
                );
            }
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Scrapes the pagination links of one query and stores the listings
///
/// Unless `rescrape` is set, pages already marked scraped are left alone, so
/// a rerun only fetches the pages an earlier run failed on. A page that
/// exhausts its retries is skipped so the remaining pages still get scraped;
/// the task reports the last such failure once all pages are done. Storage
/// failures abort the task at once.
async fn scrape_query_pages(
    query: SearchQueryRecord,
    storage: &dyn Storage,
    client: &ProxyClient,
    policy: &BackoffPolicy,
    base_url: &str,
    rescrape: bool,
) -> Result<usize> {
    let links = query.pagination_links.unwrap_or_default();
    let done: HashSet<u32> = if rescrape {
        HashSet::new()
    } else {
        storage.scraped_pages(query.id)?.into_iter().collect()
    };
    let mut inserted = 0;
    let mut last_error = None;

    for (index, link) in links.iter().enumerate() {
        let page_number = index as u32 + 1;
        if done.contains(&page_number) {
            tracing::debug!("Page {} of query {} already scraped", page_number, query.id);
            continue;
        }
        let target = link.as_str();

        let markup = match retry_with_backoff(policy, target, move || async move {
            client.fetch(target).await.map_err(TrawlError::from)
        })
        .await
        {
            Ok(markup) => markup,
            Err(e) => {
                tracing::warn!(
                    "Skipping page {} of query {}: {}",
                    page_number,
                    query.id,
                    e
                );
                last_error = Some(e);
                continue;
            }
        };

        let listings = match extract_listings(&markup, base_url) {
            PageExtraction::NoResults => {
                tracing::debug!("Page {} of query {} has no results", page_number, query.id);
                Vec::new()
            }
            PageExtraction::Listings(listings) => listings,
        };

        inserted += storage.insert_listings(query.id, page_number, &listings)?;
        tracing::debug!(
            "Stored {} listings from page {} of query {}",
            listings.len(),
            page_number,
            query.id
        );
    }

    tracing::info!(
        "Query {} ({}): {} listings from {} pages ({} already scraped)",
        query.id,
        query.title,
        inserted,
        links.len(),
        done.len()
    );

    match last_error {
        Some(e) => Err(e),
        None => Ok(inserted),
    }
}

/// Fetches one listing's detail page and writes its detail fields
async fn scrape_listing_details(
    listing: ListingRecord,
    storage: &dyn Storage,
    client: &ProxyClient,
    policy: &BackoffPolicy,
) -> Result<()> {
    let target = listing.detail_url.as_str();

    let markup = retry_with_backoff(policy, target, move || async move {
        client.fetch(target).await.map_err(TrawlError::from)
    })
    .await?;

    let details = extract_details(&markup);
    storage.update_listing_details(listing.id, &details)?;
    tracing::debug!("Listing {} enriched", listing.id);

    Ok(())
}
