//! Crawler coordinator - main crawl orchestration logic
//!
//! One coordinating loop owns the [`Scheduler`] and hands candidates to a
//! bounded set of in-flight fetches. When a fetch completes the loop extracts
//! its links, applies the domain policy, filter chain and scorer, queues the
//! survivors and emits the page's [`CrawlResult`]. The strategy decides how
//! many fetches may be in flight and in which order results leave the loop:
//!
//! - BFS keeps up to `concurrency` fetches running and emits in dispatch
//!   order, so every depth-d result precedes every depth-(d+1) result.
//! - DFS runs one fetch at a time so a branch is exhausted before its sibling.
//! - Best-first pops up to `batch_size` top candidates once the previous batch
//!   has drained and emits in completion order.

use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::result::{CrawlResult, DeliveryMode, Limit};
use crate::crawler::scheduler::{Budgets, Scheduler};
use crate::filter::{FilterChain, FilterStats, PageMeta};
use crate::scorer::{ScoreContext, Scorer};
use crate::strategy::{Candidate, Strategy};
use crate::url::normalize_url;
use crate::{ConfigError, CrawlError};
use futures::future::BoxFuture;
use futures::stream::{FuturesOrdered, FuturesUnordered, Stream, StreamExt};
use futures::FutureExt;
use std::collections::HashSet;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Fetches in flight when none is configured
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Upper bound accepted for `concurrency`
pub const MAX_CONCURRENCY: usize = 100;

/// Best-first candidates popped per dispatch round when none is configured
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Builder for [`Crawler`]
///
/// Every setting has a default; `build` validates the combination and is the
/// only place configuration errors surface.
#[derive(Debug, Clone)]
pub struct CrawlerBuilder {
    strategy: Strategy,
    max_depth: Option<Limit>,
    max_pages: Limit,
    include_external: bool,
    filter_chain: FilterChain,
    scorer: Option<Scorer>,
    concurrency: usize,
    batch_size: usize,
    delivery: DeliveryMode,
}

impl CrawlerBuilder {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            max_depth: None,
            max_pages: Limit::Unbounded,
            include_external: false,
            filter_chain: FilterChain::new(),
            scorer: None,
            concurrency: DEFAULT_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            delivery: DeliveryMode::default(),
        }
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Depth ceiling; defaults to the strategy's own default
    pub fn max_depth(self, max_depth: u32) -> Self {
        self.depth_limit(Limit::Bounded(u64::from(max_depth)))
    }

    pub fn depth_limit(mut self, limit: Limit) -> Self {
        self.max_depth = Some(limit);
        self
    }

    /// Ceiling on emitted results, start URL included
    pub fn max_pages(self, max_pages: u64) -> Self {
        self.page_limit(Limit::Bounded(max_pages))
    }

    pub fn page_limit(mut self, limit: Limit) -> Self {
        self.max_pages = limit;
        self
    }

    /// Follow links whose host differs from the start URL's host
    pub fn include_external(mut self, include_external: bool) -> Self {
        self.include_external = include_external;
        self
    }

    pub fn filter_chain(mut self, filter_chain: FilterChain) -> Self {
        self.filter_chain = filter_chain;
        self
    }

    pub fn scorer(mut self, scorer: impl Into<Scorer>) -> Self {
        self.scorer = Some(scorer.into());
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }

    /// Validates the settings and creates a crawler for a single run
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero page budget, a concurrency
    /// outside `1..=100` or a zero batch size.
    pub fn build(self, fetcher: Arc<dyn Fetcher>) -> Result<Crawler, ConfigError> {
        if self.max_pages == Limit::Bounded(0) {
            return Err(ConfigError::Validation(
                "max_pages must be at least 1".to_string(),
            ));
        }

        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::Validation(format!(
                "concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, self.concurrency
            )));
        }

        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "batch_size must be at least 1".to_string(),
            ));
        }

        let max_depth = self
            .max_depth
            .unwrap_or_else(|| Limit::Bounded(u64::from(self.strategy.default_max_depth())));

        Ok(Crawler {
            engine: Engine {
                strategy: self.strategy,
                budgets: Budgets {
                    max_depth,
                    max_pages: self.max_pages,
                },
                include_external: self.include_external,
                concurrency: self.concurrency,
                batch_size: self.batch_size,
                fetcher,
                filter_chain: Arc::new(self.filter_chain),
                scorer: self.scorer.map(Arc::new),
                shutdown: CancellationToken::new(),
            },
            delivery: self.delivery,
            started: AtomicBool::new(false),
        })
    }
}

impl Default for CrawlerBuilder {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

/// Cloneable handle that requests a cooperative shutdown
///
/// Shutdown stops new dispatches at the next dequeue. Fetches already in
/// flight drain and their results are still delivered.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    token: CancellationToken,
}

impl ShutdownHandle {
    /// Requests shutdown; never blocks and may be called repeatedly
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("Shutdown requested, draining in-flight fetches");
        }
        self.token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Lazy, single-pass sequence of results from a streaming run
///
/// The sequence ends when the crawl finishes, its budget is spent or a
/// shutdown has drained. Dropping the stream stops the crawl.
pub struct CrawlStream {
    inner: ReceiverStream<CrawlResult>,
}

impl Stream for CrawlStream {
    type Item = CrawlResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Results of [`Crawler::run`], shaped by the delivery mode
pub enum CrawlOutput {
    Batch(Vec<CrawlResult>),
    Stream(CrawlStream),
}

impl CrawlOutput {
    /// Collects the results, draining the stream if there is one
    pub async fn collect(self) -> Vec<CrawlResult> {
        match self {
            Self::Batch(results) => results,
            Self::Stream(stream) => stream.collect().await,
        }
    }
}

/// A configured deep crawl
///
/// A crawler runs once. Build a new one for another run.
pub struct Crawler {
    engine: Engine,
    delivery: DeliveryMode,
    started: AtomicBool,
}

impl Crawler {
    pub fn builder(strategy: Strategy) -> CrawlerBuilder {
        CrawlerBuilder::new(strategy)
    }

    pub fn strategy(&self) -> Strategy {
        self.engine.strategy
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery
    }

    /// Crawls from `start_url` using the configured delivery mode
    ///
    /// # Errors
    ///
    /// Fails before traversal starts when the start URL is invalid or the
    /// crawler has already run.
    pub async fn run(&self, start_url: &str) -> Result<CrawlOutput, CrawlError> {
        match self.delivery {
            DeliveryMode::Batch => self.run_batch(start_url).await.map(CrawlOutput::Batch),
            DeliveryMode::Stream => self.run_stream(start_url).map(CrawlOutput::Stream),
        }
    }

    /// Crawls to completion and returns every result in emission order
    pub async fn run_batch(&self, start_url: &str) -> Result<Vec<CrawlResult>, CrawlError> {
        let start = self.begin(start_url)?;
        let mut results = Vec::new();
        self.engine.drive(start, Sink::Buffer(&mut results)).await;
        Ok(results)
    }

    /// Starts the crawl on a background task and streams its results
    ///
    /// Must be called from within a tokio runtime.
    pub fn run_stream(&self, start_url: &str) -> Result<CrawlStream, CrawlError> {
        let start = self.begin(start_url)?;
        let (tx, rx) = mpsc::channel(self.engine.concurrency.max(self.engine.batch_size));
        let engine = self.engine.clone();

        tokio::spawn(async move {
            engine.drive(start, Sink::Channel(tx)).await;
        });

        Ok(CrawlStream {
            inner: ReceiverStream::new(rx),
        })
    }

    /// Requests a cooperative shutdown of the running crawl
    pub fn shutdown(&self) {
        self.shutdown_handle().shutdown();
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            token: self.engine.shutdown.clone(),
        }
    }

    /// Counters of the filter chain, for diagnostics
    pub fn filter_stats(&self) -> FilterStats {
        self.engine.filter_chain.stats()
    }

    fn begin(&self, start_url: &str) -> Result<Url, CrawlError> {
        let start = normalize_url(start_url)?;
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(CrawlError::AlreadyStarted);
        }
        Ok(start)
    }
}

type Fetch = BoxFuture<'static, (Candidate, FetchOutcome)>;

/// Fetches currently running, in the order the strategy emits them
enum InFlight {
    Ordered(FuturesOrdered<Fetch>),
    Unordered(FuturesUnordered<Fetch>),
}

impl InFlight {
    fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::BestFirst => Self::Unordered(FuturesUnordered::new()),
            Strategy::Bfs | Strategy::Dfs => Self::Ordered(FuturesOrdered::new()),
        }
    }

    fn push(&mut self, fetch: Fetch) {
        match self {
            Self::Ordered(queue) => queue.push_back(fetch),
            Self::Unordered(set) => set.push(fetch),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Ordered(queue) => queue.len(),
            Self::Unordered(set) => set.len(),
        }
    }

    async fn next(&mut self) -> Option<(Candidate, FetchOutcome)> {
        match self {
            Self::Ordered(queue) => queue.next().await,
            Self::Unordered(set) => set.next().await,
        }
    }
}

/// Where emitted results go
enum Sink<'a> {
    Buffer(&'a mut Vec<CrawlResult>),
    Channel(mpsc::Sender<CrawlResult>),
}

impl Sink<'_> {
    /// Delivers a result; false once nobody is listening
    async fn emit(&mut self, result: CrawlResult) -> bool {
        match self {
            Self::Buffer(results) => {
                results.push(result);
                true
            }
            Self::Channel(tx) => tx.send(result).await.is_ok(),
        }
    }
}

/// Read-only state shared by a run
#[derive(Clone)]
struct Engine {
    strategy: Strategy,
    budgets: Budgets,
    include_external: bool,
    concurrency: usize,
    batch_size: usize,
    fetcher: Arc<dyn Fetcher>,
    filter_chain: Arc<FilterChain>,
    scorer: Option<Arc<Scorer>>,
    shutdown: CancellationToken,
}

impl Engine {
    async fn drive(&self, start: Url, mut sink: Sink<'_>) {
        let start_time = Instant::now();
        let start_host = start.host_str().map(str::to_string);

        tracing::info!(
            "Starting {} crawl from {} (max depth {}, max pages {})",
            self.strategy,
            start,
            self.budgets.max_depth,
            self.budgets.max_pages
        );

        let mut scheduler = Scheduler::new(self.strategy, self.budgets, self.concurrency);
        scheduler.seed(start);

        let mut in_flight = InFlight::for_strategy(self.strategy);
        let mut emitted: u64 = 0;

        loop {
            let mut slots = self.open_slots(in_flight.len());
            while slots > 0 && !self.shutdown.is_cancelled() {
                let Some(candidate) = scheduler.next_candidate() else {
                    break;
                };

                tracing::debug!(
                    "Dispatching {} (depth {}, score {:.3})",
                    candidate.url,
                    candidate.depth,
                    candidate.score
                );
                in_flight.push(self.dispatch(candidate, scheduler.permits()));
                slots -= 1;
            }

            let Some((candidate, outcome)) = in_flight.next().await else {
                break;
            };

            if outcome.success {
                self.queue_links(&mut scheduler, &candidate, &outcome, start_host.as_deref());
            } else {
                tracing::debug!(
                    "Fetch failed for {}: {}",
                    candidate.url,
                    outcome.error_message.as_deref().unwrap_or("unknown error")
                );
            }

            let result = CrawlResult::new(candidate, &outcome);
            emitted += 1;

            if emitted % 10 == 0 {
                let rate = emitted as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                    emitted,
                    scheduler.frontier_size(),
                    rate
                );
            }

            if !sink.emit(result).await {
                tracing::info!("Result stream dropped, stopping crawl");
                break;
            }
        }

        if self.shutdown.is_cancelled() {
            tracing::info!(
                "Crawl shut down: {} pages crawled ({} dispatched) in {:?}",
                emitted,
                scheduler.dispatched(),
                start_time.elapsed()
            );
        } else {
            tracing::info!(
                "Crawl completed: {} pages crawled ({} dispatched) in {:?}",
                emitted,
                scheduler.dispatched(),
                start_time.elapsed()
            );
        }
    }

    /// How many candidates may be dispatched right now
    fn open_slots(&self, in_flight: usize) -> usize {
        match self.strategy {
            Strategy::Bfs => self.concurrency.saturating_sub(in_flight),
            Strategy::Dfs => usize::from(in_flight == 0),
            Strategy::BestFirst if in_flight == 0 => self.batch_size,
            Strategy::BestFirst => 0,
        }
    }

    fn dispatch(&self, candidate: Candidate, permits: Arc<Semaphore>) -> Fetch {
        let fetcher = Arc::clone(&self.fetcher);

        async move {
            let _permit = permits.acquire_owned().await.ok();
            let outcome = fetcher.fetch(&candidate.url).await;
            (candidate, outcome)
        }
        .boxed()
    }

    /// Runs the discovered links of a fetched page through domain policy,
    /// filter chain and scorer, then queues the survivors
    fn queue_links(
        &self,
        scheduler: &mut Scheduler,
        parent: &Candidate,
        outcome: &FetchOutcome,
        start_host: Option<&str>,
    ) {
        let depth = parent.depth + 1;
        if !scheduler.within_depth(depth) {
            return;
        }

        let page = PageMeta::from(outcome);
        let ctx = ScoreContext {
            page: Some(&page),
            depth,
        };

        let mut seen = HashSet::new();
        let mut admitted = Vec::new();

        for link in &outcome.discovered_links {
            let url = match normalize_url(link) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!("Ignoring link {}: {}", link, e);
                    continue;
                }
            };

            if scheduler.is_visited(&url) || !seen.insert(url.as_str().to_string()) {
                continue;
            }

            if !self.include_external && url.host_str() != start_host {
                tracing::debug!("Skipping external link {}", url);
                continue;
            }

            if !self.filter_chain.admit(&url, Some(&page)) {
                tracing::debug!("Filtered out {}", url);
                continue;
            }

            let score = self.scorer.as_ref().map_or(0.0, |s| s.score(&url, &ctx));
            admitted.push((url, score));
        }

        let queued = scheduler.enqueue_children(parent, admitted);
        tracing::trace!("Queued {} links from {}", queued, parent.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Serves a fixed link graph; unknown URLs fail
    struct MapFetcher {
        pages: HashMap<String, Vec<String>>,
    }

    impl MapFetcher {
        fn new(edges: &[(&str, &[&str])]) -> Arc<Self> {
            let pages = edges
                .iter()
                .map(|(page, links)| {
                    (
                        format!("https://site.test{}", page),
                        links
                            .iter()
                            .map(|l| format!("https://site.test{}", l))
                            .collect(),
                    )
                })
                .collect();
            Arc::new(Self { pages })
        }
    }

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, url: &Url) -> FetchOutcome {
            match self.pages.get(url.as_str()) {
                Some(links) => FetchOutcome {
                    success: true,
                    url: url.to_string(),
                    discovered_links: links.clone(),
                    status_code: Some(200),
                    ..FetchOutcome::default()
                },
                None => FetchOutcome {
                    status_code: Some(404),
                    ..FetchOutcome::failure(url.as_str(), "HTTP 404 Not Found")
                },
            }
        }
    }

    fn small_graph() -> Arc<MapFetcher> {
        MapFetcher::new(&[("/", &["/a", "/b"]), ("/a", &["/c"]), ("/b", &[]), ("/c", &[])])
    }

    fn paths(results: &[CrawlResult]) -> Vec<String> {
        results
            .iter()
            .map(|r| r.url.trim_start_matches("https://site.test").to_string())
            .collect()
    }

    #[test]
    fn test_builder_validation() {
        let fetcher = small_graph();

        assert!(Crawler::builder(Strategy::Bfs)
            .max_pages(0)
            .build(fetcher.clone())
            .is_err());
        assert!(Crawler::builder(Strategy::Bfs)
            .concurrency(0)
            .build(fetcher.clone())
            .is_err());
        assert!(Crawler::builder(Strategy::Bfs)
            .concurrency(101)
            .build(fetcher.clone())
            .is_err());
        assert!(Crawler::builder(Strategy::BestFirst)
            .batch_size(0)
            .build(fetcher.clone())
            .is_err());
        assert!(Crawler::builder(Strategy::Bfs).build(fetcher).is_ok());
    }

    #[tokio::test]
    async fn test_max_depth_excludes_deeper_pages() {
        let crawler = Crawler::builder(Strategy::Bfs)
            .max_depth(1)
            .build(small_graph())
            .unwrap();

        let results = crawler.run_batch("https://site.test/").await.unwrap();
        assert_eq!(paths(&results), vec!["/", "/a", "/b"]);
    }

    #[tokio::test]
    async fn test_default_bfs_depth_is_one() {
        let crawler = Crawler::builder(Strategy::Bfs).build(small_graph()).unwrap();

        let results = crawler.run_batch("https://site.test/").await.unwrap();
        assert!(results.iter().all(|r| r.metadata.depth <= 1));
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_max_pages_includes_start() {
        let crawler = Crawler::builder(Strategy::Bfs)
            .max_depth(5)
            .max_pages(2)
            .build(small_graph())
            .unwrap();

        let results = crawler.run_batch("https://site.test/").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://site.test/");
        assert_eq!(results[0].metadata.depth, 0);
    }

    #[tokio::test]
    async fn test_dfs_exhausts_first_branch() {
        let crawler = Crawler::builder(Strategy::Dfs).build(small_graph()).unwrap();

        let results = crawler.run_batch("https://site.test/").await.unwrap();
        assert_eq!(paths(&results), vec!["/", "/a", "/c", "/b"]);
        assert_eq!(results[2].metadata.parent_url.as_deref(), Some("https://site.test/a"));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_emitted_and_not_expanded() {
        let fetcher = MapFetcher::new(&[("/", &["/missing", "/ok"]), ("/ok", &[])]);
        let crawler = Crawler::builder(Strategy::Bfs).build(fetcher).unwrap();

        let results = crawler.run_batch("https://site.test/").await.unwrap();
        let missing = results
            .iter()
            .find(|r| r.url.ends_with("/missing"))
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(!missing.success);
        assert_eq!(missing.status_code, Some(404));
        assert!(missing.error.is_some());
    }

    #[tokio::test]
    async fn test_second_run_is_rejected() {
        let crawler = Crawler::builder(Strategy::Bfs).build(small_graph()).unwrap();

        assert!(matches!(
            crawler.run_batch("not a url").await,
            Err(CrawlError::Url(_))
        ));
        crawler.run_batch("https://site.test/").await.unwrap();
        assert!(matches!(
            crawler.run_batch("https://site.test/").await,
            Err(CrawlError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn test_shutdown_before_run_dispatches_nothing() {
        let crawler = Crawler::builder(Strategy::Bfs).build(small_graph()).unwrap();
        let handle = crawler.shutdown_handle();

        handle.shutdown();
        handle.shutdown();
        assert!(handle.is_shutdown());

        let results = crawler.run_batch("https://site.test/").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_stream_delivery() {
        let crawler = Crawler::builder(Strategy::Bfs)
            .delivery(DeliveryMode::Stream)
            .build(small_graph())
            .unwrap();

        let output = crawler.run("https://site.test/").await.unwrap();
        assert!(matches!(output, CrawlOutput::Stream(_)));

        let results = output.collect().await;
        assert_eq!(paths(&results), vec!["/", "/a", "/b"]);
    }

    #[tokio::test]
    async fn test_start_url_is_normalized() {
        let crawler = Crawler::builder(Strategy::Bfs)
            .max_depth(0)
            .build(small_graph())
            .unwrap();

        let results = crawler.run_batch("https://SITE.test/#top").await.unwrap();
        assert_eq!(paths(&results), vec!["/"]);
        assert!(results[0].success);
    }
}
