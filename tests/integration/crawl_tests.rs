//! Integration tests for the crawler
//!
//! Most tests drive the crawler with an in-memory link graph. The last ones
//! use wiremock to run the full fetch, parse and crawl cycle over HTTP.

use async_trait::async_trait;
use deep_crawl::config::parse_config;
use deep_crawl::filter::UrlPatternFilter;
use deep_crawl::scorer::{KeywordScorer, PathDepthScorer};
use deep_crawl::{
    CompositeScorer, CrawlError, CrawlResult, Crawler, DeliveryMode, FetchOutcome, Fetcher, FilterChain,
    FilterMode, HttpFetcher, Strategy,
};
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE: &str = "https://site.test";

/// Serves a fixed link graph, optionally slowing every fetch down
struct GraphFetcher {
    pages: HashMap<String, Vec<String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl GraphFetcher {
    /// Paths are relative to `SITE` unless they carry their own scheme
    fn new(edges: &[(&str, &[&str])]) -> Self {
        let pages = edges
            .iter()
            .map(|(page, links)| (absolute(page), links.iter().map(|l| absolute(l)).collect()))
            .collect();

        Self {
            pages,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches started so far
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for GraphFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.pages.get(url.as_str()) {
            Some(links) => FetchOutcome {
                success: true,
                url: url.to_string(),
                discovered_links: links.clone(),
                status_code: Some(200),
                title: Some(format!("Page {}", url.path())),
                ..FetchOutcome::default()
            },
            None => FetchOutcome {
                status_code: Some(404),
                ..FetchOutcome::failure(url.as_str(), "HTTP 404 Not Found")
            },
        }
    }
}

fn absolute(link: &str) -> String {
    if link.contains("://") {
        link.to_string()
    } else {
        format!("{}{}", SITE, link)
    }
}

/// Result URLs with the test site prefix removed
fn paths(results: &[CrawlResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| r.url.trim_start_matches(SITE).to_string())
        .collect()
}

fn path_set(results: &[CrawlResult]) -> HashSet<String> {
    paths(results).into_iter().collect()
}

fn shallow_graph() -> Arc<GraphFetcher> {
    Arc::new(GraphFetcher::new(&[
        ("/", &["/a", "/b"]),
        ("/a", &["/c"]),
        ("/b", &[]),
        ("/c", &[]),
    ]))
}

/// Three-level binary tree rooted at `/`
fn binary_tree() -> Arc<GraphFetcher> {
    Arc::new(GraphFetcher::new(&[
        ("/", &["/l", "/r"]),
        ("/l", &["/l/l", "/l/r"]),
        ("/r", &["/r/l", "/r/r"]),
        ("/l/l", &[]),
        ("/l/r", &[]),
        ("/r/l", &[]),
        ("/r/r", &[]),
    ]))
}

#[tokio::test]
async fn test_max_depth_excludes_deeper_pages() {
    let crawler = Crawler::builder(Strategy::Bfs)
        .max_depth(1)
        .build(shallow_graph())
        .unwrap();

    let results = crawler.run_batch(SITE).await.unwrap();

    let expected: HashSet<String> = ["/", "/a", "/b"].iter().map(|s| s.to_string()).collect();
    assert_eq!(path_set(&results), expected);
}

#[tokio::test]
async fn test_max_pages_always_includes_start() {
    for strategy in [Strategy::Bfs, Strategy::Dfs, Strategy::BestFirst] {
        let crawler = Crawler::builder(strategy)
            .max_depth(5)
            .max_pages(2)
            .build(shallow_graph())
            .unwrap();

        let results = crawler.run_batch(SITE).await.unwrap();

        assert_eq!(results.len(), 2, "strategy {}", strategy);
        assert!(paths(&results).contains(&"/".to_string()));
    }
}

#[tokio::test]
async fn test_no_url_emitted_twice() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/a", "/b", "/a", "/"]),
        ("/a", &["/", "/b", "/c"]),
        ("/b", &["/a", "/c", "/b"]),
        ("/c", &["/", "/a"]),
    ]));

    for strategy in [Strategy::Bfs, Strategy::Dfs, Strategy::BestFirst] {
        let crawler = Crawler::builder(strategy)
            .max_depth(5)
            .concurrency(3)
            .build(fetcher.clone())
            .unwrap();

        let results = crawler.run_batch(SITE).await.unwrap();

        assert_eq!(results.len(), 4, "strategy {}", strategy);
        assert_eq!(path_set(&results).len(), 4, "strategy {}", strategy);
    }
}

#[tokio::test]
async fn test_child_depth_is_parent_depth_plus_one() {
    let crawler = Crawler::builder(Strategy::Bfs)
        .max_depth(3)
        .build(binary_tree())
        .unwrap();

    let results = crawler.run_batch(SITE).await.unwrap();
    let depths: HashMap<&str, u32> = results
        .iter()
        .map(|r| (r.url.as_str(), r.metadata.depth))
        .collect();

    assert_eq!(results.len(), 7);
    for result in &results {
        match &result.metadata.parent_url {
            None => {
                assert_eq!(result.metadata.depth, 0);
                assert_eq!(result.url, format!("{}/", SITE));
            }
            Some(parent) => {
                assert_eq!(result.metadata.depth, depths[parent.as_str()] + 1);
            }
        }
        assert!(result.metadata.depth <= 3);
    }
}

#[tokio::test]
async fn test_bfs_finishes_each_level_first() {
    let fetcher = Arc::new(
        GraphFetcher::new(&[
            ("/", &["/l", "/r"]),
            ("/l", &["/l/l", "/l/r"]),
            ("/r", &["/r/l", "/r/r"]),
            ("/l/l", &[]),
            ("/l/r", &[]),
            ("/r/l", &[]),
            ("/r/r", &[]),
        ])
        .with_delay(Duration::from_millis(5)),
    );

    let crawler = Crawler::builder(Strategy::Bfs)
        .max_depth(2)
        .concurrency(4)
        .build(fetcher)
        .unwrap();

    let results = crawler.run_batch(SITE).await.unwrap();
    let depths: Vec<u32> = results.iter().map(|r| r.metadata.depth).collect();

    assert_eq!(results.len(), 7);
    assert!(depths.windows(2).all(|w| w[0] <= w[1]), "{:?}", depths);
}

#[tokio::test]
async fn test_dfs_exhausts_branch_before_sibling() {
    let crawler = Crawler::builder(Strategy::Dfs)
        .max_depth(2)
        .build(binary_tree())
        .unwrap();

    let results = crawler.run_batch(SITE).await.unwrap();

    assert_eq!(
        paths(&results),
        vec!["/", "/l", "/l/l", "/l/r", "/r", "/r/l", "/r/r"]
    );
}

#[tokio::test]
async fn test_block_pattern_never_fetched() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/login/form", "/a"]),
        ("/a", &["/login/reset", "/b"]),
        ("/b", &[]),
        ("/login/form", &["/secret"]),
        ("/login/reset", &[]),
        ("/secret", &[]),
    ]));

    let chain = FilterChain::new()
        .with_filter(UrlPatternFilter::new(&["*/login/*"], FilterMode::Block, false).unwrap());

    let crawler = Crawler::builder(Strategy::Bfs)
        .max_depth(5)
        .filter_chain(chain)
        .build(fetcher)
        .unwrap();

    let results = crawler.run_batch(SITE).await.unwrap();

    assert!(results.iter().all(|r| !r.url.contains("/login/")));
    assert_eq!(paths(&results), vec!["/", "/a", "/b"]);

    let stats = crawler.filter_stats();
    assert_eq!(stats.considered, 4);
    assert_eq!(stats.blocked, 2);
    assert_eq!(stats.allowed, 2);
}

#[tokio::test]
async fn test_allow_pattern_does_not_apply_to_start_url() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/docs/intro", "/blog/news"]),
        ("/docs/intro", &[]),
        ("/blog/news", &[]),
    ]));

    let chain = FilterChain::new()
        .with_filter(UrlPatternFilter::new(&["*/docs/*"], FilterMode::Allow, false).unwrap());

    let crawler = Crawler::builder(Strategy::Bfs)
        .filter_chain(chain)
        .build(fetcher)
        .unwrap();

    let results = crawler.run_batch(SITE).await.unwrap();

    assert_eq!(paths(&results), vec!["/", "/docs/intro"]);
}

#[tokio::test]
async fn test_external_links() {
    let edges: &[(&str, &[&str])] = &[
        ("/", &["/a", "https://other.test/x"]),
        ("/a", &[]),
        ("https://other.test/x", &[]),
    ];

    let internal_only = Crawler::builder(Strategy::Bfs)
        .build(Arc::new(GraphFetcher::new(edges)))
        .unwrap();
    let results = internal_only.run_batch(SITE).await.unwrap();
    assert!(results.iter().all(|r| r.url.starts_with(SITE)));
    assert_eq!(results.len(), 2);

    let with_external = Crawler::builder(Strategy::Bfs)
        .include_external(true)
        .build(Arc::new(GraphFetcher::new(edges)))
        .unwrap();
    let results = with_external.run_batch(SITE).await.unwrap();
    assert!(results.iter().any(|r| r.url == "https://other.test/x"));
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_stream_and_batch_yield_same_set() {
    let batch = Crawler::builder(Strategy::Bfs)
        .max_depth(2)
        .build(binary_tree())
        .unwrap()
        .run_batch(SITE)
        .await
        .unwrap();

    let crawler = Crawler::builder(Strategy::Bfs)
        .max_depth(2)
        .delivery(DeliveryMode::Stream)
        .build(binary_tree())
        .unwrap();
    let streamed = crawler.run(SITE).await.unwrap().collect().await;

    assert_eq!(path_set(&batch), path_set(&streamed));
    assert_eq!(batch.len(), streamed.len());
}

/// A start page linking to `fan_out` leaf pages, each fetch taking 20ms
fn slow_fan_out(fan_out: usize) -> Arc<GraphFetcher> {
    let links: Vec<String> = (0..fan_out).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let mut edges: Vec<(&str, &[&str])> = vec![("/", link_refs.as_slice())];
    edges.extend(link_refs.iter().map(|l| (*l, &[] as &[&str])));

    Arc::new(GraphFetcher::new(&edges).with_delay(Duration::from_millis(20)))
}

#[tokio::test]
async fn test_shutdown_mid_stream_stops_early() {
    let fetcher = slow_fan_out(30);
    let crawler = Crawler::builder(Strategy::Bfs)
        .concurrency(2)
        .build(fetcher)
        .unwrap();
    let handle = crawler.shutdown_handle();

    let mut stream = crawler.run_stream(SITE).unwrap();
    let mut results = Vec::new();

    while let Some(result) = stream.next().await {
        results.push(result);
        if results.len() == 2 {
            handle.shutdown();
            handle.shutdown();
        }
    }

    assert!(handle.is_shutdown());
    assert!(results.len() >= 2);
    assert!(results.len() < 31, "crawl did not stop: {}", results.len());
}

#[tokio::test]
async fn test_shutdown_mid_batch_drains_in_flight() {
    let fetcher = slow_fan_out(50);
    let crawler = Arc::new(
        Crawler::builder(Strategy::Bfs)
            .concurrency(4)
            .build(fetcher.clone())
            .unwrap(),
    );

    let run = tokio::spawn({
        let crawler = Arc::clone(&crawler);
        async move { crawler.run_batch(SITE).await }
    });

    tokio::time::sleep(Duration::from_millis(70)).await;
    crawler.shutdown();

    let results = run.await.unwrap().unwrap();

    // Every fetch that was started made it into the results
    assert_eq!(results.len(), fetcher.calls());
    assert!(!results.is_empty());
    assert!(results.len() < 51, "crawl did not stop: {}", results.len());
    assert_eq!(path_set(&results).len(), results.len());
}

#[tokio::test]
async fn test_failed_fetch_consumes_budget() {
    let fetcher = Arc::new(GraphFetcher::new(&[("/", &["/missing", "/a"]), ("/a", &[])]));

    let crawler = Crawler::builder(Strategy::Bfs)
        .max_pages(2)
        .build(fetcher)
        .unwrap();

    let results = crawler.run_batch(SITE).await.unwrap();

    assert_eq!(paths(&results), vec!["/", "/missing"]);
    assert!(!results[1].success);
    assert_eq!(results[1].status_code, Some(404));
    assert!(results[1].error.is_some());
}

#[tokio::test]
async fn test_crawler_runs_once() {
    let crawler = Crawler::builder(Strategy::Dfs)
        .build(shallow_graph())
        .unwrap();

    crawler.run_batch(SITE).await.unwrap();
    let second = crawler.run_batch(SITE).await;

    assert!(matches!(second, Err(CrawlError::AlreadyStarted)));
}

/// Average score of results whose URL mentions `keyword`
fn average_matching_score(results: &[CrawlResult], keyword: &str) -> f64 {
    let scores: Vec<f64> = results
        .iter()
        .filter(|r| r.url.contains(keyword))
        .map(|r| r.metadata.score)
        .collect();
    scores.iter().sum::<f64>() / scores.len() as f64
}

#[tokio::test]
async fn test_best_first_keyword_weight() {
    let edges: &[(&str, &[&str])] = &[
        ("/", &["/docs/guide", "/blog/post", "/docs/api", "/about"]),
        ("/docs/guide", &[]),
        ("/blog/post", &[]),
        ("/docs/api", &[]),
        ("/about", &[]),
    ];

    let mut averages = Vec::new();
    for weight in [1.0, 0.1] {
        let crawler = Crawler::builder(Strategy::BestFirst)
            .batch_size(1)
            .scorer(KeywordScorer::new(&["docs"], weight, false).unwrap())
            .build(Arc::new(GraphFetcher::new(edges)))
            .unwrap();

        let results = crawler.run_batch(SITE).await.unwrap();

        assert_eq!(
            paths(&results),
            vec!["/", "/docs/guide", "/docs/api", "/blog/post", "/about"]
        );
        averages.push(average_matching_score(&results, "docs"));
    }

    assert!((averages[0] - 1.0).abs() < 1e-9);
    assert!((averages[1] - 0.1).abs() < 1e-9);
    assert!(averages[0] >= averages[1]);
}

#[tokio::test]
async fn test_best_first_composite_weight() {
    let edges: &[(&str, &[&str])] = &[
        ("/", &["/docs/guide", "/blog/post/2024", "/docs/api", "/about"]),
        ("/docs/guide", &[]),
        ("/blog/post/2024", &[]),
        ("/docs/api", &[]),
        ("/about", &[]),
    ];

    let mut runs = Vec::new();
    for keyword_weight in [1.0, 0.1] {
        let scorer = CompositeScorer::new()
            .with_weight(KeywordScorer::new(&["docs"], 1.0, false).unwrap(), keyword_weight)
            .unwrap()
            .with(PathDepthScorer::new(1, 0.5, false).unwrap());

        let crawler = Crawler::builder(Strategy::BestFirst)
            .batch_size(1)
            .scorer(scorer)
            .build(Arc::new(GraphFetcher::new(edges)))
            .unwrap();

        runs.push(crawler.run_batch(SITE).await.unwrap());
    }

    let heavy = average_matching_score(&runs[0], "docs");
    let light = average_matching_score(&runs[1], "docs");
    assert!(heavy >= light, "{} < {}", heavy, light);

    // Docs pages lead only when the keyword child outweighs the path depth
    assert_eq!(
        paths(&runs[0]),
        vec!["/", "/docs/guide", "/docs/api", "/about", "/blog/post/2024"]
    );
    assert_eq!(
        paths(&runs[1]),
        vec!["/", "/about", "/docs/guide", "/docs/api", "/blog/post/2024"]
    );
}

#[tokio::test]
async fn test_config_drives_crawler() {
    let config = parse_config(
        r#"
[crawl]
strategy = "dfs"
max-depth = 1
max-pages = "unbounded"

[[filters]]
kind = "url-pattern"
patterns = ["*/b"]
mode = "block"
"#,
    )
    .unwrap();

    let crawler = config.to_builder().unwrap().build(shallow_graph()).unwrap();
    assert_eq!(crawler.strategy(), Strategy::Dfs);

    let results = crawler.run(SITE).await.unwrap().collect().await;
    assert_eq!(paths(&results), vec!["/", "/a"]);
}

#[tokio::test]
async fn test_http_crawl_with_mock_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r#"<html><head><title>Home</title></head><body>
                    <a href="/page1">Page 1</a>
                    <a href="/gone">Gone</a>
                    <a href="mailto:someone@example.com">Mail</a>
                    </body></html>"#,
                    "text/html",
                ),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r#"<html><head><title>Page 1</title></head><body>
                    <a href="/">Home</a>
                    <a href="/page2">Page 2</a>
                    </body></html>"#,
                    "text/html",
                ),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = parse_config("").unwrap();
    let fetcher = Arc::new(HttpFetcher::new(&config.http).unwrap());
    let crawler = Crawler::builder(Strategy::Bfs)
        .max_depth(1)
        .build(fetcher)
        .unwrap();

    let results = crawler.run_batch(&base_url).await.unwrap();

    let by_path: HashMap<String, &CrawlResult> = results
        .iter()
        .map(|r| (Url::parse(&r.url).unwrap().path().to_string(), r))
        .collect();

    assert_eq!(results.len(), 3);
    assert!(by_path["/"].success);
    assert!(by_path["/page1"].success);
    assert_eq!(by_path["/page1"].metadata.depth, 1);
    assert_eq!(by_path["/page1"].metadata.parent_url.as_deref(), Some(results[0].url.as_str()));
    assert!(!by_path["/gone"].success);
    assert_eq!(by_path["/gone"].status_code, Some(404));
    assert!(!by_path.contains_key("/page2"));
}
