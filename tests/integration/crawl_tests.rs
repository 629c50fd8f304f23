//! Integration tests for the crawl engine
//!
//! These tests use wiremock to stand in for the job sites and drive the
//! adapters and the orchestrator end-to-end over real HTTP. The rendered
//! source runs against an in-memory browser session.

use async_trait::async_trait;
use job_trawl::crawler::{
    BrowserLauncher, BrowserSession, CrawlPlan, HttpFetcher, Orchestrator, PacingPolicy,
    PagedHttpAdapter, RunStatus, ScrollAdapter, SourceAdapter, StopReason,
};
use job_trawl::sources::{Glassdoor, Indeed, LinkedIn};
use job_trawl::{CrawlRequest, JobRecord, Limit, Source, TrawlError};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    HttpFetcher::new("TestAgent/1.0", Duration::from_secs(5)).expect("Failed to build client")
}

fn unpaced() -> Arc<PacingPolicy> {
    Arc::new(PacingPolicy::unpaced())
}

fn indeed_adapter(base_url: &str) -> PagedHttpAdapter<Indeed> {
    PagedHttpAdapter::new(Indeed::new(base_url), fetcher(), unpaced(), 50)
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html")
}

/// An Indeed results page with one card per job id
fn indeed_listing(job_ids: &[u32], next_start: Option<u32>) -> String {
    let cards: String = job_ids
        .iter()
        .map(|id| {
            format!(
                r#"<div class="cardOutline job_seen_beacon"><h2><a class="jcs-JobTitle css-jspxzf" href="/viewjob?jk={}&from=serp">Job {}</a></h2></div>"#,
                id, id
            )
        })
        .collect();
    let next = next_start
        .map(|start| format!(r#"<a aria-label="Next Page" href="/jobs?start={}">Next</a>"#, start))
        .unwrap_or_default();
    format!("<html><body>{}<nav>{}</nav></body></html>", cards, next)
}

/// An Indeed job page; a missing description makes the page unusable
fn indeed_job(title: &str, description: Option<&str>) -> String {
    let description = description
        .map(|d| format!(r#"<div id="jobDescriptionText">{}</div>"#, d))
        .unwrap_or_default();
    format!(
        r#"<html><body>
        <h1 class="jobsearch-JobInfoHeader-title">{}</h1>
        <div data-testid="jobsearch-JobInfoHeader-subtitle">
            <span data-testid="inlineHeader-companyName">Acme Corp</span>
            <div>Remote</div>
        </div>
        {}
        </body></html>"#,
        title, description
    )
}

async fn mount_indeed_job(server: &MockServer, id: u32, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/viewjob"))
        .and(query_param("jk", id.to_string().as_str()))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_indeed_listing(server: &MockServer, start: u32, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("start", start.to_string().as_str()))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_limit_stops_before_third_job() {
    let server = MockServer::start().await;

    mount_indeed_listing(&server, 0, indeed_listing(&[1, 2, 3], Some(10)), 1).await;
    mount_indeed_listing(&server, 10, indeed_listing(&[4], None), 0).await;
    mount_indeed_job(&server, 1, indeed_job("Data Engineer", Some("Spark")), 1).await;
    mount_indeed_job(&server, 2, indeed_job("Data Engineer II", Some("Kafka")), 1).await;
    mount_indeed_job(&server, 3, indeed_job("Data Engineer III", Some("dbt")), 0).await;

    let adapter = indeed_adapter(&server.uri());
    let request = CrawlRequest::new("data engineer", "remote", Limit::bounded(2).unwrap());
    let records = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed")
        .records;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title(), "Data Engineer");
    assert_eq!(records[1].title(), "Data Engineer II");
    assert!(records.iter().all(|r| r.source() == Source::Indeed));
    assert_eq!(records[0].url(), format!("{}/viewjob?jk=1", server.uri()));
    assert_eq!(records[0].location(), Some("Remote"));
}

#[tokio::test]
async fn test_missing_required_field_skips_only_that_job() {
    let server = MockServer::start().await;

    mount_indeed_listing(&server, 0, indeed_listing(&[1, 2], None), 1).await;
    mount_indeed_job(&server, 1, indeed_job("No Description", None), 1).await;
    mount_indeed_job(&server, 2, indeed_job("Complete", Some("Airflow")), 1).await;

    let adapter = indeed_adapter(&server.uri());
    let request = CrawlRequest::new("data engineer", "remote", Limit::Unbounded);
    let records = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed")
        .records;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title(), "Complete");
    assert_eq!(records[0].description(), "Airflow");
}

#[tokio::test]
async fn test_unbounded_stops_when_listing_exhausted() {
    let server = MockServer::start().await;

    mount_indeed_listing(&server, 0, indeed_listing(&[1, 2], Some(10)), 1).await;
    mount_indeed_listing(&server, 10, indeed_listing(&[3], None), 1).await;
    mount_indeed_listing(&server, 20, indeed_listing(&[4], None), 0).await;
    for id in 1..=3 {
        mount_indeed_job(&server, id, indeed_job(&format!("Job {}", id), Some("text")), 1).await;
    }

    let adapter = indeed_adapter(&server.uri());
    let request = CrawlRequest::new("rust", "remote", Limit::Unbounded);
    let records = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed")
        .records;

    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let server = MockServer::start().await;

    // The same posting appears twice, once with a tracking parameter
    let listing = format!(
        r#"<html><body>
        <div class="job_seen_beacon"><a class="jcs-JobTitle" href="/viewjob?jk=1&from=serp">A</a></div>
        <div class="job_seen_beacon"><a class="jcs-JobTitle" href="/viewjob?jk=2">B</a></div>
        <div class="job_seen_beacon"><a class="jcs-JobTitle" href="{}/viewjob?jk=1">A again</a></div>
        </body></html>"#,
        server.uri()
    );
    mount_indeed_listing(&server, 0, listing, 1).await;
    mount_indeed_job(&server, 1, indeed_job("A", Some("a")), 1).await;
    mount_indeed_job(&server, 2, indeed_job("B", Some("b")), 1).await;

    let adapter = indeed_adapter(&server.uri());
    let request = CrawlRequest::new("rust", "remote", Limit::Unbounded);
    let records = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed")
        .records;

    let urls: HashSet<&str> = records.iter().map(JobRecord::url).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(urls.len(), 2);
}

#[tokio::test]
async fn test_listing_http_error_yields_no_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = indeed_adapter(&server.uri());
    let request = CrawlRequest::new("rust", "remote", Limit::bounded(5).unwrap());
    let crawl = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Page failures must not surface as errors");

    assert!(crawl.records.is_empty());
    assert_eq!(crawl.stop, StopReason::PageFailed);
    assert!(crawl.listing_failed());
}

#[tokio::test]
async fn test_empty_listing_stops_paging() {
    let server = MockServer::start().await;

    mount_indeed_listing(&server, 0, indeed_listing(&[], Some(10)), 1).await;
    mount_indeed_listing(&server, 10, indeed_listing(&[1], None), 0).await;

    let adapter = indeed_adapter(&server.uri());
    let request = CrawlRequest::new("rust", "remote", Limit::Unbounded);
    let records = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed")
        .records;

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_cancelled_crawl_fetches_nothing() {
    let server = MockServer::start().await;
    mount_indeed_listing(&server, 0, indeed_listing(&[1], None), 0).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let adapter = indeed_adapter(&server.uri());
    let request = CrawlRequest::new("rust", "remote", Limit::Unbounded);
    let records = adapter
        .crawl(&request, &cancel)
        .await
        .expect("Crawl failed")
        .records;

    assert!(records.is_empty());
}

fn glassdoor_listing(job_ids: &[u32], next: Option<&str>, disabled: bool) -> String {
    let cards: String = job_ids
        .iter()
        .map(|id| {
            format!(
                r#"<li class="react-job-listing css-bkasv9"><a class="jobLink css-1rd3saf" href="/partner/jobListing.htm?jobListingId={}">Job {}</a></li>"#,
                id, id
            )
        })
        .collect();
    let next = next
        .map(|href| {
            let class = if disabled { "next disabled" } else { "next" };
            format!(r#"<li class="{}"><a href="{}">Next</a></li>"#, class, href)
        })
        .unwrap_or_default();
    format!("<html><body><ul>{}</ul><ul>{}</ul></body></html>", cards, next)
}

fn glassdoor_job(title: &str) -> String {
    format!(
        r#"<html><body>
        <div class="css-16nw49e e1tk4kwz1">{}</div>
        <div class="css-87uc0g e1tk4kwz4">Initech</div>
        <div class="css-56kyx5 e1tk4kwz5">Austin, TX</div>
        <div id="JobDescriptionContainer"><p>Python and SQL</p></div>
        </body></html>"#,
        title
    )
}

#[tokio::test]
async fn test_glassdoor_follows_next_link() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Job/remote-data-engineer-jobs-SRCH_IP1.htm"))
        .respond_with(html(glassdoor_listing(
            &[1, 2],
            Some("/Job/remote-data-engineer-jobs-SRCH_IP2.htm"),
            false,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Job/remote-data-engineer-jobs-SRCH_IP2.htm"))
        .respond_with(html(glassdoor_listing(
            &[3],
            Some("/Job/remote-data-engineer-jobs-SRCH_IP3.htm"),
            true,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Job/remote-data-engineer-jobs-SRCH_IP3.htm"))
        .respond_with(html(glassdoor_listing(&[4], None, false)))
        .expect(0)
        .mount(&server)
        .await;
    for id in 1..=3 {
        Mock::given(method("GET"))
            .and(path("/partner/jobListing.htm"))
            .and(query_param("jobListingId", id.to_string().as_str()))
            .respond_with(html(glassdoor_job(&format!("Engineer {}", id))))
            .expect(1)
            .mount(&server)
            .await;
    }

    let adapter = PagedHttpAdapter::new(Glassdoor::new(server.uri()), fetcher(), unpaced(), 50);
    let request = CrawlRequest::new("data engineer", "remote", Limit::Unbounded);
    let records = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed")
        .records;

    let titles: Vec<&str> = records.iter().map(JobRecord::title).collect();
    assert_eq!(titles, vec!["Engineer 1", "Engineer 2", "Engineer 3"]);
    assert!(records.iter().all(|r| r.source() == Source::Glassdoor));
}

#[tokio::test]
async fn test_page_ceiling_bounds_listing_fetches() {
    let server = MockServer::start().await;

    // Every page advertises another page
    for (page, start) in [0u32, 10, 20].iter().enumerate() {
        let id = page as u32 + 1;
        mount_indeed_listing(&server, *start, indeed_listing(&[id], Some(start + 10)), 1).await;
        mount_indeed_job(&server, id, indeed_job("Job", Some("text")), 1).await;
    }
    mount_indeed_listing(&server, 30, indeed_listing(&[4], Some(40)), 0).await;

    let adapter = PagedHttpAdapter::new(Indeed::new(server.uri()), fetcher(), unpaced(), 3);
    let request = CrawlRequest::new("rust", "remote", Limit::Unbounded);
    let records = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed")
        .records;

    assert_eq!(records.len(), 3);
}

/// Scripted stand-in for a browser
struct FakeSession {
    heights: VecDeque<u64>,
    pages: VecDeque<String>,
    clicks: VecDeque<bool>,
    results_render: bool,
    panic_on_read: bool,
    opened: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl FakeSession {
    /// Pops the next scripted value, repeating the last one
    fn next<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn open(&mut self, url: &str) -> Result<(), TrawlError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), TrawlError> {
        Ok(())
    }

    async fn current_scrollable_height(&mut self) -> Result<u64, TrawlError> {
        Ok(Self::next(&mut self.heights).unwrap_or(0))
    }

    async fn wait_for_element(
        &mut self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<bool, TrawlError> {
        Ok(self.results_render)
    }

    async fn click_if_visible(&mut self, _selector: &str) -> Result<bool, TrawlError> {
        Ok(self.clicks.pop_front().unwrap_or(false))
    }

    async fn page_text(&mut self) -> Result<String, TrawlError> {
        if self.panic_on_read {
            panic!("renderer crashed");
        }
        Ok(Self::next(&mut self.pages).unwrap_or_default())
    }

    async fn close(self: Box<Self>) -> Result<(), TrawlError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeLauncher {
    heights: Vec<u64>,
    pages: Vec<String>,
    clicks: Vec<bool>,
    results_render: bool,
    panic_on_read: bool,
    opened: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl FakeLauncher {
    fn new(heights: Vec<u64>, pages: Vec<String>, results_render: bool) -> Self {
        Self {
            heights,
            pages,
            clicks: Vec::new(),
            results_render,
            panic_on_read: false,
            opened: Arc::new(Mutex::new(Vec::new())),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Results of successive show-more clicks; later clicks find nothing
    fn with_clicks(mut self, clicks: Vec<bool>) -> Self {
        self.clicks = clicks;
        self
    }

    fn panicking(mut self) -> Self {
        self.panic_on_read = true;
        self
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, _user_agent: &str) -> Result<Box<dyn BrowserSession>, TrawlError> {
        Ok(Box::new(FakeSession {
            heights: self.heights.iter().copied().collect(),
            pages: self.pages.iter().cloned().collect(),
            clicks: self.clicks.iter().copied().collect(),
            results_render: self.results_render,
            panic_on_read: self.panic_on_read,
            opened: Arc::clone(&self.opened),
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct FailingLauncher;

#[async_trait]
impl BrowserLauncher for FailingLauncher {
    async fn launch(&self, _user_agent: &str) -> Result<Box<dyn BrowserSession>, TrawlError> {
        Err(TrawlError::Browser("driver unavailable".to_string()))
    }
}

fn linkedin_results(base_url: &str, job_ids: &[u32]) -> String {
    let items: String = job_ids
        .iter()
        .map(|id| {
            format!(
                r#"<li><div class="base-card"><a class="base-card__full-link" href="{}/jobs/view/{}?refId=abc&trackingId=xyz">Job {}</a></div></li>"#,
                base_url, id, id
            )
        })
        .collect();
    format!(
        r#"<html><body><ul class="jobs-search__results-list">{}</ul></body></html>"#,
        items
    )
}

fn linkedin_job(title: &str) -> String {
    format!(
        r#"<html><body>
        <h1 class="top-card-layout__title">{}</h1>
        <div class="topcard__flavor-row">
            <span class="topcard__flavor"><a class="topcard__org-name-link" href="/company/globex">Globex</a></span>
            <span class="topcard__flavor topcard__flavor--bullet">Berlin</span>
        </div>
        <div class="description__text description__text--rich">Rust and Tokio</div>
        </body></html>"#,
        title
    )
}

async fn mount_linkedin_job(server: &MockServer, id: u32, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/jobs/view/{}", id)))
        .respond_with(html(linkedin_job(&format!("ML Engineer {}", id))))
        .expect(expected)
        .mount(server)
        .await;
}

fn scroll_adapter(
    server: &MockServer,
    launcher: Arc<dyn BrowserLauncher>,
) -> ScrollAdapter<LinkedIn> {
    ScrollAdapter::new(LinkedIn::new(server.uri()), launcher, fetcher(), unpaced())
        .with_render_timeout(Duration::from_millis(100))
        .with_user_agent("TestAgent/1.0")
}

#[tokio::test]
async fn test_scroll_source_collects_until_height_stops_growing() {
    let server = MockServer::start().await;
    for id in 1..=3 {
        mount_linkedin_job(&server, id, 1).await;
    }

    let launcher = Arc::new(FakeLauncher::new(
        vec![1000, 2000, 2000],
        vec![
            linkedin_results(&server.uri(), &[1, 2]),
            linkedin_results(&server.uri(), &[1, 2, 3]),
        ],
        true,
    ));
    let closes = Arc::clone(&launcher.closes);
    let opened = Arc::clone(&launcher.opened);

    let adapter = scroll_adapter(&server, launcher);
    let request = CrawlRequest::new("ml engineer", "berlin", Limit::Unbounded);
    let records = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed")
        .records;

    let titles: Vec<&str> = records.iter().map(JobRecord::title).collect();
    assert_eq!(titles, vec!["ML Engineer 1", "ML Engineer 2", "ML Engineer 3"]);
    assert!(records.iter().all(|r| r.source() == Source::LinkedIn));
    assert_eq!(records[0].company(), "Globex");
    assert_eq!(records[0].url(), format!("{}/jobs/view/1", server.uri()));

    assert_eq!(closes.load(Ordering::SeqCst), 1);
    let opened = opened.lock().unwrap();
    assert_eq!(opened.len(), 1);
    assert!(opened[0].contains("/jobs/search?keywords=ml+engineer&location=berlin"));
}

#[tokio::test]
async fn test_scroll_source_respects_limit() {
    let server = MockServer::start().await;
    mount_linkedin_job(&server, 1, 1).await;
    mount_linkedin_job(&server, 2, 0).await;

    let launcher = Arc::new(FakeLauncher::new(
        vec![1000, 2000],
        vec![linkedin_results(&server.uri(), &[1, 2])],
        true,
    ));
    let closes = Arc::clone(&launcher.closes);

    let adapter = scroll_adapter(&server, launcher);
    let request = CrawlRequest::new("ml engineer", "berlin", Limit::bounded(1).unwrap());
    let records = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed")
        .records;

    assert_eq!(records.len(), 1);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_show_more_click_grows_flat_listing() {
    let server = MockServer::start().await;
    mount_linkedin_job(&server, 1, 1).await;
    mount_linkedin_job(&server, 2, 1).await;

    // Two scrolls leave the height flat; only the click loads more results
    let launcher = Arc::new(
        FakeLauncher::new(
            vec![1000, 1000, 1000, 2000],
            vec![
                linkedin_results(&server.uri(), &[1]),
                linkedin_results(&server.uri(), &[1, 2]),
            ],
            true,
        )
        .with_clicks(vec![true]),
    );
    let closes = Arc::clone(&launcher.closes);

    let adapter = scroll_adapter(&server, launcher);
    let request = CrawlRequest::new("ml engineer", "berlin", Limit::Unbounded);
    let crawl = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Crawl failed");

    let titles: Vec<&str> = crawl.records.iter().map(JobRecord::title).collect();
    assert_eq!(titles, vec!["ML Engineer 1", "ML Engineer 2"]);
    assert_eq!(crawl.stop, StopReason::NoMoreResults);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_panicking_crawl_still_closes_session() {
    let server = MockServer::start().await;

    let launcher = Arc::new(
        FakeLauncher::new(vec![1000], vec![linkedin_results(&server.uri(), &[1])], true)
            .panicking(),
    );
    let closes = Arc::clone(&launcher.closes);

    let adapter = scroll_adapter(&server, launcher);
    let joined = tokio::spawn(async move {
        let request = CrawlRequest::new("ml engineer", "berlin", Limit::Unbounded);
        adapter.crawl(&request, &CancellationToken::new()).await
    })
    .await;
    assert!(joined.expect_err("Crawl should have panicked").is_panic());

    tokio::time::timeout(Duration::from_secs(5), async {
        while closes.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("Session was never closed");
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_render_timeout_closes_session() {
    let server = MockServer::start().await;
    mount_linkedin_job(&server, 1, 0).await;

    let launcher = Arc::new(FakeLauncher::new(
        vec![1000],
        vec![linkedin_results(&server.uri(), &[1])],
        false,
    ));
    let closes = Arc::clone(&launcher.closes);

    let adapter = scroll_adapter(&server, launcher);
    let request = CrawlRequest::new("ml engineer", "berlin", Limit::Unbounded);
    let crawl = adapter
        .crawl(&request, &CancellationToken::new())
        .await
        .expect("Render timeouts must not surface as errors");

    assert!(crawl.records.is_empty());
    assert!(crawl.listing_failed());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_scroll_crawl_closes_session() {
    let server = MockServer::start().await;

    let launcher = Arc::new(FakeLauncher::new(
        vec![1000],
        vec![linkedin_results(&server.uri(), &[1])],
        true,
    ));
    let closes = Arc::clone(&launcher.closes);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let adapter = scroll_adapter(&server, launcher);
    let request = CrawlRequest::new("ml engineer", "berlin", Limit::Unbounded);
    let records = adapter
        .crawl(&request, &cancel)
        .await
        .expect("Crawl failed")
        .records;

    assert!(records.is_empty());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

fn plan(keywords: &[&str], limit: Limit) -> CrawlPlan {
    CrawlPlan {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        location: "remote".to_string(),
        skills: vec!["python".to_string()],
        limit,
    }
}

#[tokio::test]
async fn test_orchestrator_isolates_unavailable_source() {
    let server = MockServer::start().await;

    mount_indeed_listing(&server, 0, indeed_listing(&[1, 2], None), 1).await;
    mount_indeed_job(&server, 1, indeed_job("Data Engineer", Some("Spark")), 1).await;
    mount_indeed_job(&server, 2, indeed_job("Analytics Engineer", Some("dbt")), 1).await;

    let mut orchestrator = Orchestrator::new(3, CancellationToken::new());
    orchestrator.register(Arc::new(scroll_adapter(&server, Arc::new(FailingLauncher))));
    orchestrator.register(Arc::new(indeed_adapter(&server.uri())));
    orchestrator.register_failed(
        Source::Glassdoor,
        TrawlError::Browser("construction failed".to_string()),
    );

    let outcome = orchestrator.run(&plan(&["data engineer"], Limit::Unbounded)).await;

    assert_eq!(outcome.records().len(), 2);
    assert_eq!(outcome.status(), RunStatus::PartialFailure);

    let linkedin = outcome.report_for(Source::LinkedIn).unwrap();
    assert_eq!(linkedin.records, 0);
    assert_eq!(linkedin.keywords_failed, 1);
    assert!(linkedin.errors[0].contains("driver unavailable"));

    let glassdoor = outcome.report_for(Source::Glassdoor).unwrap();
    assert!(glassdoor.failed_to_start);

    assert_eq!(outcome.report_for(Source::Indeed).unwrap().records, 2);
}

#[tokio::test]
async fn test_orchestrator_urls_unique_per_source_across_keywords() {
    let server = MockServer::start().await;

    // Both keywords see the same listing
    mount_indeed_listing(&server, 0, indeed_listing(&[1, 2], None), 2).await;
    mount_indeed_job(&server, 1, indeed_job("A", Some("a")), 2).await;
    mount_indeed_job(&server, 2, indeed_job("B", Some("b")), 2).await;

    let mut orchestrator = Orchestrator::new(1, CancellationToken::new());
    orchestrator.register(Arc::new(indeed_adapter(&server.uri())));

    let outcome = orchestrator
        .run(&plan(&["data engineer", "analytics engineer"], Limit::Unbounded))
        .await;

    let urls: HashSet<&str> = outcome.records().iter().map(JobRecord::url).collect();
    assert_eq!(outcome.records().len(), 2);
    assert_eq!(urls.len(), 2);
    assert_eq!(
        outcome.report_for(Source::Indeed).unwrap().keywords_attempted,
        2
    );
    assert_eq!(outcome.descriptions(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_orchestrator_reports_empty_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut orchestrator = Orchestrator::new(2, CancellationToken::new());
    orchestrator.register(Arc::new(indeed_adapter(&server.uri())));

    let outcome = orchestrator.run(&plan(&["rust"], Limit::bounded(3).unwrap())).await;

    assert!(outcome.is_empty());
    assert_eq!(outcome.status(), RunStatus::Empty);
    let report = outcome.report_for(Source::Indeed).unwrap();
    assert_eq!(report.keywords_failed, 0);
    assert_eq!(report.listings_failed, 1);
    assert!(report.has_failures());
}

#[tokio::test]
async fn test_orchestrator_reports_failing_listing_beside_healthy_source() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Job/remote-rust-jobs-SRCH_IP1.htm"))
        .respond_with(html(glassdoor_listing(&[1], None, false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/partner/jobListing.htm"))
        .and(query_param("jobListingId", "1"))
        .respond_with(html(glassdoor_job("Rust Engineer")))
        .expect(1)
        .mount(&server)
        .await;

    let mut orchestrator = Orchestrator::new(2, CancellationToken::new());
    orchestrator.register(Arc::new(indeed_adapter(&server.uri())));
    orchestrator.register(Arc::new(PagedHttpAdapter::new(
        Glassdoor::new(server.uri()),
        fetcher(),
        unpaced(),
        50,
    )));

    let outcome = orchestrator.run(&plan(&["rust"], Limit::Unbounded)).await;

    assert_eq!(outcome.records().len(), 1);
    assert_eq!(outcome.status(), RunStatus::PartialFailure);

    let indeed = outcome.report_for(Source::Indeed).unwrap();
    assert_eq!(indeed.records, 0);
    assert_eq!(indeed.listings_failed, 1);
    assert!(indeed.has_failures());
    assert!(indeed.errors[0].contains("listing page failed"));

    let glassdoor = outcome.report_for(Source::Glassdoor).unwrap();
    assert_eq!(glassdoor.records, 1);
    assert!(!glassdoor.has_failures());
}
