//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and a scripted render
//! engine to exercise full scrape and crawl cycles end-to-end.

use async_trait::async_trait;
use scrapemark::config::load_config;
use scrapemark::markdown::{BackendError, GeminiClient, TextGenerator, GENERATION_FAILED_PLACEHOLDER};
use scrapemark::output::write_documents;
use scrapemark::render::{
    FallbackChain, RenderEngine, RenderError, RenderOptions, RenderSession, RenderWorker,
    RequestFilter,
};
use scrapemark::crawler::StaticFetcher;
use scrapemark::{chunk, Coordinator, CrawlJob, MarkdownPipeline, ScrapeError};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Generator that wraps its input so tests can see what reached it
struct BracketGenerator;

#[async_trait]
impl TextGenerator for BracketGenerator {
    async fn generate(&self, _api_key: &str, _system: &str, user: &str) -> Result<String, BackendError> {
        Ok(format!("[{}]", user.trim_start_matches("Input:\n")))
    }
}

/// Generator that always fails
struct BrokenGenerator;

#[async_trait]
impl TextGenerator for BrokenGenerator {
    async fn generate(&self, _api_key: &str, _system: &str, _user: &str) -> Result<String, BackendError> {
        Err(BackendError::EmptyResponse)
    }
}

/// Render engine serving a fixed set of pages; anything else times out
#[derive(Default)]
struct ScriptedEngine {
    pages: HashMap<String, (String, String, Vec<String>)>,
    visits: Arc<Mutex<Vec<String>>>,
}

impl ScriptedEngine {
    fn page(mut self, url: &str, title: &str, html: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            (
                title.to_string(),
                html.to_string(),
                links.iter().map(|l| l.to_string()).collect(),
            ),
        );
        self
    }
}

struct ScriptedSession {
    pages: HashMap<String, (String, String, Vec<String>)>,
    visits: Arc<Mutex<Vec<String>>>,
    current: Option<String>,
}

#[async_trait]
impl RenderEngine for ScriptedEngine {
    async fn open_session(
        &self,
        _filter: RequestFilter,
    ) -> Result<Box<dyn RenderSession>, RenderError> {
        Ok(Box::new(ScriptedSession {
            pages: self.pages.clone(),
            visits: Arc::clone(&self.visits),
            current: None,
        }))
    }
}

#[async_trait]
impl RenderSession for ScriptedSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError> {
        self.visits.lock().unwrap().push(url.to_string());
        if self.pages.contains_key(url) {
            self.current = Some(url.to_string());
            Ok(())
        } else {
            Err(RenderError::timeout(url, timeout))
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, RenderError> {
        if script.contains("scrollBy") {
            return Ok(json!(true));
        }
        let (title, html, links) = self
            .current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .ok_or_else(|| RenderError::Evaluate("nothing loaded".to_string()))?;
        Ok(json!({ "title": title, "html": html, "links": links }))
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        Ok(())
    }
}

fn render_options() -> RenderOptions {
    RenderOptions {
        navigation_timeout: Duration::from_secs(2),
        scroll_step_px: 500,
        scroll_delay: Duration::ZERO,
        max_scroll_steps: 3,
    }
}

fn pipeline(generator: Arc<dyn TextGenerator>) -> MarkdownPipeline {
    MarkdownPipeline::new(generator, vec!["k1".into(), "k2".into()], 1, Duration::ZERO).unwrap()
}

fn static_fetcher() -> Arc<StaticFetcher> {
    Arc::new(StaticFetcher::new("ScrapemarkTest/1.0", Duration::from_secs(5)).unwrap())
}

fn rendered_coordinator(engine: ScriptedEngine, generator: Arc<dyn TextGenerator>) -> Coordinator {
    let worker = RenderWorker::new(Arc::new(engine), render_options());
    Coordinator::new(
        FallbackChain::new(Arc::new(worker)).then(static_fetcher()),
        pipeline(generator),
        2000,
    )
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crawl_visits_site_breadth_first() {
    let engine = ScriptedEngine::default()
        .page(
            "https://site.test",
            "Home",
            "<p>home</p>",
            &["https://site.test/b", "https://site.test/c", "https://other.test/x"],
        )
        .page("https://site.test/b", "B", "<p>b</p>", &["https://site.test"])
        .page("https://site.test/c", "C", "<p>c</p>", &["https://site.test/b"]);
    let visits = Arc::clone(&engine.visits);
    let coordinator = rendered_coordinator(engine, Arc::new(BracketGenerator));

    let outcome = coordinator
        .crawl(&CrawlJob::new("https://site.test/", 10, 1))
        .await
        .unwrap();

    assert_eq!(
        *visits.lock().unwrap(),
        vec!["https://site.test", "https://site.test/b", "https://site.test/c"]
    );
    let urls: Vec<&str> = outcome.documents.iter().map(|d| d.url.as_str()).collect();
    assert_eq!(urls, vec!["https://site.test", "https://site.test/b", "https://site.test/c"]);
    assert_eq!(outcome.documents[1].markdown, "[<p>b</p>]");
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.stats.total_pages(), 3);
}

#[tokio::test]
async fn test_crawl_respects_page_budget() {
    let engine = ScriptedEngine::default()
        .page(
            "https://site.test",
            "Home",
            "<p>home</p>",
            &["https://site.test/1", "https://site.test/2", "https://site.test/3"],
        )
        .page("https://site.test/1", "1", "<p>1</p>", &[])
        .page("https://site.test/2", "2", "<p>2</p>", &[])
        .page("https://site.test/3", "3", "<p>3</p>", &[]);
    let visits = Arc::clone(&engine.visits);
    let coordinator = rendered_coordinator(engine, Arc::new(BracketGenerator));

    let outcome = coordinator
        .crawl(&CrawlJob::new("https://site.test", 2, 4))
        .await
        .unwrap();

    assert_eq!(visits.lock().unwrap().len(), 2);
    assert_eq!(outcome.documents.len(), 2);
}

#[tokio::test]
async fn test_failed_page_does_not_stop_crawl() {
    let engine = ScriptedEngine::default()
        .page(
            "https://site.test",
            "Home",
            "<p>home</p>",
            &["https://site.test/missing", "https://site.test/ok"],
        )
        .page("https://site.test/ok", "Ok", "<p>ok</p>", &[]);
    // Render-only: the static fallback would also fail on this made-up host
    let worker = RenderWorker::new(Arc::new(engine), render_options());
    let coordinator = Coordinator::new(
        FallbackChain::new(Arc::new(worker)),
        pipeline(Arc::new(BracketGenerator)),
        2000,
    );

    let outcome = coordinator
        .crawl(&CrawlJob::new("https://site.test", 10, 2))
        .await
        .unwrap();

    assert_eq!(outcome.documents.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].url.as_str(), "https://site.test/missing");
}

#[tokio::test]
async fn test_scrape_falls_back_to_static_fetch() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/article",
        "<html><head><title>Article</title></head><body><p>Static body</p></body></html>",
    )
    .await;

    // The engine knows no pages, so every navigation fails
    let coordinator = rendered_coordinator(ScriptedEngine::default(), Arc::new(BracketGenerator));

    let document = coordinator
        .scrape_one(&format!("{}/article/", server.uri()))
        .await
        .unwrap();

    assert_eq!(document.title, "Article");
    assert!(document.markdown.contains("Static body"));
    assert!(document.markdown.starts_with("[Article"));
}

#[tokio::test]
async fn test_static_only_crawl_against_mock_server() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/",
        r#"<html><head><title>Root</title></head><body>
            <a href="/guide">Guide</a>
            <a href="/app.js">script</a>
            <a href="https://elsewhere.test/">away</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/guide",
        "<html><head><title>Guide</title></head><body><p>Read me</p></body></html>",
    )
    .await;

    let coordinator = Coordinator::new(
        FallbackChain::new(static_fetcher()),
        pipeline(Arc::new(BracketGenerator)),
        2000,
    );

    let outcome = coordinator.crawl(&CrawlJob::new(&base, 10, 2)).await.unwrap();

    let titles: Vec<&str> = outcome.documents.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Root", "Guide"]);

    let dir = TempDir::new().unwrap();
    let written = write_documents(&outcome.documents, dir.path()).unwrap();
    assert_eq!(written.len(), 2);
    let guide = std::fs::read_to_string(&written[1]).unwrap();
    assert!(guide.starts_with("# Guide\n"));
    assert!(guide.contains("Read me"));
}

#[tokio::test]
async fn test_unreachable_start_url_fails_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let coordinator = rendered_coordinator(ScriptedEngine::default(), Arc::new(BracketGenerator));

    let err = coordinator
        .crawl(&CrawlJob::new(&server.uri(), 5, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Unreachable { .. }));
}

#[tokio::test]
async fn test_generation_failure_yields_placeholder() {
    let engine = ScriptedEngine::default().page("https://site.test", "Home", "<p>home</p>", &[]);
    let coordinator = rendered_coordinator(engine, Arc::new(BrokenGenerator));

    let document = coordinator.scrape_one("https://site.test").await.unwrap();

    assert_eq!(document.markdown, GENERATION_FAILED_PLACEHOLDER);
}

#[tokio::test]
async fn test_gemini_backend_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/test-model:generateContent"))
        .and(query_param("key", "k1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "# Home" }] } }]
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri(), "test-model", Duration::from_secs(5)).unwrap();
    let engine = ScriptedEngine::default().page("https://site.test", "Home", "<h1>Home</h1>", &[]);
    let coordinator = rendered_coordinator(engine, Arc::new(client));

    let document = coordinator.scrape_one("https://site.test").await.unwrap();

    assert_eq!(document.markdown, "# Home");
}

#[test]
fn test_chunking_large_text() {
    let text = "word ".repeat(5000);

    let chunks = chunk(&text, 100).unwrap();

    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.byte_size <= 100));
    let joined = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(joined, text.trim_end());
}

#[test]
fn test_load_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scrapemark.toml");
    std::fs::write(
        &path,
        r#"
[crawler]
max-pages = 25
concurrency = 3

[backend]
api-keys = ["abc"]

[output]
directory = "./out"
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();

    assert_eq!(config.crawler.max_pages, 25);
    assert_eq!(config.crawler.concurrency, 3);
    assert_eq!(config.backend.api_keys, vec!["abc".to_string()]);
    assert_eq!(config.output.directory, "./out");
}
