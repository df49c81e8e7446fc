//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator is the single owner of a crawl job. It seeds the frontier,
//! keeps at most `concurrency` page loads in flight, offers discovered links
//! back to the frontier, and hands loaded content to the Markdown stage.
//! Page and chunk failures are recorded and never abort the job.

use crate::config::Config;
use crate::crawler::fetcher::StaticFetcher;
use crate::crawler::frontier::Frontier;
use crate::markdown::{chunk, Conversion, MarkdownDocument, MarkdownPipeline};
use crate::output::CrawlStatistics;
use crate::render::{
    ContentSource, FallbackChain, PageContent, RenderEngine, RenderError, RenderOptions,
    RenderWorker,
};
use crate::state::{JobPhase, PageOutcome};
use crate::url::{extract_origin, normalize, validate_start_url, NormalizedUrl};
use crate::ScrapeError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Parameters of one crawl request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub start_url: String,
    pub max_pages: usize,
    pub concurrency: usize,
}

impl CrawlJob {
    pub fn new(start_url: impl Into<String>, max_pages: usize, concurrency: usize) -> Self {
        Self {
            start_url: start_url.into(),
            max_pages,
            concurrency,
        }
    }
}

/// A page that did not produce a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: NormalizedUrl,
    pub outcome: PageOutcome,
    pub reason: String,
}

/// Everything a finished crawl hands back
#[derive(Debug)]
pub struct CrawlOutcome {
    /// One document per converted page, in dispatch order
    pub documents: Vec<MarkdownDocument>,

    /// Pages skipped because of an error
    pub failures: Vec<PageFailure>,

    pub stats: CrawlStatistics,
}

/// Result of converting one loaded page
enum PageReport {
    Converted {
        sequence: usize,
        document: MarkdownDocument,
        outcome: PageOutcome,
        conversion: Conversion,
    },
    Skipped(PageFailure),
}

/// Main crawler coordinator structure
pub struct Coordinator {
    sources: Arc<FallbackChain>,
    pipeline: Arc<MarkdownPipeline>,
    max_chunk_bytes: usize,
}

impl Coordinator {
    /// Creates a coordinator from its collaborators
    ///
    /// # Arguments
    ///
    /// * `sources` - Page sources, tried in order for every URL
    /// * `pipeline` - Markdown stage shared by all pages of all jobs
    /// * `max_chunk_bytes` - UTF-8 byte budget per chunk
    pub fn new(sources: FallbackChain, pipeline: MarkdownPipeline, max_chunk_bytes: usize) -> Self {
        Self {
            sources: Arc::new(sources),
            pipeline: Arc::new(pipeline),
            max_chunk_bytes,
        }
    }

    /// Builds a coordinator from the loaded configuration
    ///
    /// With an engine, pages are rendered headlessly and fall back to a
    /// static fetch. Without one, the static fetch is the only source.
    pub fn from_config(
        config: &Config,
        engine: Option<Arc<dyn RenderEngine>>,
    ) -> Result<Self, ScrapeError> {
        let fetcher = Arc::new(StaticFetcher::new(
            &config.user_agent.value,
            Duration::from_secs(config.crawler.navigation_timeout_secs),
        )?);

        let sources = match engine {
            Some(engine) => {
                let worker = RenderWorker::new(engine, RenderOptions::from_config(&config.crawler));
                FallbackChain::new(Arc::new(worker)).then(fetcher)
            }
            None => {
                tracing::warn!("No render engine available, using static fetch only");
                FallbackChain::new(fetcher)
            }
        };
        tracing::debug!("Page sources: {:?}", sources.source_names());

        let pipeline = MarkdownPipeline::from_config(&config.backend)?;

        Ok(Self::new(sources, pipeline, config.chunker.max_bytes))
    }

    /// Converts a single URL to Markdown
    ///
    /// # Returns
    ///
    /// * `Ok(MarkdownDocument)` - the converted page
    /// * `Err(ScrapeError::InvalidUrl)` - the URL failed validation
    /// * `Err(ScrapeError::Unreachable)` - every page source failed
    /// * `Err(ScrapeError::Chunk)` - the page had no text to convert
    pub async fn scrape_one(&self, url: &str) -> Result<MarkdownDocument, ScrapeError> {
        let (target, origin) = seed(url)?;
        tracing::info!("Scraping {}", target);

        let content = self
            .sources
            .try_in_order(&target, &origin)
            .await
            .map_err(|e| ScrapeError::Unreachable {
                url: target.to_string(),
                reason: e.to_string(),
            })?;

        let chunks = chunk(&content.text, self.max_chunk_bytes)?;
        let markdown = self.pipeline.to_markdown(&chunks).await;

        Ok(MarkdownDocument {
            url: content.url,
            title: content.title,
            markdown,
        })
    }

    /// Crawls a site breadth-first and converts every visited page
    ///
    /// The job moves through `Seeding → Running → Draining → Done`. Dispatch
    /// stops once the page budget is spent; loads already in flight still
    /// complete and are converted.
    ///
    /// # Errors
    ///
    /// Fails only if the start URL is invalid or cannot be loaded by any
    /// source. Every other failure is recorded in `CrawlOutcome::failures`.
    pub async fn crawl(&self, job: &CrawlJob) -> Result<CrawlOutcome, ScrapeError> {
        let mut phase = JobPhase::Seeding;
        let mut stats = CrawlStatistics::start();

        let (start, origin) = seed(&job.start_url)?;
        let frontier = Frontier::new(job.max_pages.max(1));
        frontier.enqueue(start.clone());
        let concurrency = job.concurrency.max(1);

        tracing::info!(
            "Crawling {} (max pages: {}, concurrency: {})",
            start,
            frontier.max_pages(),
            concurrency
        );
        phase.transition(JobPhase::Running)?;

        let mut loads: JoinSet<(usize, NormalizedUrl, Result<PageContent, RenderError>)> =
            JoinSet::new();
        let mut conversions: JoinSet<PageReport> = JoinSet::new();
        // Pages waiting for the backend queue here instead of all calling it at once
        let conversion_permits = Arc::new(Semaphore::new(concurrency));
        let mut dispatched = 0usize;
        let mut failures = Vec::new();

        loop {
            if phase.accepts_dispatch() {
                while loads.len() < concurrency {
                    let Some(url) = frontier.next() else {
                        break;
                    };

                    tracing::debug!("Dispatching {} ({}/{})", url, dispatched + 1, job.max_pages);
                    let sources = Arc::clone(&self.sources);
                    let origin = origin.clone();
                    let sequence = dispatched;
                    loads.spawn(async move {
                        let result = sources.try_in_order(&url, &origin).await;
                        (sequence, url, result)
                    });
                    dispatched += 1;
                }

                if frontier.budget_reached() {
                    tracing::info!("Page budget of {} reached, draining", frontier.max_pages());
                    phase.transition(JobPhase::Draining)?;
                }
            }

            let Some(joined) = loads.join_next().await else {
                break;
            };

            let (sequence, url, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!("Page task aborted: {}", e);
                    frontier.complete();
                    continue;
                }
            };

            match result {
                Ok(content) => {
                    let offered = content.links.len();
                    let accepted = content
                        .links
                        .iter()
                        .filter(|link| frontier.enqueue((*link).clone()))
                        .count();
                    stats.record_links(offered);
                    tracing::debug!(
                        "{}: {} link(s) found, {} newly queued",
                        url,
                        offered,
                        accepted
                    );

                    let pipeline = Arc::clone(&self.pipeline);
                    let max_bytes = self.max_chunk_bytes;
                    let permits = Arc::clone(&conversion_permits);
                    conversions.spawn(async move {
                        let _permit = permits.acquire_owned().await.ok();
                        convert_page(sequence, content, pipeline, max_bytes).await
                    });
                }
                Err(e) if sequence == 0 => {
                    frontier.complete();
                    tracing::error!("Start URL {} could not be loaded: {}", url, e);
                    return Err(ScrapeError::Unreachable {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    stats.record_page(PageOutcome::Failed);
                    failures.push(PageFailure {
                        url,
                        outcome: PageOutcome::Failed,
                        reason: e.to_string(),
                    });
                }
            }

            frontier.complete();
        }

        debug_assert!(frontier.is_exhausted());

        let mut converted = Vec::new();
        while let Some(joined) = conversions.join_next().await {
            match joined {
                Ok(PageReport::Converted {
                    sequence,
                    document,
                    outcome,
                    conversion,
                }) => {
                    stats.record_page(outcome);
                    stats.record_chunks(conversion.generated, conversion.failed);
                    converted.push((sequence, document));
                }
                Ok(PageReport::Skipped(failure)) => {
                    stats.record_page(failure.outcome);
                    failures.push(failure);
                }
                Err(e) => tracing::error!("Conversion task aborted: {}", e),
            }
        }

        converted.sort_by_key(|(sequence, _)| *sequence);
        let documents: Vec<MarkdownDocument> =
            converted.into_iter().map(|(_, document)| document).collect();

        phase.transition(JobPhase::Done)?;
        stats.finish();

        tracing::info!(
            "Crawl of {} done: {} document(s), {} failure(s) in {:.1}s",
            start,
            documents.len(),
            failures.len(),
            stats.duration_seconds()
        );

        Ok(CrawlOutcome {
            documents,
            failures,
            stats,
        })
    }
}

/// Validates the start URL and returns its normalized form and origin
fn seed(url: &str) -> Result<(NormalizedUrl, String), ScrapeError> {
    let parsed = validate_start_url(url)?;
    let origin = extract_origin(&parsed);
    Ok((normalize(parsed.as_str()), origin))
}

/// Chunks one page and runs it through the Markdown stage
async fn convert_page(
    sequence: usize,
    content: PageContent,
    pipeline: Arc<MarkdownPipeline>,
    max_bytes: usize,
) -> PageReport {
    let chunks = match chunk(&content.text, max_bytes) {
        Ok(chunks) => chunks,
        Err(e) => {
            tracing::warn!("Nothing to convert on {}: {}", content.url, e);
            return PageReport::Skipped(PageFailure {
                url: content.url,
                outcome: PageOutcome::Empty,
                reason: e.to_string(),
            });
        }
    };

    let conversion = pipeline.convert(&chunks).await;
    let outcome = match content.source {
        ContentSource::Rendered => PageOutcome::Rendered,
        ContentSource::Static => PageOutcome::Fallback,
    };

    tracing::info!(
        "Converted {} via {} ({} chunk(s), {} failed)",
        content.url,
        outcome,
        chunks.len(),
        conversion.failed
    );

    PageReport::Converted {
        sequence,
        document: MarkdownDocument {
            url: content.url,
            title: content.title,
            markdown: conversion.markdown.clone(),
        },
        outcome,
        conversion,
    }
}
