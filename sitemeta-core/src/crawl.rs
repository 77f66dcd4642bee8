use crate::error::Result;
use crate::extract::{extract_meta, extract_visible_text};
use crate::model::{FieldMap, PageRecord, SeoReport, SuggestionRecord};
use crate::oracle::DEFAULT_ORACLE_TIMEOUT;
use crate::suggest::{SuggestionEngine, heuristic_suggestion};
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use sitemeta_scanner::fetch::{DEFAULT_REQUEST_DELAY, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use sitemeta_scanner::normalize::seed_url;
use sitemeta_scanner::{Crawler, Discovery, FetchGate};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use url::Url;

pub const DEFAULT_MAX_PAGES: usize = 500;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Normalized start URL
    pub start_url: String,
    /// Cap on pages audited in the extraction pass
    pub max_pages: usize,
    pub request_delay: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Oracle model; `None` keeps suggestions purely heuristic
    pub oracle_model: Option<String>,
    pub oracle_timeout: Duration,
    pub output_dir: PathBuf,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    /// Options for crawling `target`, which may be a bare domain.
    pub fn new(target: &str) -> Self {
        Self {
            start_url: seed_url(target),
            ..Self::default()
        }
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            start_url: String::new(),
            max_pages: DEFAULT_MAX_PAGES,
            request_delay: DEFAULT_REQUEST_DELAY,
            request_timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            oracle_model: None,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Both passes of a finished crawl.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub discovery: Discovery,
    pub report: SeoReport,
}

/// Everything derived from one page body before the oracle is consulted.
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    pub found: FieldMap,
    pub visible_text: String,
    pub baseline: SuggestionRecord,
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Parse a page and compute its found fields, visible text and heuristic
/// suggestion.
pub fn analyze_page(html: &str, domain: &str, url: &str) -> PageAnalysis {
    let document = Html::parse_document(html);
    let found = extract_meta(&document);
    let visible_text = extract_visible_text(&document);
    let baseline = heuristic_suggestion(&document, &visible_text, domain, url);

    PageAnalysis {
        found,
        visible_text,
        baseline,
    }
}

/// Execute both passes: discover every in-scope page, then re-fetch up to
/// `max_pages` of them in URL order and build their records.
pub async fn execute_crawl(
    options: &CrawlOptions,
    engine: &SuggestionEngine,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlOutcome> {
    let gate = FetchGate::with_settings(options.request_timeout, &options.user_agent)?
        .with_delay(options.request_delay);

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut crawler = Crawler::new(gate.clone());
    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        crawler = crawler.with_progress_callback(Arc::new(move |count: usize, url: String| {
            pb_clone.set_message(format!(
                "Discovering... {} URLs fetched ({})",
                count,
                extract_url_path(&url)
            ));
        }));
    }

    let discovery = crawler.discover(&options.start_url).await?;

    if let Some(ref callback) = progress_callback {
        callback(format!(
            "Total unique internal links found: {}",
            discovery.reachable.len()
        ));
    }

    let audited = Arc::new(AtomicUsize::new(0));
    let page_callback: Option<CrawlProgressCallback> = progress_bar.clone().map(|pb| {
        let audited = audited.clone();
        let total = discovery.reachable.len().min(options.max_pages);
        Arc::new(move |url: String| {
            let n = audited.fetch_add(1, Ordering::Relaxed) + 1;
            pb.set_message(format!("Auditing {}/{}: {}", n, total, extract_url_path(&url)));
        }) as CrawlProgressCallback
    });

    let report = audit_pages(
        &gate,
        discovery.reachable.iter(),
        &discovery.scope,
        options.max_pages,
        engine,
        page_callback,
    )
    .await;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Crawl complete! {} pages audited",
            report.len()
        ));
    }

    Ok(CrawlOutcome { discovery, report })
}

/// The extraction pass. Pages that fail to re-fetch, and pages beyond
/// `max_pages`, are left out of the report.
pub async fn audit_pages<'a>(
    gate: &FetchGate,
    urls: impl IntoIterator<Item = &'a String>,
    domain: &str,
    max_pages: usize,
    engine: &SuggestionEngine,
    progress_callback: Option<CrawlProgressCallback>,
) -> SeoReport {
    let mut report = SeoReport::new();

    for url in urls {
        if report.len() >= max_pages {
            break;
        }
        if let Some(ref callback) = progress_callback {
            callback(url.clone());
        }

        let Some(page) = gate.fetch(url).await else {
            continue;
        };

        let PageAnalysis {
            found,
            visible_text,
            baseline,
        } = analyze_page(&page.body, domain, url);
        let missing = found.missing();
        let suggested = engine.refine(baseline, &visible_text, url).await;

        info!("[{}] Crawled {}", report.len() + 1, url);
        report.insert(
            url.clone(),
            PageRecord {
                found,
                missing,
                suggested,
            },
        );
    }

    report
}
