use crate::error::{Result, ScanError};
use crate::fetch::FetchGate;
use crate::normalize::{clean_url, domain_scope, is_followable_href, normalize};
use crate::result::Discovery;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called with the running fetch count and the URL about to be fetched.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// BFS frontier over normalized URLs.
///
/// A URL moves `discovered -> queued -> visited` exactly once; queued and
/// visited never overlap.
#[derive(Debug, Default)]
pub struct Frontier {
    discovered: HashSet<String>,
    to_visit: VecDeque<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new(seed: String) -> Self {
        let mut frontier = Self::default();
        frontier.discover(seed);
        frontier
    }

    /// Record a URL. Returns true if it had not been seen before, in which
    /// case it is queued.
    pub fn discover(&mut self, url: String) -> bool {
        if self.discovered.contains(&url) {
            return false;
        }
        self.discovered.insert(url.clone());
        self.to_visit.push_back(url);
        true
    }

    /// Pop the next queued URL and mark it visited.
    pub fn next_url(&mut self) -> Option<String> {
        while let Some(url) = self.to_visit.pop_front() {
            if self.visited.insert(url.clone()) {
                return Some(url);
            }
        }
        None
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn discovered(&self) -> &HashSet<String> {
        &self.discovered
    }

    pub fn pending(&self) -> usize {
        self.to_visit.len()
    }
}

pub struct Crawler {
    gate: FetchGate,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(gate: FetchGate) -> Self {
        Self {
            gate,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn gate(&self) -> &FetchGate {
        &self.gate
    }

    /// Walk every same-scope page reachable from `start_url`.
    ///
    /// There is no page cap: the walk ends when the frontier runs dry. A start
    /// URL without a crawlable host yields an empty discovery.
    pub async fn discover(&self, start_url: &str) -> Result<Discovery> {
        let start = clean_url(start_url);
        let Some(scope) = domain_scope(&start) else {
            warn!("No crawlable host in {}, nothing to discover", start);
            return Ok(Discovery::new(start, String::new()));
        };

        info!("Starting link discovery at {} (scope={})", start, scope);

        let mut discovery = Discovery::new(start.clone(), scope.clone());
        let mut frontier = Frontier::new(start);

        while let Some(url) = frontier.next_url() {
            discovery.fetch_log.push(url.clone());

            if let Some(ref callback) = self.progress_callback {
                callback(discovery.fetch_log.len(), url.clone());
            }

            let Some(page) = self.gate.fetch(&url).await else {
                continue;
            };
            discovery.reachable.insert(url.clone());

            let links = Self::extract_links(&page.body, &page.final_url, &scope)?;
            let mut queued = 0;
            for link in links {
                if frontier.discover(link) {
                    queued += 1;
                }
            }
            debug!(
                "{}: queued {} new links ({} pending)",
                url,
                queued,
                frontier.pending()
            );
        }

        discovery.discovered = frontier.discovered().iter().cloned().collect();

        info!(
            "Discovery complete. {} URLs discovered, {} reachable",
            discovery.discovered.len(),
            discovery.reachable.len()
        );
        Ok(discovery)
    }

    /// Normalized in-scope links of one page, in document order.
    pub fn extract_links(html: &str, page_url: &str, scope: &str) -> Result<Vec<String>> {
        let document = Html::parse_document(html);
        let link_selector =
            Selector::parse("a[href]").map_err(|e| ScanError::ParseError(e.to_string()))?;

        let mut links = Vec::new();
        for element in document.select(&link_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !is_followable_href(href) {
                continue;
            }

            let absolute_url = normalize(href, page_url);
            if domain_scope(&absolute_url).as_deref() == Some(scope) {
                links.push(absolute_url);
            } else {
                debug!("  -> {} is out of scope, skipping", absolute_url);
            }
        }

        Ok(links)
    }
}
