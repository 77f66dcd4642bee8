use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Outcome of the link-discovery pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Discovery {
    pub start_url: String,
    pub scope: String,
    /// Every in-scope URL seen, reachable or not
    pub discovered: BTreeSet<String>,
    /// URLs that answered with a usable HTML page
    pub reachable: BTreeSet<String>,
    /// URLs in the order they were fetched
    pub fetch_log: Vec<String>,
}

impl Discovery {
    pub fn new(start_url: String, scope: String) -> Self {
        Self {
            start_url,
            scope,
            discovered: BTreeSet::new(),
            reachable: BTreeSet::new(),
            fetch_log: Vec::new(),
        }
    }

    /// URLs that were discovered but could not be fetched as HTML.
    pub fn unreachable(&self) -> impl Iterator<Item = &String> {
        self.discovered.difference(&self.reachable)
    }
}
