pub mod commands;

// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{build_engine, crawl_options_from_matches, handle_crawl, resolve_output_dir};

// Re-export crawl functionality from sitemeta-core
pub use sitemeta_core::crawl::{CrawlOptions, CrawlOutcome, execute_crawl, extract_url_path};
