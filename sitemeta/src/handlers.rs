use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use sitemeta_core::crawl::{CrawlOptions, CrawlOutcome, CrawlProgressCallback, execute_crawl};
use sitemeta_core::oracle::OllamaOracle;
use sitemeta_core::report::{ReportPaths, ReportSummary, write_reports};
use sitemeta_core::suggest::SuggestionEngine;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Expand `~` and environment variables in a user supplied output path
pub fn resolve_output_dir(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

/// Build crawl options from parsed command line arguments
pub fn crawl_options_from_matches(matches: &ArgMatches) -> Result<CrawlOptions> {
    let domain = matches
        .get_one::<String>("DOMAIN")
        .ok_or_else(|| anyhow!("a domain to crawl is required"))?;
    let max_pages = *matches.get_one::<usize>("max").unwrap_or(&500);
    let delay_ms = *matches.get_one::<u64>("delay-ms").unwrap_or(&200);
    let output = matches
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or(sitemeta_core::crawl::DEFAULT_OUTPUT_DIR);
    let oracle_model = matches
        .get_one::<String>("model")
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    Ok(CrawlOptions {
        max_pages,
        request_delay: Duration::from_millis(delay_ms),
        oracle_model,
        output_dir: resolve_output_dir(output),
        show_progress_bars: !matches.get_flag("quiet"),
        ..CrawlOptions::new(domain)
    })
}

/// Heuristics only, unless a model was configured
pub fn build_engine(options: &CrawlOptions) -> SuggestionEngine {
    match options.oracle_model {
        Some(ref model) => {
            info!("Using oracle model {}", model);
            SuggestionEngine::new()
                .with_oracle(Arc::new(OllamaOracle::new(model.clone())))
                .with_oracle_timeout(options.oracle_timeout)
        }
        None => SuggestionEngine::new(),
    }
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

pub async fn handle_crawl(matches: &ArgMatches) -> Result<()> {
    let options = crawl_options_from_matches(matches)?;
    let quiet = matches.get_flag("quiet");
    let engine = build_engine(&options);

    if !quiet {
        println!("{} Crawling {}", "→".blue(), options.start_url.bright_white());
        println!(
            "{} Page cap: {}  Delay: {}ms  Suggestions: {}",
            "→".blue(),
            options.max_pages.to_string().cyan(),
            options.request_delay.as_millis().to_string().cyan(),
            options
                .oracle_model
                .as_deref()
                .unwrap_or("heuristic")
                .cyan()
        );
        println!();
    }

    let progress_callback: Option<CrawlProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| {
            println!("{} {}", "ℹ".blue(), msg);
        }))
    };

    let outcome = execute_crawl(&options, &engine, progress_callback)
        .await
        .with_context(|| format!("crawl of {} failed", options.start_url))?;

    let paths = write_reports(&outcome.report, &options.output_dir).with_context(|| {
        format!(
            "could not write reports to {}",
            options.output_dir.display()
        )
    })?;

    if !quiet {
        print_summary(&outcome);
    }
    print_report_paths(&paths);

    Ok(())
}

fn print_summary(outcome: &CrawlOutcome) {
    let summary = ReportSummary::from_report(&outcome.report);

    println!();
    print_divider();
    println!("{}", "  CRAWL COMPLETE".green().bold());
    print_divider();
    println!();

    if outcome.discovery.reachable.is_empty() {
        println!(
            "{} {} could not be fetched, the report is empty",
            "⚠".yellow().bold(),
            outcome.discovery.start_url.bright_white()
        );
        println!();
        return;
    }

    println!(
        "{} Pages discovered: {}",
        "✓".green().bold(),
        outcome.discovery.discovered.len().to_string().cyan()
    );
    println!(
        "{} Pages audited: {}",
        "✓".green().bold(),
        summary.pages.to_string().cyan()
    );
    println!(
        "{} Pages missing metadata: {}",
        if summary.pages_with_missing == 0 {
            "✓".green().bold()
        } else {
            "⚠".yellow().bold()
        },
        summary.pages_with_missing.to_string().cyan()
    );
    for (label, count) in [
        ("title", summary.missing_title),
        ("description", summary.missing_description),
        ("keywords", summary.missing_keywords),
        ("canonical", summary.missing_canonical),
    ] {
        if count > 0 {
            println!("  {} {}: {}", "•".yellow(), label, count);
        }
    }
    if summary.oracle_suggestions > 0 {
        println!(
            "{} Suggestions: {} from the model, {} heuristic",
            "ℹ".blue(),
            summary.oracle_suggestions,
            summary.heuristic_suggestions
        );
    }
    println!();
}

fn print_report_paths(paths: &ReportPaths) {
    println!(
        "{} JSON report: {}",
        "✓".green().bold(),
        paths.json.display().to_string().bright_white()
    );
    println!(
        "{} HTML report: {}",
        "✓".green().bold(),
        paths.html.display().to_string().bright_white()
    );
}
