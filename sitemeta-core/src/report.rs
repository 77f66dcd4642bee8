// Report generation for crawl results

use crate::error::Result;
use crate::model::{FieldName, PageRecord, SeoReport, SuggestionMethod};
use chrono::{DateTime, Utc};
use html_escape::encode_quoted_attribute;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const JSON_REPORT_FILE: &str = "seo_report.json";
pub const HTML_REPORT_FILE: &str = "seo_report.html";

/// Where the two report artifacts were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub pages: usize,
    pub pages_with_missing: usize,
    pub missing_title: usize,
    pub missing_description: usize,
    pub missing_keywords: usize,
    pub missing_canonical: usize,
    pub oracle_suggestions: usize,
    pub heuristic_suggestions: usize,
}

impl ReportSummary {
    pub fn from_report(report: &SeoReport) -> Self {
        let mut summary = ReportSummary {
            pages: report.len(),
            ..Default::default()
        };

        for record in report.values() {
            if !record.missing.is_empty() {
                summary.pages_with_missing += 1;
            }
            for field in &record.missing {
                match field {
                    FieldName::Title => summary.missing_title += 1,
                    FieldName::Description => summary.missing_description += 1,
                    FieldName::Keywords => summary.missing_keywords += 1,
                    FieldName::Canonical => summary.missing_canonical += 1,
                    _ => {}
                }
            }
            match record.suggested.method {
                SuggestionMethod::Oracle => summary.oracle_suggestions += 1,
                SuggestionMethod::Heuristic => summary.heuristic_suggestions += 1,
            }
        }

        summary
    }
}

/// Pretty-printed JSON keyed by page URL. Non-ASCII text is kept as-is.
pub fn generate_json_report(report: &SeoReport) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn load_json_report(path: &Path) -> Result<SeoReport> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn generate_html_report(report: &SeoReport) -> String {
    render_html_report(report, Utc::now())
}

fn render_html_report(report: &SeoReport, generated_at: DateTime<Utc>) -> String {
    let summary = ReportSummary::from_report(report);

    let mut sections = String::new();
    for (url, record) in report {
        sections.push_str(&render_page(url, record));
    }
    if report.is_empty() {
        sections.push_str("<p class=\"empty\">No pages could be crawled.</p>\n");
    }

    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>SEO Crawl Report</title>
<style>
body{{font-family:system-ui,sans-serif;background:#f5f7fa;color:#1c2733;margin:0;padding:24px}}
a{{color:#0b63c5}}
header p{{color:#5b6b7c;margin:4px 0}}
.page{{background:#fff;border:1px solid #d8e0e8;border-radius:6px;padding:16px;margin:16px 0}}
.page h2{{font-size:1.05em;word-break:break-all;margin:0 0 8px}}
.block{{margin-top:10px}}
pre{{background:#0f1720;color:#d7ecff;padding:10px;border-radius:4px;white-space:pre-wrap;word-wrap:break-word}}
.method{{color:#5b6b7c;font-style:italic}}
</style>
</head>
<body>
<header>
<h1>SEO Crawl Report</h1>
<p>Generated {generated}</p>
<p>{pages} pages audited, {with_missing} with missing metadata</p>
</header>
{sections}</body>
</html>
"#,
        generated = generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        pages = summary.pages,
        with_missing = summary.pages_with_missing,
        sections = sections,
    )
}

fn render_page(url: &str, record: &PageRecord) -> String {
    let found_json = serde_json::to_string_pretty(&record.found).unwrap_or_default();
    let missing = record
        .missing
        .iter()
        .map(FieldName::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"<div class="page">
  <h2><a href="{url}" target="_blank" rel="noopener">{url}</a></h2>
  <div class="block"><strong>Found meta:</strong>
    <pre>{found}</pre>
  </div>
  <div class="block"><strong>Missing meta fields:</strong>
    <pre>{missing}</pre>
  </div>
  <div class="block"><strong>Suggested SEO meta for this page:</strong>
    <pre>{snippet}</pre>
    <p class="method">Method: {method}</p>
  </div>
</div>
"#,
        url = encode_quoted_attribute(url),
        found = encode_quoted_attribute(&found_json),
        missing = encode_quoted_attribute(&missing),
        snippet = encode_quoted_attribute(&suggested_snippet(record)),
        method = record.suggested.method,
    )
}

/// The tags a site owner could paste into the page head.
pub fn suggested_snippet(record: &PageRecord) -> String {
    let suggested = &record.suggested;
    [
        format!(
            r#"<meta name="description" content="{}">"#,
            encode_quoted_attribute(&suggested.description)
        ),
        format!(
            r#"<meta name="keywords" content="{}">"#,
            encode_quoted_attribute(&suggested.keywords_joined())
        ),
        format!(
            r#"<link rel="canonical" href="{}">"#,
            encode_quoted_attribute(&suggested.canonical)
        ),
        format!("<title>{}</title>", encode_quoted_attribute(&suggested.title)),
    ]
    .join("\n")
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Write both artifacts into `output_dir`, creating it if needed and
/// replacing any previous run's files.
pub fn write_reports(report: &SeoReport, output_dir: &Path) -> Result<ReportPaths> {
    fs::create_dir_all(output_dir)?;

    let paths = ReportPaths {
        json: output_dir.join(JSON_REPORT_FILE),
        html: output_dir.join(HTML_REPORT_FILE),
    };

    save_report(&generate_json_report(report)?, &paths.json)?;
    save_report(&generate_html_report(report), &paths.html)?;

    info!(
        "Wrote {} and {}",
        paths.json.display(),
        paths.html.display()
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldMap, SuggestionRecord};
    use chrono::TimeZone;

    fn record() -> PageRecord {
        PageRecord {
            found: FieldMap::default(),
            missing: FieldName::REQUIRED.to_vec(),
            suggested: SuggestionRecord {
                title: "Home".to_string(),
                description: "A page".to_string(),
                keywords: vec!["home".to_string()],
                canonical: "https://ex.com".to_string(),
                method: SuggestionMethod::Heuristic,
            },
        }
    }

    #[test]
    fn test_render_uses_given_timestamp() {
        let mut report = SeoReport::new();
        report.insert("https://ex.com".to_string(), record());
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let html = render_html_report(&report, at);
        assert!(html.contains("Generated 2024-05-01 12:00:00 UTC"));
        assert!(html.contains("1 pages audited, 1 with missing metadata"));
    }

    #[test]
    fn test_render_empty_report() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let html = render_html_report(&SeoReport::new(), at);
        assert!(html.contains("No pages could be crawled."));
    }
}
