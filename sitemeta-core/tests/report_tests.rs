// Tests for report generation functionality

use sitemeta_core::model::{
    FieldMap, FieldName, PageRecord, SeoReport, SuggestionMethod, SuggestionRecord,
};
use sitemeta_core::report::{
    HTML_REPORT_FILE, JSON_REPORT_FILE, ReportSummary, generate_html_report,
    generate_json_report, load_json_report, suggested_snippet, write_reports,
};
use std::fs;
use tempfile::TempDir;

fn sample_record(title: &str, method: SuggestionMethod) -> PageRecord {
    let found = FieldMap {
        title: title.to_string(),
        author: "Zoë".to_string(),
        ..Default::default()
    };
    let missing = found.missing();

    PageRecord {
        found,
        missing,
        suggested: SuggestionRecord {
            title: title.to_string(),
            description: "Café <strong>menus</strong> & \"more\"".to_string(),
            keywords: vec!["café".to_string(), "menus".to_string()],
            canonical: "https://ex.com/menu?a=1&b=2".to_string(),
            method,
        },
    }
}

fn sample_report() -> SeoReport {
    let mut report = SeoReport::new();
    report.insert(
        "https://ex.com".to_string(),
        sample_record("Home", SuggestionMethod::Heuristic),
    );
    report.insert(
        "https://ex.com/menu".to_string(),
        sample_record("<script>alert(1)</script>", SuggestionMethod::Oracle),
    );
    report
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_round_trips() {
    let report = sample_report();
    let json = generate_json_report(&report).unwrap();
    let decoded: SeoReport = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, report);
}

#[test]
fn test_json_report_is_indented_and_keeps_non_ascii() {
    let json = generate_json_report(&sample_report()).unwrap();
    assert!(json.contains("\n  \"https://ex.com\": {"));
    assert!(json.contains("Zoë"));
    assert!(json.contains("café"));
    assert!(!json.contains("\\u00"));
}

#[test]
fn test_json_report_field_layout() {
    let json = generate_json_report(&sample_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let page = &value["https://ex.com"];

    assert_eq!(page["found"]["og:title"], "");
    assert_eq!(page["found"]["author"], "Zoë");
    assert_eq!(
        page["missing"],
        serde_json::json!(["description", "keywords", "canonical"])
    );
    assert_eq!(page["suggested"]["method"], "heuristic");
    assert_eq!(value["https://ex.com/menu"]["suggested"]["method"], "oracle");
}

#[test]
fn test_empty_report_json() {
    let json = generate_json_report(&SeoReport::new()).unwrap();
    assert_eq!(json, "{}");
}

// ============================================================================
// HTML Report Tests
// ============================================================================

#[test]
fn test_html_report_has_one_section_per_page() {
    let html = generate_html_report(&sample_report());
    assert_eq!(html.matches("<div class=\"page\">").count(), 2);
    assert!(html.contains("2 pages audited, 2 with missing metadata"));
}

#[test]
fn test_html_report_escapes_page_content() {
    let html = generate_html_report(&sample_report());
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(!html.contains("<strong>menus</strong>"));
    assert!(html.contains("Method: oracle"));
    assert!(html.contains("Method: heuristic"));
    assert!(html.contains("description, keywords, canonical"));
}

#[test]
fn test_suggested_snippet_tags() {
    let record = sample_record("Home", SuggestionMethod::Heuristic);
    let snippet = suggested_snippet(&record);
    let lines: Vec<&str> = snippet.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        r#"<meta name="description" content="Café &lt;strong&gt;menus&lt;/strong&gt; &amp; &quot;more&quot;">"#
    );
    assert_eq!(lines[1], r#"<meta name="keywords" content="café, menus">"#);
    assert_eq!(
        lines[2],
        r#"<link rel="canonical" href="https://ex.com/menu?a=1&amp;b=2">"#
    );
    assert_eq!(lines[3], "<title>Home</title>");
}

// ============================================================================
// Summary Tests
// ============================================================================

#[test]
fn test_summary_counts() {
    let summary = ReportSummary::from_report(&sample_report());
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.pages_with_missing, 2);
    assert_eq!(summary.missing_title, 0);
    assert_eq!(summary.missing_description, 2);
    assert_eq!(summary.missing_canonical, 2);
    assert_eq!(summary.oracle_suggestions, 1);
    assert_eq!(summary.heuristic_suggestions, 1);
}

#[test]
fn test_summary_ignores_optional_fields() {
    let mut record = sample_record("Home", SuggestionMethod::Heuristic);
    record.missing = vec![FieldName::Author];
    let mut report = SeoReport::new();
    report.insert("https://ex.com".to_string(), record);

    let summary = ReportSummary::from_report(&report);
    assert_eq!(summary.pages_with_missing, 1);
    assert_eq!(summary.missing_title + summary.missing_description, 0);
}

// ============================================================================
// Filesystem Tests
// ============================================================================

#[test]
fn test_write_reports_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("nested").join("output");

    let paths = write_reports(&sample_report(), &output_dir).unwrap();

    assert_eq!(paths.json, output_dir.join(JSON_REPORT_FILE));
    assert_eq!(paths.html, output_dir.join(HTML_REPORT_FILE));
    assert!(paths.json.exists());
    assert!(paths.html.exists());
    assert_eq!(load_json_report(&paths.json).unwrap(), sample_report());
}

#[test]
fn test_write_reports_overwrites_previous_run() {
    let temp_dir = TempDir::new().unwrap();
    write_reports(&sample_report(), temp_dir.path()).unwrap();
    let paths = write_reports(&SeoReport::new(), temp_dir.path()).unwrap();

    assert_eq!(fs::read_to_string(&paths.json).unwrap(), "{}");
    assert!(load_json_report(&paths.json).unwrap().is_empty());
}

#[test]
fn test_write_reports_fails_when_output_is_a_file() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("output");
    fs::write(&blocker, "not a directory").unwrap();

    assert!(write_reports(&sample_report(), &blocker).is_err());
}
