//! Reading existing metadata and visible text out of a parsed page.

use crate::model::{FieldMap, FieldName};
use scraper::{ElementRef, Html, Node, Selector};

/// Subtrees that never contribute to a page's visible text
const STRIPPED_TAGS: [&str; 7] = [
    "script", "style", "noscript", "header", "footer", "svg", "iframe",
];

/// CSS selector and attribute that locate each field
fn field_source(field: FieldName) -> (&'static str, Option<&'static str>) {
    match field {
        FieldName::Title => ("title", None),
        FieldName::Description => (r#"meta[name="description"]"#, Some("content")),
        FieldName::Keywords => (r#"meta[name="keywords"]"#, Some("content")),
        FieldName::Author => (r#"meta[name="author"]"#, Some("content")),
        FieldName::OgTitle => (r#"meta[property="og:title"]"#, Some("content")),
        FieldName::OgDescription => (r#"meta[property="og:description"]"#, Some("content")),
        FieldName::OgUrl => (r#"meta[property="og:url"]"#, Some("content")),
        FieldName::OgImage => (r#"meta[property="og:image"]"#, Some("content")),
        FieldName::Canonical => (r#"link[rel~="canonical"]"#, Some("href")),
    }
}

/// Read every known field from the first matching tag. Missing tags and
/// missing attributes both yield an empty string.
pub fn extract_meta(document: &Html) -> FieldMap {
    let mut found = FieldMap::default();

    for field in FieldName::ALL {
        let (css, attribute) = field_source(field);
        let value = select_first(document, css)
            .map(|element| match attribute {
                Some(name) => element.value().attr(name).unwrap_or_default().trim().to_string(),
                None => element.text().collect::<String>().trim().to_string(),
            })
            .unwrap_or_default();
        found.set(field, value);
    }

    found
}

/// All text a reader would see, with boilerplate subtrees removed and
/// whitespace collapsed to single spaces.
pub fn extract_visible_text(document: &Html) -> String {
    let mut pieces = Vec::new();
    collect_text(document.root_element(), &mut pieces);
    collapse_whitespace(&pieces.join(" "))
}

/// Text of the first `<h1>` outside the stripped subtrees that has any.
pub fn first_heading(document: &Html) -> Option<String> {
    let selector = Selector::parse("h1").ok()?;
    document
        .select(&selector)
        .filter(|h1| !inside_stripped(h1))
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Text of the `<title>` tag, if non-empty.
pub fn page_title(document: &Html) -> Option<String> {
    select_first(document, "title")
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn is_stripped(name: &str) -> bool {
    STRIPPED_TAGS.contains(&name)
}

fn inside_stripped(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_stripped(ancestor.value().name()))
}

fn collect_text<'a>(element: ElementRef<'a>, pieces: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !is_stripped(child_element.value().name()) {
                collect_text(child_element, pieces);
            }
        } else if let Node::Text(text) = child.value() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                pieces.push(trimmed);
            }
        }
    }
}

/// Trimmed text nodes of an element joined with single spaces
fn element_text(element: ElementRef<'_>) -> String {
    let pieces: Vec<&str> = element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect();
    collapse_whitespace(&pieces.join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
