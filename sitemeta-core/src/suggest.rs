//! Heuristic and oracle-assisted metadata suggestions.
//!
//! The heuristic record is always computed first. When an oracle is
//! configured its reply may replace it, but any failure along the way
//! (unreachable oracle, no JSON object in the reply, bad JSON) falls back to
//! the heuristic record unchanged.

use crate::extract::{first_heading, page_title};
use crate::model::{SuggestionMethod, SuggestionRecord};
use crate::oracle::{DEFAULT_ORACLE_TIMEOUT, Oracle};
use crate::stopwords::is_stopword;
use regex::Regex;
use scraper::Html;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, warn};

pub const MAX_TITLE_CHARS: usize = 70;
pub const MAX_DESCRIPTION_CHARS: usize = 160;
pub const DEFAULT_KEYWORD_COUNT: usize = 10;
/// Keywords carried by every suggestion record
pub const SUGGESTED_KEYWORD_COUNT: usize = 12;

const TEXT_TITLE_CHARS: usize = 60;
const MIN_DESCRIPTION_CHARS: usize = 40;
const MAX_DESCRIPTION_SENTENCES: usize = 5;
const PROMPT_EXCERPT_CHARS: usize = 3000;
const ELLIPSIS: &str = "...";

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"));
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]{3,}").expect("word pattern is valid"));

pub struct SuggestionEngine {
    oracle: Option<Arc<dyn Oracle>>,
    oracle_timeout: Duration,
}

impl SuggestionEngine {
    /// An engine that never consults an oracle.
    pub fn new() -> Self {
        Self {
            oracle: None,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    /// Suggest metadata for one page.
    pub async fn suggest(
        &self,
        document: &Html,
        visible_text: &str,
        domain: &str,
        url: &str,
    ) -> SuggestionRecord {
        let baseline = heuristic_suggestion(document, visible_text, domain, url);
        self.refine(baseline, visible_text, url).await
    }

    /// Ask the oracle to improve on `baseline`. Returns `baseline` untouched
    /// when there is no oracle or its reply cannot be used.
    pub async fn refine(
        &self,
        baseline: SuggestionRecord,
        visible_text: &str,
        url: &str,
    ) -> SuggestionRecord {
        let Some(ref oracle) = self.oracle else {
            return baseline;
        };

        let prompt = build_prompt(url, visible_text);
        let reply = match oracle.complete(&prompt, self.oracle_timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Oracle unavailable for {}, using heuristics: {}", url, e);
                return baseline;
            }
        };

        match parse_oracle_reply(&reply, &baseline) {
            Some(record) => record,
            None => {
                debug!("Oracle reply for {} had no usable JSON object", url);
                baseline
            }
        }
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The locally computed suggestion, independent of any oracle.
pub fn heuristic_suggestion(
    document: &Html,
    visible_text: &str,
    domain: &str,
    url: &str,
) -> SuggestionRecord {
    SuggestionRecord {
        title: suggest_title(document, visible_text, domain),
        description: suggest_description(visible_text, MAX_DESCRIPTION_CHARS),
        keywords: top_keywords(visible_text, SUGGESTED_KEYWORD_COUNT),
        canonical: url.to_string(),
        method: SuggestionMethod::Heuristic,
    }
}

/// First heading, then `<title>`, then the start of the visible text, then
/// the domain.
pub fn suggest_title(document: &Html, visible_text: &str, domain: &str) -> String {
    if let Some(heading) = first_heading(document) {
        return truncate_chars(&heading, MAX_TITLE_CHARS);
    }
    if let Some(title) = page_title(document) {
        return truncate_chars(&title, MAX_TITLE_CHARS);
    }

    let text = visible_text.trim();
    if text.chars().count() > TEXT_TITLE_CHARS {
        let head = truncate_chars(text, TEXT_TITLE_CHARS);
        format!("{}{}", cut_at_last_space(&head), ELLIPSIS)
    } else {
        domain.to_string()
    }
}

/// Leading sentences of the text, just long enough to say something,
/// shortened to `max_chars`.
pub fn suggest_description(visible_text: &str, max_chars: usize) -> String {
    let text = visible_text.trim();
    if text.is_empty() {
        return String::new();
    }

    let sentences = split_sentences(text);
    for count in 1..=sentences.len().min(MAX_DESCRIPTION_SENTENCES) {
        let candidate = sentences[..count].join(" ");
        let candidate = candidate.trim();
        if candidate.chars().count() > MIN_DESCRIPTION_CHARS {
            return shorten(candidate, max_chars);
        }
    }

    shorten(text, max_chars)
}

/// Most frequent non-stopword words of three or more letters. Ties keep
/// first-occurrence order.
pub fn top_keywords(visible_text: &str, limit: usize) -> Vec<String> {
    let lowered = visible_text.to_lowercase();

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for word in WORD.find_iter(&lowered).map(|m| m.as_str()) {
        if is_stopword(word) {
            continue;
        }
        match positions.get(word) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(word, counts.len());
                counts.push((word, 1));
            }
        }
    }

    // stable sort keeps first-occurrence order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(word, _)| word.to_string())
        .collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for found in SENTENCE_BREAK.find_iter(text) {
        // keep the punctuation, drop the whitespace
        sentences.push(&text[start..found.start() + 1]);
        start = found.end();
    }
    sentences.push(&text[start..]);
    sentences
}

/// Shorten to at most `max_chars`, cutting at a word boundary and counting
/// the ellipsis inside the budget.
fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head = truncate_chars(text, max_chars.saturating_sub(ELLIPSIS.len()));
    format!("{}{}", cut_at_last_space(&head), ELLIPSIS)
}

fn cut_at_last_space(text: &str) -> &str {
    match text.rfind(' ') {
        Some(idx) => &text[..idx],
        None => text,
    }
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub fn build_prompt(url: &str, visible_text: &str) -> String {
    let excerpt = truncate_chars(visible_text, PROMPT_EXCERPT_CHARS);
    format!(
        "You are an SEO assistant. Write metadata for the page at {url} using the text \
         excerpt below. Answer with a single JSON object with the keys \"title\", \
         \"description\", \"keywords\" and \"canonical\", and keep the description to \
         160 characters or fewer.\n\nText:\n{excerpt}\n\nRespond ONLY with the JSON object.\n"
    )
}

/// Lenient reading of a free-text reply: decode whatever sits between the
/// first `{` and the last `}`. Keys that are missing or of the wrong type
/// keep their heuristic value.
pub fn parse_oracle_reply(reply: &str, baseline: &SuggestionRecord) -> Option<SuggestionRecord> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }

    let value: Value = serde_json::from_str(&reply[start..=end]).ok()?;
    let object = value.as_object()?;

    let title = string_field(object, "title").unwrap_or_else(|| baseline.title.clone());
    let description =
        string_field(object, "description").unwrap_or_else(|| baseline.description.clone());
    let keywords = keywords_field(object).unwrap_or_else(|| baseline.keywords.clone());
    let canonical =
        string_field(object, "canonical").unwrap_or_else(|| baseline.canonical.clone());

    Some(SuggestionRecord {
        title: truncate_chars(&title, MAX_TITLE_CHARS),
        description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
        keywords,
        canonical,
        method: SuggestionMethod::Oracle,
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

/// Keywords may come back as a JSON array or a comma-separated string.
fn keywords_field(object: &Map<String, Value>) -> Option<Vec<String>> {
    match object.get("keywords")? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Value::String(joined) => Some(
            joined
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}
