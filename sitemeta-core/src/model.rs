use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The metadata fields read from every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldName {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "keywords")]
    Keywords,
    #[serde(rename = "author")]
    Author,
    #[serde(rename = "og:title")]
    OgTitle,
    #[serde(rename = "og:description")]
    OgDescription,
    #[serde(rename = "og:url")]
    OgUrl,
    #[serde(rename = "og:image")]
    OgImage,
    #[serde(rename = "canonical")]
    Canonical,
}

impl FieldName {
    pub const ALL: [FieldName; 9] = [
        FieldName::Title,
        FieldName::Description,
        FieldName::Keywords,
        FieldName::Author,
        FieldName::OgTitle,
        FieldName::OgDescription,
        FieldName::OgUrl,
        FieldName::OgImage,
        FieldName::Canonical,
    ];

    /// Fields whose absence is reported as missing
    pub const REQUIRED: [FieldName; 4] = [
        FieldName::Title,
        FieldName::Description,
        FieldName::Keywords,
        FieldName::Canonical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Title => "title",
            FieldName::Description => "description",
            FieldName::Keywords => "keywords",
            FieldName::Author => "author",
            FieldName::OgTitle => "og:title",
            FieldName::OgDescription => "og:description",
            FieldName::OgUrl => "og:url",
            FieldName::OgImage => "og:image",
            FieldName::Canonical => "canonical",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata found on one page. An empty string means the tag or attribute
/// was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub author: String,
    #[serde(rename = "og:title")]
    pub og_title: String,
    #[serde(rename = "og:description")]
    pub og_description: String,
    #[serde(rename = "og:url")]
    pub og_url: String,
    #[serde(rename = "og:image")]
    pub og_image: String,
    pub canonical: String,
}

impl FieldMap {
    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::Title => &self.title,
            FieldName::Description => &self.description,
            FieldName::Keywords => &self.keywords,
            FieldName::Author => &self.author,
            FieldName::OgTitle => &self.og_title,
            FieldName::OgDescription => &self.og_description,
            FieldName::OgUrl => &self.og_url,
            FieldName::OgImage => &self.og_image,
            FieldName::Canonical => &self.canonical,
        }
    }

    pub(crate) fn set(&mut self, field: FieldName, value: String) {
        let slot = match field {
            FieldName::Title => &mut self.title,
            FieldName::Description => &mut self.description,
            FieldName::Keywords => &mut self.keywords,
            FieldName::Author => &mut self.author,
            FieldName::OgTitle => &mut self.og_title,
            FieldName::OgDescription => &mut self.og_description,
            FieldName::OgUrl => &mut self.og_url,
            FieldName::OgImage => &mut self.og_image,
            FieldName::Canonical => &mut self.canonical,
        };
        *slot = value;
    }

    /// Required fields that are blank, in reporting order.
    pub fn missing(&self) -> Vec<FieldName> {
        FieldName::REQUIRED
            .iter()
            .copied()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionMethod {
    Heuristic,
    Oracle,
}

impl SuggestionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionMethod::Heuristic => "heuristic",
            SuggestionMethod::Oracle => "oracle",
        }
    }
}

impl fmt::Display for SuggestionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical: String,
    pub method: SuggestionMethod,
}

impl SuggestionRecord {
    pub fn keywords_joined(&self) -> String {
        self.keywords.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub found: FieldMap,
    pub missing: Vec<FieldName>,
    pub suggested: SuggestionRecord,
}

/// Per-page records keyed by normalized URL, in URL order.
pub type SeoReport = BTreeMap<String, PageRecord>;
