//! Data models for search filters and the NewsAPI response envelope.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`SearchFilters`]: the form state (keyword, language, date range, sort order)
//! - [`Language`] and [`SortBy`]: the two select-style filters
//! - [`SearchResult`]: the parsed `everything` response
//! - [`Article`] and [`Source`]: one entry of the article list
//!
//! The response models use `#[serde(rename_all = "camelCase")]` to match the
//! JSON field names returned by the API (`totalResults`, `urlToImage`, ...).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A two-letter language code, as accepted by the `language` query parameter.
///
/// Codes are normalised to lowercase on parse. Anything that is not exactly
/// two ASCII letters is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Language(String);

impl Language {
    /// The options offered by the language select, with their display names.
    pub const OPTIONS: [(&'static str, &'static str); 5] = [
        ("jp", "日本語"),
        ("en", "English"),
        ("de", "Deutsch"),
        ("es", "Español"),
        ("fr", "Français"),
    ];

    /// Lowercase two-letter code, as sent in the `language` parameter.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Display name for known codes, the raw code otherwise.
    pub fn display_name(&self) -> &str {
        Self::OPTIONS
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, name)| *name)
            .unwrap_or(&self.0)
    }
}

impl Default for Language {
    fn default() -> Self {
        Language("jp".to_string())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase()) {
            Ok(Language(code))
        } else {
            Err(format!("invalid language code {s:?}: expected two ASCII letters"))
        }
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sort order for the `sortBy` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    PublishedAt,
    Relevancy,
    Popularity,
}

impl SortBy {
    pub const ALL: [SortBy; 3] = [SortBy::PublishedAt, SortBy::Relevancy, SortBy::Popularity];

    /// Wire name used in the query string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "公開日時",
            SortBy::Relevancy => "関連度",
            SortBy::Popularity => "人気度",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("invalid sort order {s:?}: expected publishedAt, relevancy or popularity")
            })
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The state of the search form.
///
/// Handlers mutate one field at a time; the combinator hands out clones as
/// immutable snapshots. `keyword` holds the raw text as typed; it is trimmed
/// before comparison and before it reaches the query builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub keyword: String,
    pub language: Language,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort_by: SortBy,
}

impl SearchFilters {
    /// Filters with only the keyword set, everything else at its default.
    pub fn with_keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    /// `true` when the trimmed keyword is empty and no search may be issued.
    pub fn is_blank(&self) -> bool {
        self.keyword.trim().is_empty()
    }
}

/// The `everything` response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// `"ok"` on success.
    pub status: String,
    /// Total hits reported by the API, which can exceed `articles.len()`.
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// A single article of a [`SearchResult`].
///
/// `url` and `source.name` are required; everything else the API may omit
/// or send as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: Source,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub content: Option<String>,
}

impl Article {
    /// Publication time formatted as `yyyy/MM/dd HH:mm`, if known.
    pub fn published_display(&self) -> Option<String> {
        self.published_at
            .map(|dt| dt.format("%Y/%m/%d %H:%M").to_string())
    }

    /// Extract the host from the article URL.
    /// For example: "https://www.example.com/a/b" -> "www.example.com"
    pub fn source_host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
    }
}

/// Publisher of an [`Article`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: Option<String>,
    pub name: String,
}
