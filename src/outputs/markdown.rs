//! Markdown rendering of the search form's state.
//!
//! The output mirrors what the result panel shows: a loading marker, the
//! last error if any, then the result count and one block per article.
//!
//! ```text
//! ## Search results: 2 articles
//!
//! ### [Title](https://example.com/story)
//! *Source* · 2025/01/15 10:30 · Author
//!
//! > Description
//! ```

use crate::models::{Article, SearchFilters, SearchResult};
use crate::orchestrator::SearchState;

pub const NO_RESULTS: &str = "No matching articles found.";

/// Render the whole state. Returns an empty string for an untouched form.
pub fn state_to_markdown(state: &SearchState) -> String {
    let mut md = String::new();

    if state.is_loading {
        md.push_str("_Searching…_\n\n");
    }

    if let Some(error) = &state.last_error {
        md.push_str(&format!("> **Search failed** (`{}`): {}\n\n", error.kind, error.message));
    }

    if let Some(result) = &state.last_result {
        md.push_str(&result_to_markdown(result));
    }

    md
}

pub fn result_to_markdown(result: &SearchResult) -> String {
    let mut md = String::new();
    md.push_str(&format!(
        "## Search results: {} article{}\n\n",
        result.total_results,
        if result.total_results == 1 { "" } else { "s" }
    ));

    if result.articles.is_empty() {
        md.push_str(NO_RESULTS);
        md.push('\n');
        return md;
    }

    for article in &result.articles {
        md.push_str(&article_to_markdown(article));
        md.push('\n');
    }
    md
}

fn article_to_markdown(article: &Article) -> String {
    let mut md = format!("### [{}]({})\n", article.title, article.url);

    let mut meta = vec![format!("*{}*", article.source.name)];
    if let Some(published) = article.published_display() {
        meta.push(published);
    }
    if let Some(author) = article.author.as_deref().filter(|a| !a.trim().is_empty()) {
        meta.push(author.to_string());
    }
    md.push_str(&meta.join(" · "));
    md.push('\n');

    if let Some(description) = article.description.as_deref().filter(|d| !d.trim().is_empty()) {
        md.push_str(&format!("\n> {}\n", description.trim()));
    }
    md
}

/// One-line summary of the form, used as a status line.
pub fn filters_summary(filters: &SearchFilters) -> String {
    let range = match (filters.date_from, filters.date_to) {
        (None, None) => "any date".to_string(),
        (Some(from), None) => format!("from {from}"),
        (None, Some(to)) => format!("until {to}"),
        (Some(from), Some(to)) => format!("{from} – {to}"),
    };
    format!(
        "keyword: {:?} | language: {} ({}) | sort: {} ({}) | {}",
        filters.keyword,
        filters.language.code(),
        filters.language.display_name(),
        filters.sort_by.as_str(),
        filters.sort_by.display_name(),
        range
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::orchestrator::SearchPhase;
    use crate::testing::result_with;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_initial_state_renders_nothing() {
        assert_eq!(state_to_markdown(&SearchState::default()), "");
    }

    #[test]
    fn test_renders_results_and_article_cards() {
        let mut result = result_with(&["テスト記事タイトル", "Second"]);
        result.articles[0].description = Some("これはテスト記事の説明文です。".to_string());
        result.articles[0].source.name = "テストソース".to_string();
        result.articles[0].published_at = Some(Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap());

        let state = SearchState {
            phase: SearchPhase::Succeeded,
            last_result: Some(result),
            ..SearchState::default()
        };
        let md = state_to_markdown(&state);

        assert!(md.contains("## Search results: 2 articles"));
        assert!(md.contains("### [テスト記事タイトル](https://test.com/1)"));
        assert!(md.contains("*テストソース* · 2025/01/15 10:30 · Author 1"));
        assert!(md.contains("> これはテスト記事の説明文です。"));
        assert!(md.contains("### [Second](https://test.com/2)"));
        assert!(!md.contains("Searching"));
    }

    #[test]
    fn test_renders_no_results_message() {
        let md = result_to_markdown(&result_with(&[]));
        assert!(md.contains("## Search results: 0 articles"));
        assert!(md.contains(NO_RESULTS));
    }

    #[test]
    fn test_renders_loading_and_error() {
        let state = SearchState {
            phase: SearchPhase::Loading,
            is_loading: true,
            last_result: Some(result_with(&["stale"])),
            last_error: Some(SearchError::Transport("could not connect".to_string()).info()),
        };
        let md = state_to_markdown(&state);
        assert!(md.starts_with("_Searching…_"));
        assert!(md.contains("`transport`"));
        assert!(md.contains("could not connect"));
        assert!(md.contains("[stale]"));
    }

    #[test]
    fn test_filters_summary() {
        let filters = SearchFilters {
            keyword: "AI".to_string(),
            date_from: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..SearchFilters::default()
        };
        let line = filters_summary(&filters);
        assert!(line.contains("keyword: \"AI\""));
        assert!(line.contains("language: jp (日本語)"));
        assert!(line.contains("sort: publishedAt (公開日時)"));
        assert!(line.contains("from 2025-01-01"));
    }
}
