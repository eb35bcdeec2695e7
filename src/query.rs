//! Query construction for the `everything` endpoint.
//!
//! Turns a [`SearchFilters`] snapshot into a [`SearchRequest`]: the endpoint
//! plus an ordered list of query parameters. Keywords are split on
//! whitespace and joined with the `AND` operator, so `"AI 人工知能 技術"`
//! becomes `q=AI AND 人工知能 AND 技術` (percent-encoded on the wire).
//!
//! The API key is not part of the request descriptor; it is appended by
//! [`SearchRequest::url`] at send time so requests can be logged safely.

use crate::error::SearchError;
use crate::models::SearchFilters;
use itertools::Itertools;
use tracing::debug;

/// Date format expected by the `from` / `to` parameters.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated, ready-to-send request descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub endpoint: String,
    /// Unencoded `(name, value)` pairs in wire order.
    pub params: Vec<(&'static str, String)>,
}

impl SearchRequest {
    /// Value of a parameter, unencoded.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Percent-encoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .join("&")
    }

    /// Full GET URL including the `apiKey` parameter.
    pub fn url(&self, api_key: &str) -> String {
        let sep = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}&apiKey={}",
            self.endpoint,
            sep,
            self.query_string(),
            urlencoding::encode(api_key)
        )
    }
}

/// Join the whitespace-separated tokens of `keyword` with ` AND `.
///
/// Returns `None` when there is no token at all.
pub fn and_join(keyword: &str) -> Option<String> {
    let joined = keyword.split_whitespace().join(" AND ");
    (!joined.is_empty()).then_some(joined)
}

/// Build the request for `filters` against `endpoint`.
///
/// # Errors
///
/// [`SearchError::Validation`] when the trimmed keyword is empty. This is
/// the normal state of an untouched form, so callers skip the search
/// instead of reporting it.
pub fn build_request(filters: &SearchFilters, endpoint: &str) -> Result<SearchRequest, SearchError> {
    let Some(q) = and_join(&filters.keyword) else {
        debug!("Empty keyword; no request built");
        return Err(SearchError::Validation("keyword is empty".to_string()));
    };

    let mut params = vec![
        ("q", q),
        ("language", filters.language.code().to_string()),
        ("sortBy", filters.sort_by.as_str().to_string()),
    ];
    if let Some(from) = filters.date_from {
        params.push(("from", from.format(DATE_FORMAT).to_string()));
    }
    if let Some(to) = filters.date_to {
        params.push(("to", to.format(DATE_FORMAT).to_string()));
    }

    Ok(SearchRequest {
        endpoint: endpoint.to_string(),
        params,
    })
}
