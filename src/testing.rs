//! Test doubles for [`NewsApi`].

use crate::api::NewsApi;
use crate::error::SearchError;
use crate::models::{Article, SearchResult, Source};
use crate::query::SearchRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FAKE_ENDPOINT: &str = "https://newsapi.test/v2/everything";

struct Scripted {
    delay: Duration,
    outcome: Result<SearchResult, SearchError>,
}

#[derive(Default)]
struct Inner {
    script: VecDeque<Scripted>,
    requests: Vec<SearchRequest>,
}

/// Records every request and answers from a script, in order.
///
/// Delays use `tokio::time::sleep`, so tests on a paused clock control
/// exactly when each response lands. An empty script answers with an empty
/// successful result.
#[derive(Clone, Default)]
pub struct FakeNewsApi {
    inner: Arc<Mutex<Inner>>,
}

impl FakeNewsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, result: SearchResult) {
        self.push_delayed(Duration::ZERO, Ok(result));
    }

    pub fn push_err(&self, err: SearchError) {
        self.push_delayed(Duration::ZERO, Err(err));
    }

    pub fn push_delayed(&self, delay: Duration, outcome: Result<SearchResult, SearchError>) {
        self.inner
            .lock()
            .unwrap()
            .script
            .push_back(Scripted { delay, outcome });
    }

    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// The `q` parameter of every request so far.
    pub fn queries(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.param("q").unwrap_or_default().to_string())
            .collect()
    }
}

impl NewsApi for FakeNewsApi {
    fn endpoint(&self) -> &str {
        FAKE_ENDPOINT
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let scripted = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(request.clone());
            inner.script.pop_front()
        };
        match scripted {
            Some(Scripted { delay, outcome }) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            None => Ok(result_with(&[])),
        }
    }
}

/// A successful result with one article per title.
pub fn result_with(titles: &[&str]) -> SearchResult {
    SearchResult {
        status: "ok".to_string(),
        total_results: titles.len() as u64,
        articles: titles
            .iter()
            .enumerate()
            .map(|(i, title)| Article {
                source: Source {
                    id: Some(format!("test-{}", i + 1)),
                    name: format!("Test Source {}", i + 1),
                },
                author: Some(format!("Author {}", i + 1)),
                title: title.to_string(),
                description: Some(format!("Description {}", i + 1)),
                url: format!("https://test.com/{}", i + 1),
                url_to_image: None,
                published_at: None,
                content: None,
            })
            .collect(),
    }
}
