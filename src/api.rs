//! NewsAPI interaction.
//!
//! This module provides the single seam between the search pipeline and the
//! external news API.
//!
//! # Architecture
//!
//! - [`NewsApi`]: core trait defining one async search call
//! - [`NewsApiClient`]: the production implementation on top of `reqwest`
//! - [`interpret_response`]: maps a status code and body to a result or a
//!   [`SearchError`], kept free of I/O so it can be tested directly
//!
//! # No retries
//!
//! Each call issues exactly one GET. Retry is driven by the user changing a
//! field, which re-triggers the combinator.

use crate::config::NewsApiConfig;
use crate::error::SearchError;
use crate::models::SearchResult;
use crate::query::SearchRequest;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Trait for async news search.
///
/// Implementors issue a single request for a [`SearchRequest`] and return
/// the parsed result. The returned future must be `Send` so the session can
/// own it across `select!` iterations on a spawned task.
pub trait NewsApi: Send + Sync + 'static {
    /// The base URL requests are built against.
    fn endpoint(&self) -> &str;

    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResult, SearchError>> + Send;
}

/// Error envelope NewsAPI sends with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Map an HTTP status and body to a [`SearchResult`] or a [`SearchError`].
///
/// - 2xx: the body must parse as a [`SearchResult`], otherwise
///   [`SearchError::MalformedResponse`].
/// - anything else: [`SearchError::Api`], with the envelope's `message`
///   as human-readable text when the body is a NewsAPI error envelope.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<SearchResult, SearchError> {
    if status.is_success() {
        return serde_json::from_str::<SearchResult>(body)
            .map_err(|e| SearchError::MalformedResponse(e.to_string()));
    }

    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            message: Some(message),
            code,
            ..
        }) => match code {
            Some(code) => format!("{message} ({code})"),
            None => message,
        },
        _ if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
        _ => truncate_for_log(body.trim(), 200),
    };

    Err(SearchError::Api {
        status: status.as_u16(),
        body: body.to_string(),
        message,
    })
}

/// `reqwest`-backed [`NewsApi`] implementation.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: Client,
    config: NewsApiConfig,
}

impl NewsApiClient {
    /// Build a client with the configured timeout and user agent.
    ///
    /// NewsAPI rejects requests without a `User-Agent`, so one is always sent.
    pub fn new(config: &NewsApiConfig) -> Result<Self, SearchError> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }
}

impl NewsApi for NewsApiClient {
    fn endpoint(&self) -> &str {
        &self.config.base_url
    }

    #[instrument(level = "info", skip_all, fields(q = request.param("q").unwrap_or_default()))]
    async fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let t0 = Instant::now();
        debug!(url = %request.url("***"), "Sending search request");

        let response = self.http.get(request.url(&self.config.api_key)).send().await;
        let response = match response {
            Ok(r) => r,
            Err(e) => {
                let err = SearchError::from(e);
                warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %err, "Search request failed");
                return Err(err);
            }
        };

        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        let res = interpret_response(status, &body);
        match &res {
            Ok(result) => info!(
                status = status.as_u16(),
                elapsed_ms = dt.as_millis() as u64,
                total_results = result.total_results,
                articles = result.articles.len(),
                "Search succeeded"
            ),
            Err(e) => warn!(
                status = status.as_u16(),
                elapsed_ms = dt.as_millis() as u64,
                error = %e,
                body_preview = %truncate_for_log(&body, 300),
                "Search failed"
            ),
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchFilters;
    use crate::query::build_request;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const OK_BODY: &str = r#"{"status":"ok","totalResults":2,"articles":[
        {"source":{"id":"test-1","name":"Test Source 1"},"author":"Author 1","title":"Test Article 1",
         "description":"Description 1","url":"https://test.com/1","urlToImage":null,
         "publishedAt":"2025-01-01T00:00:00Z","content":"Content 1"},
        {"source":{"id":null,"name":"Test Source 2"},"author":null,"title":"Test Article 2",
         "description":null,"url":"https://test.com/2","urlToImage":null,
         "publishedAt":"2025-01-02T00:00:00Z","content":null}]}"#;

    /// Serve a single canned HTTP response and report the request line.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let request = String::from_utf8_lossy(&buf);
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{addr}/v2/everything"), rx)
    }

    fn client_for(base_url: &str) -> NewsApiClient {
        NewsApiClient::new(&NewsApiConfig {
            api_key: "test-api-key".to_string(),
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..NewsApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_interpret_ok_body() {
        let result = interpret_response(StatusCode::OK, OK_BODY).unwrap();
        assert_eq!(result.total_results, 2);
        assert_eq!(result.articles.len(), 2);
        assert_eq!(result.articles[0].source.name, "Test Source 1");
        assert_eq!(result.articles[0].title, "Test Article 1");
        assert_eq!(result.articles[1].url, "https://test.com/2");
    }

    #[test]
    fn test_interpret_426() {
        let err = interpret_response(StatusCode::UPGRADE_REQUIRED, "Upgrade Required").unwrap_err();
        assert_eq!(
            err,
            SearchError::Api {
                status: 426,
                body: "Upgrade Required".to_string(),
                message: "Upgrade Required".to_string(),
            }
        );
    }

    #[test]
    fn test_interpret_empty_error_body_uses_reason() {
        let err = interpret_response(StatusCode::UPGRADE_REQUIRED, "").unwrap_err();
        assert!(err.to_string().contains("426"));
        assert!(err.to_string().contains("Upgrade Required"));
    }

    #[test]
    fn test_interpret_error_envelope() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        let err = interpret_response(StatusCode::UNAUTHORIZED, body).unwrap_err();
        let info = err.info();
        assert_eq!(info.status, Some(401));
        assert!(info.message.contains("Your API key is invalid. (apiKeyInvalid)"));
    }

    #[test]
    fn test_interpret_malformed() {
        for body in ["", "not json", r#"{"status":"ok"}"#, r#"{"status":"ok","totalResults":-1,"articles":[]}"#] {
            let err = interpret_response(StatusCode::OK, body).unwrap_err();
            assert!(matches!(err, SearchError::MalformedResponse(_)), "{body}");
        }
    }

    #[test]
    fn test_interpret_empty_articles() {
        let result =
            interpret_response(StatusCode::OK, r#"{"status":"ok","totalResults":0,"articles":[]}"#).unwrap();
        assert_eq!(result.total_results, 0);
        assert!(result.articles.is_empty());
    }

    #[tokio::test]
    async fn test_client_sends_encoded_query() {
        let (base_url, request_line) = serve_once("200 OK", OK_BODY).await;
        let client = client_for(&base_url);
        let request = build_request(&SearchFilters::with_keyword("AI 人工知能 技術"), client.endpoint()).unwrap();

        let result = client.search(&request).await.unwrap();
        assert_eq!(result.articles.len(), 2);

        let line = request_line.await.unwrap();
        assert!(line.starts_with("GET /v2/everything?q=AI%20AND%20"), "{line}");
        assert!(line.contains("language=jp"));
        assert!(line.contains("sortBy=publishedAt"));
        assert!(line.contains("apiKey=test-api-key"));
        assert!(!line.contains("from="));
    }

    #[tokio::test]
    async fn test_client_maps_426() {
        let (base_url, _line) = serve_once("426 Upgrade Required", "Upgrade Required").await;
        let client = client_for(&base_url);
        let request = build_request(&SearchFilters::with_keyword("AI"), client.endpoint()).unwrap();

        let err = client.search(&request).await.unwrap_err();
        assert!(matches!(err, SearchError::Api { status: 426, .. }));
    }

    #[tokio::test]
    async fn test_client_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
        let client = client_for(&format!("http://{addr}/v2/everything"));
        let request = build_request(&SearchFilters::with_keyword("AI"), client.endpoint()).unwrap();

        let err = client.search(&request).await.unwrap_err();
        assert!(matches!(err, SearchError::Transport(_)), "{err:?}");
    }
}
