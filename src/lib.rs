//! # News Flow
//!
//! A news-search engine driven by form events. Keyword, language, date range
//! and sort order arrive as independent field changes. They are debounced
//! and combined into search snapshots, and each snapshot becomes one request
//! against the NewsAPI `everything` endpoint. Only the newest search is ever
//! allowed to update the visible state.
//!
//! ## Architecture
//!
//! The pipeline flows one way:
//! 1. **Combination** ([`combinator`]): distinct + debounce on the keyword,
//!    combine-latest across all fields, blank keywords filtered out
//! 2. **Orchestration** ([`orchestrator`]): `Idle → Loading → Succeeded | Failed`
//!    with a generation guard against stale completions
//! 3. **Query building** ([`query`]): `AND`-joined keywords, optional dates
//! 4. **API access** ([`api`]): one GET per search, typed results, typed errors
//!
//! [`session`] runs steps 1–4 on a single tokio task and implements
//! switch-to-latest cancellation and teardown.
//!
//! ## Usage
//!
//! ```no_run
//! use news_flow::api::NewsApiClient;
//! use news_flow::config::AppConfig;
//! use news_flow::session::SearchSession;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default().with_overrides(Some("api-key".into()), None, None);
//! let client = NewsApiClient::new(&config.news_api)?;
//! let session = SearchSession::spawn(client, &config.search);
//!
//! session.on_keyword_input("AI 人工知能");
//! let mut updates = session.subscribe();
//! updates.changed().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod combinator;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod outputs;
pub mod query;
pub mod session;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
