//! Search orchestration: the state machine behind the result list.
//!
//! ```text
//!            begin                 complete(Ok)
//!   Idle ───────────▶ Loading ─────────────────▶ Succeeded
//!    ▲                  │  ▲                         │
//!    │                  │  └──────── begin ──────────┤
//!    │                  └──────▶ Failed ◀────────────┘
//!    │          complete(Err)      │
//!    └────────── clear ────────────┘  (clear is legal from every state)
//! ```
//!
//! Every [`begin`](SearchOrchestrator::begin) bumps a generation counter and
//! tags the returned [`PendingSearch`] with it. A completion is committed
//! only if its generation is still current, so a slow response to an older
//! snapshot can never overwrite the state of a newer one.

use crate::api::NewsApi;
use crate::error::{ErrorInfo, SearchError};
use crate::models::{SearchFilters, SearchResult};
use crate::query::{SearchRequest, build_request};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchPhase {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// What the presentation layer reads.
///
/// A failed search keeps the previous `last_result` so the list does not
/// blank out on a transient error; only [`SearchOrchestrator::clear`]
/// removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub phase: SearchPhase,
    pub is_loading: bool,
    pub last_result: Option<SearchResult>,
    pub last_error: Option<ErrorInfo>,
}

/// A search that has been started and is waiting for its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub generation: u64,
    pub request: SearchRequest,
}

/// Owns the [`SearchState`] and the generation counter for one client.
///
/// Drive it with [`begin`](Self::begin)/[`complete`](Self::complete) when
/// the request future lives elsewhere (as in the session), or with
/// [`search`](Self::search) for a single awaited call.
pub struct SearchOrchestrator<C> {
    client: Arc<C>,
    state: SearchState,
    generation: u64,
}

impl<C: NewsApi> SearchOrchestrator<C> {
    /// Create an orchestrator in the `Idle` state.
    ///
    /// # Arguments
    ///
    /// * `client` - The [`NewsApi`] implementation used by [`search`](Self::search)
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
            state: SearchState::default(),
            generation: 0,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Shared handle to the client, for callers that run the request
    /// future themselves.
    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    /// Generation of the most recent `begin` or `clear`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a search for `filters`.
    ///
    /// Returns `None`, leaving the state untouched, when the keyword is
    /// blank. Otherwise enters `Loading` and supersedes any search that is
    /// still in flight.
    pub fn begin(&mut self, filters: &SearchFilters) -> Option<PendingSearch> {
        let request = match build_request(filters, self.client.endpoint()) {
            Ok(request) => request,
            Err(e) => {
                debug!(reason = %e, "Search skipped");
                return None;
            }
        };

        self.generation += 1;
        self.state.phase = SearchPhase::Loading;
        self.state.is_loading = true;
        info!(
            generation = self.generation,
            q = request.param("q").unwrap_or_default(),
            "Search started"
        );
        Some(PendingSearch {
            generation: self.generation,
            request,
        })
    }

    /// Commit the outcome of the search tagged `generation`.
    ///
    /// Returns `false` when the outcome was stale and discarded.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<SearchResult, SearchError>,
    ) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "Discarding superseded search outcome");
            return false;
        }

        self.state.is_loading = false;
        match outcome {
            Ok(result) => {
                info!(
                    generation,
                    total_results = result.total_results,
                    articles = result.articles.len(),
                    "Search succeeded"
                );
                self.state.phase = SearchPhase::Succeeded;
                self.state.last_result = Some(result);
                self.state.last_error = None;
            }
            Err(e) => {
                warn!(generation, kind = %e.kind(), error = %e, "Search failed");
                self.state.phase = SearchPhase::Failed;
                self.state.last_error = Some(e.info());
            }
        }
        true
    }

    /// Back to `Idle`, dropping the result and error.
    ///
    /// Also invalidates whatever search is in flight.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = SearchState::default();
        info!("Search state cleared");
    }

    /// Begin, await the client and complete in one call.
    ///
    /// Returns `None` when the keyword is blank and no request was sent.
    ///
    /// If the returned future is dropped before the response arrives, the
    /// loading flag is reset and the phase goes back to what it was before
    /// the call.
    #[instrument(level = "info", skip_all)]
    pub async fn search(&mut self, filters: &SearchFilters) -> Option<Result<SearchResult, ErrorInfo>> {
        let previous = self.state.phase;
        let pending = self.begin(filters)?;
        let client = self.client();
        let mut guard = LoadingGuard {
            orchestrator: self,
            generation: pending.generation,
            previous,
        };

        let outcome = client.search(&pending.request).await;
        let reported = outcome.clone().map_err(|e| e.info());
        guard.orchestrator.complete(guard.generation, outcome);
        Some(reported)
    }
}

/// Undoes `Loading` when a [`SearchOrchestrator::search`] future is dropped
/// mid-flight. A no-op once the search has completed or been superseded.
struct LoadingGuard<'a, C> {
    orchestrator: &'a mut SearchOrchestrator<C>,
    generation: u64,
    previous: SearchPhase,
}

impl<C> Drop for LoadingGuard<'_, C> {
    fn drop(&mut self) {
        let orchestrator = &mut *self.orchestrator;
        if orchestrator.generation != self.generation || !orchestrator.state.is_loading {
            return;
        }
        debug!(generation = self.generation, "Search cancelled before completion");
        orchestrator.state.is_loading = false;
        orchestrator.state.phase = self.previous;
    }
}
