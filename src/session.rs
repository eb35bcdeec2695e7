//! The running search form.
//!
//! A [`SearchSession`] owns one spawned task that drives a
//! [`FieldCombinator`] and a [`SearchOrchestrator`]. Handlers queue field
//! events onto an unbounded channel. The task processes them in order,
//! fires debounce deadlines, and awaits at most one search at a time.
//! Everything the task owns is touched only from that task.
//!
//! # Switch-to-latest
//!
//! Starting a search replaces the in-flight future, which drops it and
//! cancels the underlying HTTP request. The orchestrator's generation guard
//! backs this up: an outcome that is not for the current generation is
//! never committed.
//!
//! # Teardown
//!
//! State is published through `watch` channels behind a gate. After
//! [`shutdown`](SearchSession::shutdown) returns (or the session is
//! dropped), no further state change is published, even if the task was
//! mid-poll on another worker thread.

use crate::api::NewsApi;
use crate::combinator::{FieldCombinator, FieldEvent};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::models::{Language, SearchFilters, SearchResult, SortBy};
use crate::orchestrator::{SearchOrchestrator, SearchState};
use chrono::NaiveDate;
use futures::FutureExt;
use futures::future::{BoxFuture, OptionFuture};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

#[derive(Debug)]
enum Input {
    Field(FieldEvent),
    SearchNow,
    Clear,
}

type InFlight = BoxFuture<'static, (u64, Result<SearchResult, SearchError>)>;

/// Publication side of the state, guarded by the teardown gate.
struct Outlet {
    closed: Arc<Mutex<bool>>,
    state: watch::Sender<SearchState>,
    filters: watch::Sender<SearchFilters>,
}

impl Outlet {
    fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SearchState, filters: &SearchFilters) {
        let closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return;
        }
        self.state.send_if_modified(|current| {
            if current != state {
                *current = state.clone();
                true
            } else {
                false
            }
        });
        self.filters.send_if_modified(|current| {
            if current != filters {
                *current = filters.clone();
                true
            } else {
                false
            }
        });
    }
}

struct Worker<C> {
    combinator: FieldCombinator,
    orchestrator: SearchOrchestrator<C>,
    outlet: Outlet,
}

impl<C: NewsApi> Worker<C> {
    async fn run(mut self, mut inputs: mpsc::UnboundedReceiver<Input>) {
        let mut in_flight: Option<InFlight> = None;

        loop {
            let deadline = self.combinator.deadline();
            tokio::select! {
                input = inputs.recv() => {
                    let Some(input) = input else {
                        debug!("Session handle dropped; worker exiting");
                        break;
                    };
                    self.handle(input, &mut in_flight);
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(snapshot) = self.combinator.poll_due(Instant::now()) {
                        self.start(snapshot, &mut in_flight);
                    }
                }
                Some((generation, outcome)) = OptionFuture::from(in_flight.as_mut()), if in_flight.is_some() => {
                    in_flight = None;
                    self.orchestrator.complete(generation, outcome);
                }
            }
            self.outlet
                .publish(self.orchestrator.state(), self.combinator.form());
        }
    }

    fn handle(&mut self, input: Input, in_flight: &mut Option<InFlight>) {
        match input {
            Input::Field(event) => {
                if let Some(snapshot) = self.combinator.apply(event, Instant::now()) {
                    self.start(snapshot, in_flight);
                }
            }
            Input::SearchNow => {
                if let Some(snapshot) = self.combinator.flush() {
                    self.start(snapshot, in_flight);
                }
            }
            Input::Clear => {
                self.combinator.reset();
                self.orchestrator.clear();
                if in_flight.take().is_some() {
                    debug!("Cancelled in-flight search on clear");
                }
            }
        }
    }

    fn start(&mut self, snapshot: SearchFilters, in_flight: &mut Option<InFlight>) {
        // shutdown may land while this task is mid-poll on another thread
        if self.outlet.is_closed() {
            debug!("Session closed; search not started");
            return;
        }
        let Some(pending) = self.orchestrator.begin(&snapshot) else {
            return;
        };
        if in_flight.is_some() {
            debug!(generation = pending.generation, "Cancelling superseded search");
        }
        let client = self.orchestrator.client();
        let generation = pending.generation;
        // replacing the slot drops the superseded future
        *in_flight = Some(
            async move {
                let outcome = client.search(&pending.request).await;
                (generation, outcome)
            }
            .boxed(),
        );
    }
}

/// Handle to a running search form.
///
/// Must be created inside a tokio runtime.
pub struct SearchSession {
    inputs: mpsc::UnboundedSender<Input>,
    state: watch::Receiver<SearchState>,
    filters: watch::Receiver<SearchFilters>,
    closed: Arc<Mutex<bool>>,
    task: Option<JoinHandle<()>>,
}

impl SearchSession {
    /// Spawn the worker task and return its handle.
    ///
    /// # Arguments
    ///
    /// * `client` - The [`NewsApi`] used for every search of this session
    /// * `config` - Supplies the keyword debounce
    pub fn spawn<C: NewsApi>(client: C, config: &SearchConfig) -> Self {
        let (inputs_tx, inputs_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState::default());
        let (filters_tx, filters_rx) = watch::channel(SearchFilters::default());
        let closed = Arc::new(Mutex::new(false));

        let worker = Worker {
            combinator: FieldCombinator::new(config.debounce()),
            orchestrator: SearchOrchestrator::new(client),
            outlet: Outlet {
                closed: Arc::clone(&closed),
                state: state_tx,
                filters: filters_tx,
            },
        };
        let task = tokio::spawn(worker.run(inputs_rx));
        info!(debounce_ms = config.debounce_ms, "Search session started");

        Self {
            inputs: inputs_tx,
            state: state_rx,
            filters: filters_rx,
            closed,
            task: Some(task),
        }
    }

    /// Keyword text changed. Searched once it has been stable for the
    /// debounce interval and differs from the last searched keyword.
    pub fn on_keyword_input(&self, value: impl Into<String>) {
        self.send(Input::Field(FieldEvent::Keyword(value.into())));
    }

    /// Language picked. Searches immediately if the keyword is non-blank;
    /// the same holds for the other non-keyword fields below.
    pub fn on_language_changed(&self, language: Language) {
        self.send(Input::Field(FieldEvent::Language(language)));
    }

    /// `None` clears the lower date bound.
    pub fn on_date_from_changed(&self, date: Option<NaiveDate>) {
        self.send(Input::Field(FieldEvent::DateFrom(date)));
    }

    /// `None` clears the upper date bound.
    pub fn on_date_to_changed(&self, date: Option<NaiveDate>) {
        self.send(Input::Field(FieldEvent::DateTo(date)));
    }

    pub fn on_sort_by_changed(&self, sort_by: SortBy) {
        self.send(Input::Field(FieldEvent::SortBy(sort_by)));
    }

    /// Search with the form as entered, without waiting for the debounce.
    pub fn search_now(&self) {
        self.send(Input::SearchNow);
    }

    /// Reset every field and the state to defaults. Does not search.
    pub fn clear(&self) {
        self.send(Input::Clear);
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// The form as last published by the worker.
    pub fn filters(&self) -> SearchFilters {
        self.filters.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop the session: close the publication gate, then abort the task.
    ///
    /// Idempotent. Handlers called afterwards are ignored.
    pub fn shutdown(&mut self) {
        *self.closed.lock().unwrap_or_else(PoisonError::into_inner) = true;
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Search session shut down");
        }
    }

    fn send(&self, input: Input) {
        if self.inputs.send(input).is_err() {
            debug!("Session closed; input dropped");
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
