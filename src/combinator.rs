//! Reactive field combination without a reactive-streams library.
//!
//! Each form field is a channel. The keyword channel is filtered by
//! distinct-until-changed and then debounced; the select-style channels
//! (language, dates, sort order) pass straight through. Whenever any channel
//! emits, the latest emitted value of every channel is combined into one
//! [`SearchFilters`] snapshot (combine-latest). Snapshots whose keyword is
//! blank are dropped.
//!
//! The combinator never reads a clock. Callers pass `now` in and ask for the
//! next [`deadline`](FieldCombinator::deadline), which lets the session drive
//! it from `tokio::time` and lets tests drive it with plain instants.
//!
//! ```text
//! keyword ──distinct──debounce──┐
//! language ─────────────────────┤
//! date_from ────────────────────┼── combine-latest ── non-blank ──▶ snapshot
//! date_to ──────────────────────┤
//! sort_by ──────────────────────┘
//! ```

use crate::models::{Language, SearchFilters, SortBy};
use chrono::NaiveDate;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// A change on one field of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEvent {
    Keyword(String),
    Language(Language),
    DateFrom(Option<NaiveDate>),
    DateTo(Option<NaiveDate>),
    SortBy(SortBy),
}

/// A keyword waiting for its quiet period to elapse.
#[derive(Debug, Clone)]
struct PendingKeyword {
    value: String,
    due: Instant,
}

/// Turns field events into search snapshots.
///
/// The keyword goes through distinct-until-changed and a debounce; the other
/// fields emit at once. Every emission combines the latest value of each
/// field, and snapshots with a blank keyword are dropped.
#[derive(Debug)]
pub struct FieldCombinator {
    debounce: Duration,
    /// Field values as entered, mutated in place by every event.
    form: SearchFilters,
    /// Latest value each channel has emitted downstream.
    latest: SearchFilters,
    /// Last trimmed keyword that passed distinct-until-changed.
    last_keyword: String,
    pending: Option<PendingKeyword>,
}

impl FieldCombinator {
    /// Create a combinator with every field at its default.
    ///
    /// # Arguments
    ///
    /// * `debounce` - How long the keyword must stay unchanged before it is emitted
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            form: SearchFilters::default(),
            latest: SearchFilters::default(),
            last_keyword: String::new(),
            pending: None,
        }
    }

    /// The form as currently entered, including a keyword still debouncing.
    pub fn form(&self) -> &SearchFilters {
        &self.form
    }

    /// When the pending keyword becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Feed one field change.
    ///
    /// Returns a snapshot when the change is emitted immediately (every
    /// channel except the keyword) and the combined keyword is not blank.
    pub fn apply(&mut self, event: FieldEvent, now: Instant) -> Option<SearchFilters> {
        match event {
            FieldEvent::Keyword(raw) => {
                let trimmed = raw.trim().to_string();
                self.form.keyword = raw;
                if trimmed == self.last_keyword {
                    trace!(keyword = %trimmed, "Keyword unchanged; dropped");
                    return None;
                }
                self.last_keyword = trimmed.clone();
                // restarts the quiet period
                self.pending = Some(PendingKeyword {
                    value: trimmed,
                    due: now + self.debounce,
                });
                None
            }
            FieldEvent::Language(language) => {
                self.form.language = language.clone();
                self.latest.language = language;
                self.combine()
            }
            FieldEvent::DateFrom(date) => {
                self.form.date_from = date;
                self.latest.date_from = date;
                self.combine()
            }
            FieldEvent::DateTo(date) => {
                self.form.date_to = date;
                self.latest.date_to = date;
                self.combine()
            }
            FieldEvent::SortBy(sort_by) => {
                self.form.sort_by = sort_by;
                self.latest.sort_by = sort_by;
                self.combine()
            }
        }
    }

    /// Emit the pending keyword if its quiet period has elapsed by `now`.
    pub fn poll_due(&mut self, now: Instant) -> Option<SearchFilters> {
        match &self.pending {
            Some(p) if p.due <= now => {}
            _ => return None,
        }
        let pending = self.pending.take()?;
        debug!(keyword = %pending.value, "Keyword debounce elapsed");
        self.latest.keyword = pending.value;
        self.combine()
    }

    /// Commit the form's keyword right away, bypassing the debounce, and
    /// emit a snapshot of the whole form.
    pub fn flush(&mut self) -> Option<SearchFilters> {
        self.pending = None;
        let keyword = self.form.keyword.trim().to_string();
        self.last_keyword = keyword.clone();
        self.latest.keyword = keyword;
        self.combine()
    }

    /// Back to defaults on every channel. Emits nothing.
    pub fn reset(&mut self) {
        self.form = SearchFilters::default();
        self.latest = SearchFilters::default();
        self.last_keyword.clear();
        self.pending = None;
    }

    fn combine(&self) -> Option<SearchFilters> {
        if self.latest.is_blank() {
            debug!("Combined keyword is blank; no search");
            return None;
        }
        Some(self.latest.clone())
    }
}
