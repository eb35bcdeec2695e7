//! Output generation for search state and results.
//!
//! # Submodules
//!
//! - [`markdown`]: renders a [`SearchState`](crate::orchestrator::SearchState)
//!   as Markdown for the terminal front-end
//! - [`json`]: writes a [`SearchResult`](crate::models::SearchResult) to a
//!   JSON file for consumption by other tools

pub mod json;
pub mod markdown;
