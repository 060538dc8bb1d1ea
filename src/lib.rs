// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! # Paging Mediator
//!
//! Turns a single-page, offset/limit style fetch function into an
//! automatically paginated source for an incrementally rendered list.
//!
//! ## Features
//!
//! - **Page Bookkeeping**: Tracks the next page and the known page count
//! - **Scroll Trigger**: Decides when the list should ask for the next page
//! - **Advisory Fetch Flag**: Observable while a fetch is in flight
//! - **Sectioned Lists**: Flattens section/row positions for the trigger
//! - **HTTP Source**: Ready-made page fetcher for JSON REST endpoints
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paging_mediator::{FetchedPage, PagingMediator, PagingError};
//!
//! let mediator = PagingMediator::new(20, |query: String, page: u32, limit: u32| async move {
//!     let (items, total) = api::search(&query, page, limit).await
//!         .map_err(|e| PagingError::new(e.to_string()))?;
//!     Ok(FetchedPage::new(items, total))
//! })?;
//!
//! // Initial page
//! let mut rows = mediator.get_results(query.clone()).await?.unwrap_or_default();
//!
//! // While rendering row `i` (0-based); fires `DEFAULT_LOAD_OFFSET` rows
//! // before the end, i.e. on the second-to-last row
//! if mediator.should_load_more(i + 1, rows.len()) {
//!     if let Some(more) = mediator.get_results(query.clone()).await? {
//!         rows.extend(more);
//!     }
//! }
//!
//! // The search changed: start over
//! mediator.reset();
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// The paging mediator
pub mod mediator;

/// Section/row flattening for sectioned lists
pub mod sections;

/// Configuration types and loader
pub mod config;

/// HTTP page source
pub mod http;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, PagingError, Result};
pub use mediator::{FetchResult, FetchedPage, PagedFetch, PagingMediator, DEFAULT_LOAD_OFFSET};
pub use sections::{IndexPath, ListLayout};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
