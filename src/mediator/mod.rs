//! Mediator module
//!
//! Turns an offset/limit style fetch into an incrementally paginated
//! source for a scrolling list.
//!
//! # Overview
//!
//! A [`PagingMediator`] wraps a [`PagedFetch`] and tracks the next page to
//! request, the last known page count, and whether a fetch is in flight.
//! The consuming list asks [`PagingMediator::should_load_more`] while it
//! renders rows and calls [`PagingMediator::get_results`] when told to.

mod paging;
mod types;

pub use paging::PagingMediator;
pub use types::{FetchResult, FetchedPage, PagedFetch, DEFAULT_LOAD_OFFSET};

#[cfg(test)]
mod tests;
