//! HTTP paged-fetch module
//!
//! Provides a [`PagedFetch`](crate::mediator::PagedFetch) backed by a
//! REST endpoint that takes page/limit query parameters and answers with
//! a JSON body holding the items and the overall item count.
//!
//! Failed requests are reported as [`PagingError`](crate::PagingError)s.
//! There are no retries; a caller wanting one calls `get_results` again.

mod source;

pub use source::{extract_path, HttpPageSource};
