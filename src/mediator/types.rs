//! Paged-fetch abstractions
//!
//! Defines what a single-page fetch returns and the trait the mediator
//! drives to obtain it.

use crate::error::PagingError;
use async_trait::async_trait;
use std::future::Future;

/// Default number of items before the end at which loading is triggered
pub const DEFAULT_LOAD_OFFSET: usize = 1;

/// One page as reported by a paged fetch
///
/// Either part may be absent. The mediator only advances its bookkeeping
/// when both are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage<T> {
    /// Items on this page, in order
    pub items: Option<Vec<T>>,
    /// Total number of items across all pages
    pub total_count: Option<u64>,
}

impl<T> FetchedPage<T> {
    /// A page carrying both a batch and the overall item count
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self {
            items: Some(items),
            total_count: Some(total_count),
        }
    }

    /// A page with neither items nor a total
    pub fn empty() -> Self {
        Self {
            items: None,
            total_count: None,
        }
    }

    /// Returns the batch and total if both are present
    pub fn into_parts(self) -> Option<(Vec<T>, u64)> {
        match (self.items, self.total_count) {
            (Some(items), Some(total)) => Some((items, total)),
            _ => None,
        }
    }
}

impl<T> Default for FetchedPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Outcome of a single paged fetch
pub type FetchResult<T> = std::result::Result<FetchedPage<T>, PagingError>;

/// A function that fetches one page of results
///
/// `page` is 1-based and `limit` is the mediator's page size. Implemented
/// for any `Fn(P, u32, u32) -> impl Future<Output = FetchResult<T>>`, so a
/// plain async closure can be handed to the mediator directly.
#[async_trait]
pub trait PagedFetch<P, T>: Send + Sync
where
    P: Send + 'static,
    T: Send + 'static,
{
    /// Fetch `page` with at most `limit` items
    async fn fetch(&self, params: P, page: u32, limit: u32) -> FetchResult<T>;
}

#[async_trait]
impl<P, T, F, Fut> PagedFetch<P, T> for F
where
    P: Send + 'static,
    T: Send + 'static,
    F: Fn(P, u32, u32) -> Fut + Send + Sync,
    Fut: Future<Output = FetchResult<T>> + Send,
{
    async fn fetch(&self, params: P, page: u32, limit: u32) -> FetchResult<T> {
        (self)(params, page, limit).await
    }
}
