//! The paging mediator
//!
//! Wraps a [`PagedFetch`] and keeps the bookkeeping needed to hand out
//! one page at a time: which page comes next, how many pages exist, and
//! whether a fetch is currently outstanding.

use super::types::{FetchedPage, PagedFetch, DEFAULT_LOAD_OFFSET};
use crate::config::PagingConfig;
use crate::error::{Error, PagingError, Result};
use crate::sections::{flatten, IndexPath, ListLayout};
use futures::stream::{self, Stream};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::{debug, trace};

/// Turns a single-page fetch into an incrementally paginated source
///
/// The mediator never refuses a call. `is_fetching` is advisory: callers
/// are expected to ask [`should_load_more`](Self::should_load_more) before
/// calling [`get_results`](Self::get_results). If two fetches overlap
/// anyway, whichever finishes last decides the final page bookkeeping.
///
/// State lives in atomics so an observer sharing the mediator can watch
/// `is_fetching` flip while a fetch is suspended. They are plain
/// loads and stores; nothing here blocks.
pub struct PagingMediator<P, T, F> {
    page_size: u32,
    current_page: AtomicU32,
    total_pages: AtomicU32,
    is_fetching: AtomicBool,
    fetcher: F,
    _marker: PhantomData<fn(P) -> T>,
}

impl<P, T, F> PagingMediator<P, T, F>
where
    P: Send + 'static,
    T: Send + 'static,
    F: PagedFetch<P, T>,
{
    /// Create a mediator fetching `page_size` items per page
    ///
    /// `page_size` should be at least the number of rows visible at once,
    /// otherwise the trigger row may never come into view. Zero is rejected.
    pub fn new(page_size: u32, fetcher: F) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than zero"));
        }

        Ok(Self {
            page_size,
            current_page: AtomicU32::new(1),
            total_pages: AtomicU32::new(0),
            is_fetching: AtomicBool::new(false),
            fetcher,
            _marker: PhantomData,
        })
    }

    /// Create a mediator from a paging config section
    pub fn from_config(config: &PagingConfig, fetcher: F) -> Result<Self> {
        Self::new(config.page_size, fetcher)
    }

    /// Fetch the next page
    ///
    /// Resolves with `Ok(Some(items))` when the fetch returned a batch and a
    /// total count, `Ok(None)` when it returned neither data nor an error,
    /// and the fetch's own error otherwise. On error the page counters are
    /// left alone, so calling again retries the same page.
    pub async fn get_results(
        &self,
        params: P,
    ) -> std::result::Result<Option<Vec<T>>, PagingError> {
        self.is_fetching.store(true, Ordering::SeqCst);

        let page = self.current_page.load(Ordering::SeqCst);
        debug!("Fetching page {} (page size {})", page, self.page_size);

        let outcome = self.fetcher.fetch(params, page, self.page_size).await;

        self.is_fetching.store(false, Ordering::SeqCst);

        let fetched = match outcome {
            Ok(fetched) => fetched,
            Err(err) => {
                debug!("Page {} fetch failed: {}", page, err);
                return Err(err);
            }
        };

        Ok(self.apply(page, fetched))
    }

    fn apply(&self, page: u32, fetched: FetchedPage<T>) -> Option<Vec<T>> {
        let Some((items, total_count)) = fetched.into_parts() else {
            trace!("Page {} returned no items and no total", page);
            return None;
        };

        let total_pages = total_pages_for(total_count, self.page_size);
        self.total_pages.store(total_pages, Ordering::SeqCst);

        if !items.is_empty() {
            advance_page(&self.current_page);
        }

        debug!(
            "Page {} fetched: {} items, {} total over {} pages",
            page,
            items.len(),
            total_count,
            total_pages
        );
        Some(items)
    }

    /// Should the next page be requested now?
    ///
    /// `current_flat_index` is the 1-based rank of the item about to be
    /// rendered and `total_items_rendered` the number of items currently in
    /// the list. Triggers when the position is exactly one item before the
    /// end, i.e. `current_flat_index == total_items_rendered - 1`.
    pub fn should_load_more(&self, current_flat_index: usize, total_items_rendered: usize) -> bool {
        self.should_load_more_with_offset(
            current_flat_index,
            total_items_rendered,
            DEFAULT_LOAD_OFFSET,
        )
    }

    /// Like [`should_load_more`](Self::should_load_more), triggering when
    /// the render position is exactly `load_offset` items before the end
    pub fn should_load_more_with_offset(
        &self,
        current_flat_index: usize,
        total_items_rendered: usize,
        load_offset: usize,
    ) -> bool {
        let at_trigger = total_items_rendered
            .checked_sub(load_offset)
            .is_some_and(|trigger| current_flat_index == trigger);

        !self.is_fetching() && at_trigger && self.has_more_results()
    }

    /// Trigger decision for a sectioned list
    ///
    /// Flattens `index_path` against `layout` and delegates to
    /// [`should_load_more_with_offset`](Self::should_load_more_with_offset).
    pub fn should_load_more_at<L>(
        &self,
        layout: &L,
        index_path: IndexPath,
        load_offset: usize,
    ) -> bool
    where
        L: ListLayout + ?Sized,
    {
        let position = flatten(layout, index_path);
        self.should_load_more_with_offset(position.index, position.total, load_offset)
    }

    /// Restart pagination from page 1
    pub fn reset(&self) {
        self.current_page.store(1, Ordering::SeqCst);
        self.total_pages.store(0, Ordering::SeqCst);
        self.is_fetching.store(false, Ordering::SeqCst);
        debug!("Pagination reset");
    }

    /// Whether more pages are believed to exist
    pub fn has_more_results(&self) -> bool {
        self.current_page() <= self.total_pages()
    }

    /// Items requested per page
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The next page that will be fetched (1-based)
    pub fn current_page(&self) -> u32 {
        self.current_page.load(Ordering::SeqCst)
    }

    /// Last known page count, 0 if unknown
    pub fn total_pages(&self) -> u32 {
        self.total_pages.load(Ordering::SeqCst)
    }

    /// Whether a fetch is outstanding
    pub fn is_fetching(&self) -> bool {
        self.is_fetching.load(Ordering::SeqCst)
    }

    /// The wrapped fetch function
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch pages one after another as a stream
    ///
    /// The first page is always requested. After that a page is only
    /// requested once the previous one has been yielded and more results
    /// are known to exist. The stream ends after an error, an empty or
    /// absent batch, or the last page.
    pub fn pages(
        &self,
        params: P,
    ) -> impl Stream<Item = std::result::Result<Vec<T>, PagingError>> + '_
    where
        P: Clone,
    {
        stream::unfold(Some(params), move |state| async move {
            let params = state?;
            match self.get_results(params.clone()).await {
                Ok(Some(items)) if !items.is_empty() => {
                    let next = self.has_more_results().then_some(params);
                    Some((Ok(items), next))
                }
                Ok(_) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }
}

impl<P, T, F> fmt::Debug for PagingMediator<P, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagingMediator")
            .field("page_size", &self.page_size)
            .field("current_page", &self.current_page.load(Ordering::SeqCst))
            .field("total_pages", &self.total_pages.load(Ordering::SeqCst))
            .field("is_fetching", &self.is_fetching.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// `ceil(total_count / page_size)`, saturating at `u32::MAX`
pub(crate) fn total_pages_for(total_count: u64, page_size: u32) -> u32 {
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Move the page counter forward, saturating at `u32::MAX`
pub(crate) fn advance_page(counter: &AtomicU32) {
    // A `None` from `checked_add` leaves the counter untouched
    let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |page| {
        page.checked_add(1)
    });
}
