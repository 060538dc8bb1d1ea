//! Tests for the mediator module

use super::paging::{advance_page, total_pages_for};
use super::*;
use crate::error::PagingError;
use crate::sections::IndexPath;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use test_case::test_case;
use tokio::sync::oneshot;

// ============================================================================
// Test Fetchers
// ============================================================================

/// Answers fetches from a fixed script and records the arguments
#[derive(Default)]
struct ScriptedFetch {
    responses: Mutex<VecDeque<FetchResult<u32>>>,
    calls: Mutex<Vec<(u32, u32)>>,
}

impl ScriptedFetch {
    fn new(responses: impl IntoIterator<Item = FetchResult<u32>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(u32, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PagedFetch<(), u32> for ScriptedFetch {
    async fn fetch(&self, _params: (), page: u32, limit: u32) -> FetchResult<u32> {
        self.calls.lock().unwrap().push((page, limit));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected fetch")
    }
}

/// Holds each fetch open until the test answers it
#[derive(Default)]
struct GatedFetch {
    gates: Mutex<VecDeque<oneshot::Receiver<FetchResult<u32>>>>,
    calls: Mutex<Vec<u32>>,
}

impl GatedFetch {
    fn gate(&self) -> oneshot::Sender<FetchResult<u32>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl PagedFetch<(), u32> for GatedFetch {
    async fn fetch(&self, _params: (), page: u32, _limit: u32) -> FetchResult<u32> {
        self.calls.lock().unwrap().push(page);
        let gate = self.gates.lock().unwrap().pop_front().expect("no gate");
        gate.await.expect("gate dropped")
    }
}

fn batch(len: u32) -> Vec<u32> {
    (0..len).collect()
}

fn page(len: u32, total: u64) -> FetchResult<u32> {
    Ok(FetchedPage::new(batch(len), total))
}

fn failure(message: &str) -> FetchResult<u32> {
    Err(PagingError::new(message))
}

fn mediator(
    responses: impl IntoIterator<Item = FetchResult<u32>>,
) -> PagingMediator<(), u32, ScriptedFetch> {
    PagingMediator::new(10, ScriptedFetch::new(responses)).unwrap()
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_zero_page_size_rejected() {
    let err = PagingMediator::new(0, ScriptedFetch::default()).unwrap_err();
    assert!(err.to_string().contains("page_size"));
}

#[test]
fn test_initial_state() {
    let mediator = mediator([]);

    assert_eq!(mediator.page_size(), 10);
    assert_eq!(mediator.current_page(), 1);
    assert_eq!(mediator.total_pages(), 0);
    assert!(!mediator.is_fetching());
    assert!(!mediator.has_more_results());
    assert!(mediator.fetcher().calls().is_empty());
}

#[test]
fn test_from_config() {
    let config = crate::config::PagingConfig {
        page_size: 25,
        load_offset: 4,
    };
    let mediator = PagingMediator::from_config(&config, ScriptedFetch::default()).unwrap();
    assert_eq!(mediator.page_size(), 25);
}

#[tokio::test]
async fn test_closure_fetcher() {
    let mediator = PagingMediator::new(5, |query: String, page: u32, limit: u32| async move {
        let items: Vec<String> = (0..limit).map(|i| format!("{query}-{page}-{i}")).collect();
        Ok::<_, PagingError>(FetchedPage::new(items, 12))
    })
    .unwrap();

    let items = mediator.get_results("q".to_string()).await.unwrap().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0], "q-1-0");
    assert_eq!(mediator.current_page(), 2);
    assert_eq!(mediator.total_pages(), 3);
}

// ============================================================================
// get_results Tests
// ============================================================================

#[tokio::test]
async fn test_scenarios_a_b_c() {
    let mediator = mediator([page(10, 25), page(10, 25), page(5, 25)]);

    let items = mediator.get_results(()).await.unwrap().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(mediator.current_page(), 2);
    assert_eq!(mediator.total_pages(), 3);

    mediator.get_results(()).await.unwrap();
    assert_eq!(mediator.current_page(), 3);
    assert_eq!(mediator.total_pages(), 3);

    let items = mediator.get_results(()).await.unwrap().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(mediator.current_page(), 4);
    assert_eq!(mediator.total_pages(), 3);

    assert!(!mediator.has_more_results());
    assert!(!mediator.should_load_more(24, 25));

    assert_eq!(mediator.fetcher().calls(), vec![(1, 10), (2, 10), (3, 10)]);
}

#[tokio::test]
async fn test_error_leaves_state_unchanged() {
    let mediator = mediator([page(10, 25), failure("network timeout"), page(10, 25)]);
    mediator.get_results(()).await.unwrap();

    let err = mediator.get_results(()).await.unwrap_err();
    assert_eq!(err, PagingError::new("network timeout"));
    assert_eq!(mediator.current_page(), 2);
    assert_eq!(mediator.total_pages(), 3);
    assert!(!mediator.is_fetching());

    // Retrying asks for the same page again
    mediator.get_results(()).await.unwrap();
    assert_eq!(mediator.fetcher().calls(), vec![(1, 10), (2, 10), (2, 10)]);
    assert_eq!(mediator.current_page(), 3);
}

#[tokio::test]
async fn test_error_before_first_success() {
    let mediator = mediator([failure("offline")]);

    let err = mediator.get_results(()).await.unwrap_err();
    assert_eq!(err.to_string(), "offline");
    assert_eq!(mediator.current_page(), 1);
    assert_eq!(mediator.total_pages(), 0);
}

#[tokio::test]
async fn test_empty_batch_updates_total_only() {
    let mediator = mediator([page(0, 40)]);

    let items = mediator.get_results(()).await.unwrap();
    assert_eq!(items, Some(vec![]));
    assert_eq!(mediator.current_page(), 1);
    assert_eq!(mediator.total_pages(), 4);
}

#[tokio::test]
async fn test_absent_data_is_noop_success() {
    let missing_total = Ok(FetchedPage {
        items: Some(batch(10)),
        total_count: None,
    });
    let missing_items = Ok(FetchedPage {
        items: None,
        total_count: Some(99),
    });
    let mediator = mediator([Ok(FetchedPage::empty()), missing_total, missing_items]);

    for _ in 0..3 {
        assert_eq!(mediator.get_results(()).await.unwrap(), None);
        assert_eq!(mediator.current_page(), 1);
        assert_eq!(mediator.total_pages(), 0);
        assert!(!mediator.is_fetching());
    }
}

#[test_case(25, 10 => 3 ; "partial last page")]
#[test_case(20, 10 => 2 ; "exact multiple")]
#[test_case(0, 10 => 0 ; "no items")]
#[test_case(1, 10 => 1 ; "single item")]
#[test_case(7, 1 => 7 ; "page size one")]
#[test_case(u64::MAX, 1 => u32::MAX ; "saturates")]
fn test_total_pages_derivation(total_count: u64, page_size: u32) -> u32 {
    total_pages_for(total_count, page_size)
}

#[test]
fn test_page_counter_advances() {
    let counter = AtomicU32::new(1);
    advance_page(&counter);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_page_counter_saturates() {
    let counter = AtomicU32::new(u32::MAX);
    advance_page(&counter);
    assert_eq!(counter.load(Ordering::SeqCst), u32::MAX);
}

// ============================================================================
// Fetching Flag Tests
// ============================================================================

#[tokio::test]
async fn test_fetching_flag_visible_during_fetch() {
    let mediator = PagingMediator::new(10, GatedFetch::default()).unwrap();
    let first = mediator.fetcher().gate();

    let fetch = mediator.get_results(());
    tokio::pin!(fetch);
    assert!(futures::poll!(fetch.as_mut()).is_pending());

    assert!(mediator.is_fetching());
    assert_eq!(mediator.current_page(), 1);

    first.send(page(10, 30)).unwrap();
    let items = fetch.await.unwrap().unwrap();

    assert_eq!(items.len(), 10);
    assert!(!mediator.is_fetching());
    assert!(mediator.should_load_more(9, 10));
}

#[tokio::test]
async fn test_fetching_blocks_trigger() {
    let mediator = PagingMediator::new(10, GatedFetch::default()).unwrap();

    let gate = mediator.fetcher().gate();
    gate.send(page(10, 30)).unwrap();
    mediator.get_results(()).await.unwrap();
    assert!(mediator.should_load_more(9, 10));

    let second = mediator.fetcher().gate();
    let fetch = mediator.get_results(());
    tokio::pin!(fetch);
    assert!(futures::poll!(fetch.as_mut()).is_pending());
    assert!(!mediator.should_load_more(9, 10));

    second.send(failure("boom")).unwrap();
    assert!(fetch.await.is_err());
    assert!(!mediator.is_fetching());
    assert!(mediator.should_load_more(9, 10));
}

#[tokio::test]
async fn test_overlapping_fetches_are_not_refused() {
    let mediator = PagingMediator::new(10, GatedFetch::default()).unwrap();
    let first = mediator.fetcher().gate();
    let second = mediator.fetcher().gate();

    let a = mediator.get_results(());
    let b = mediator.get_results(());
    tokio::pin!(a);
    tokio::pin!(b);
    assert!(futures::poll!(a.as_mut()).is_pending());
    assert!(futures::poll!(b.as_mut()).is_pending());

    // Both fetches asked for the same page
    assert_eq!(*mediator.fetcher().calls.lock().unwrap(), vec![1, 1]);

    second.send(page(10, 30)).unwrap();
    b.await.unwrap();
    assert_eq!(mediator.total_pages(), 3);
    assert!(!mediator.is_fetching());

    // The later response decides the final totals
    first.send(page(10, 50)).unwrap();
    a.await.unwrap();
    assert_eq!(mediator.current_page(), 3);
    assert_eq!(mediator.total_pages(), 5);
}

// ============================================================================
// Trigger Tests
// ============================================================================

fn primed(total_count: u64) -> PagingMediator<(), u32, ScriptedFetch> {
    let mediator = mediator([page(10, total_count)]);
    tokio_test::block_on(mediator.get_results(())).unwrap();
    mediator
}

#[test]
fn test_trigger_false_before_first_fetch() {
    let mediator = mediator([]);
    assert!(!mediator.should_load_more(9, 10));
    assert!(!mediator.should_load_more(0, 1));
}

#[test_case(1, 19 => true ; "offset one at boundary")]
#[test_case(1, 18 => false ; "offset one before boundary")]
#[test_case(1, 20 => false ; "offset one past boundary")]
#[test_case(5, 15 => true ; "offset five at boundary")]
#[test_case(5, 14 => false ; "offset five before boundary")]
#[test_case(5, 16 => false ; "offset five past boundary")]
#[test_case(0, 20 => true ; "offset zero on last row")]
#[test_case(25, 0 => false ; "offset beyond rendered rows")]
fn test_trigger_boundary(load_offset: usize, index: usize) -> bool {
    primed(100).should_load_more_with_offset(index, 20, load_offset)
}

#[test]
fn test_default_offset_is_one() {
    let mediator = primed(100);
    assert!(mediator.should_load_more(9, 10));
    assert!(!mediator.should_load_more(10, 10));
    assert_eq!(
        mediator.should_load_more(9, 10),
        mediator.should_load_more_with_offset(9, 10, DEFAULT_LOAD_OFFSET)
    );
}

#[test]
fn test_trigger_false_when_single_page() {
    let mediator = primed(10);
    assert_eq!(mediator.current_page(), 2);
    assert_eq!(mediator.total_pages(), 1);
    assert!(!mediator.should_load_more(9, 10));
}

#[test]
fn test_trigger_for_sections() {
    let mediator = primed(100);
    let layout: Vec<usize> = vec![4, 6];

    assert!(mediator.should_load_more_at(&layout, IndexPath::new(1, 4), 1));
    assert!(!mediator.should_load_more_at(&layout, IndexPath::new(1, 5), 1));
    assert!(mediator.should_load_more_at(&layout, IndexPath::new(0, 3), 6));
    assert!(!mediator.should_load_more_at(&layout[..], IndexPath::new(0, 3), 5));
}

// ============================================================================
// Reset Tests
// ============================================================================

#[tokio::test]
async fn test_reset_after_last_page() {
    let mediator = mediator([page(10, 25), page(10, 25), page(5, 25), page(10, 25)]);
    for _ in 0..3 {
        mediator.get_results(()).await.unwrap();
    }

    mediator.reset();
    assert_eq!(mediator.current_page(), 1);
    assert_eq!(mediator.total_pages(), 0);
    assert!(!mediator.is_fetching());
    assert_eq!(mediator.page_size(), 10);

    mediator.get_results(()).await.unwrap();
    assert_eq!(mediator.fetcher().calls().last(), Some(&(1, 10)));
}

#[tokio::test]
async fn test_reset_clears_stuck_fetching_flag() {
    let mediator = PagingMediator::new(10, GatedFetch::default()).unwrap();
    let _gate = mediator.fetcher().gate();

    {
        let fetch = mediator.get_results(());
        tokio::pin!(fetch);
        assert!(futures::poll!(fetch.as_mut()).is_pending());
    }
    assert!(mediator.is_fetching());

    mediator.reset();
    assert!(!mediator.is_fetching());
}

// ============================================================================
// Page Stream Tests
// ============================================================================

#[tokio::test]
async fn test_pages_stops_after_last_page() {
    let mediator = mediator([page(10, 25), page(10, 25), page(5, 25)]);

    let batches: Vec<_> = mediator.pages(()).collect().await;
    let sizes: Vec<usize> = batches
        .into_iter()
        .map(|batch| batch.unwrap().len())
        .collect();

    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(mediator.fetcher().calls().len(), 3);
}

#[tokio::test]
async fn test_pages_ends_after_error() {
    let mediator = mediator([page(10, 25), failure("down")]);

    let batches: Vec<_> = mediator.pages(()).collect().await;
    assert_eq!(batches.len(), 2);
    assert!(batches[0].is_ok());
    assert_eq!(batches[1], Err(PagingError::new("down")));
}

#[tokio::test]
async fn test_pages_empty_source() {
    let mediator = mediator([page(0, 0)]);

    let batches: Vec<_> = mediator.pages(()).collect().await;
    assert!(batches.is_empty());
    assert_eq!(mediator.fetcher().calls().len(), 1);
}
