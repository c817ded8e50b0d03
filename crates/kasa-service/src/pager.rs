//! # Invoice Pager
//!
//! Cached skip/limit pagination over invoice listings.
//!
//! ## How Paging Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Pager                                  │
//! │                                                                      │
//! │  load_page(3)                                                        │
//! │    │                                                                 │
//! │    ├── cache hit? ──────────────► return cached page                 │
//! │    │                                                                 │
//! │    ▼ miss                                                            │
//! │  skip = (page − 1) × limit                                           │
//! │  rows = SELECT ... LIMIT limit OFFSET skip                           │
//! │  hasNextPage = rows.len() == limit       (heuristic, see below)      │
//! │    │                                                                 │
//! │    ├── still the latest request? ──► cache + prefetch page 4         │
//! │    └── superseded or invalidated? ─► return to caller, don't cache   │
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## hasNextPage Heuristic
//! A page is considered to have a successor when it came back full. When
//! the row count is an exact multiple of the limit this reports one
//! phantom extra page; following it yields an empty page with
//! `hasNextPage = false`. The alternative is a COUNT(*) per fetch, which
//! this trade accepts losing.
//!
//! ## Invalidation
//! Every invoice mutation bumps the cache epoch and clears all cached
//! pages. Fetches that started under an older epoch, and fetches that a
//! newer navigation superseded, still return to their caller but are
//! never written into the cache.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ApiResult;
use kasa_core::InvoiceSummary;
use kasa_db::InvoiceRepository;

/// Default page size for invoice listings.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// One page of invoice summaries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePage {
    pub items: Vec<InvoiceSummary>,
    /// 1-based page number.
    pub page: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Mutable pager internals behind one async lock.
#[derive(Default)]
struct PagerState {
    /// Bumped on every invalidation; fetches from older epochs are
    /// never cached.
    epoch: u64,
    /// Sequence of the newest load request; an older in-flight fetch is
    /// superseded and its result discarded.
    latest_seq: u64,
    pages: HashMap<u32, InvoicePage>,
    prefetch: Option<JoinHandle<()>>,
}

/// Page cache with background prefetch over the invoice repository.
#[derive(Clone)]
pub struct InvoicePager {
    repo: InvoiceRepository,
    limit: i64,
    state: Arc<Mutex<PagerState>>,
}

impl InvoicePager {
    /// Creates a pager with the given page size.
    pub fn new(repo: InvoiceRepository, limit: i64) -> Self {
        InvoicePager {
            repo,
            limit,
            state: Arc::new(Mutex::new(PagerState::default())),
        }
    }

    /// Loads a page, serving from cache when possible.
    ///
    /// On a cache miss the page is fetched and cached (unless the fetch
    /// was superseded or invalidated meanwhile). Whenever the returned
    /// page reports a successor that isn't cached yet, the successor is
    /// prefetched in the background; this holds for cache hits too, so
    /// a page first reached via prefetch keeps the pipeline warm.
    pub async fn load_page(&self, page: u32) -> ApiResult<InvoicePage> {
        if page == 0 {
            return Err(crate::error::ApiError::validation(
                "Page numbers start at 1",
            ));
        }

        let (epoch, seq) = {
            let mut state = self.state.lock().await;
            if let Some(cached) = state.pages.get(&page).cloned() {
                debug!(page, "Page cache hit");
                if cached.has_next_page && !state.pages.contains_key(&(page + 1)) {
                    let epoch = state.epoch;
                    self.spawn_prefetch(&mut state, epoch, page + 1);
                }
                return Ok(cached);
            }
            state.latest_seq += 1;
            (state.epoch, state.latest_seq)
        };

        // Fetch outside the lock; navigation stays responsive.
        let fetched = fetch_page(&self.repo, self.limit, page).await?;

        let mut state = self.state.lock().await;
        if apply_fetch(&mut state, epoch, seq, fetched.clone()) {
            if fetched.has_next_page && !state.pages.contains_key(&(page + 1)) {
                self.spawn_prefetch(&mut state, epoch, page + 1);
            }
        } else {
            debug!(page, "Discarding superseded page fetch");
        }

        Ok(fetched)
    }

    /// Drops every cached page and cancels any in-flight prefetch.
    ///
    /// Called after every invoice mutation: with skip/limit paging any
    /// insert or delete shifts page boundaries, so nothing cached stays
    /// trustworthy.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.pages.clear();
        if let Some(handle) = state.prefetch.take() {
            handle.abort();
        }
        debug!(epoch = state.epoch, "Page cache invalidated");
    }

    /// Waits for the current background prefetch, if any, to settle.
    ///
    /// Lets tests assert on cache contents deterministically.
    pub async fn prefetch_settled(&self) {
        let handle = {
            let mut state = self.state.lock().await;
            state.prefetch.take()
        };
        if let Some(handle) = handle {
            // An aborted prefetch returns a JoinError; both outcomes
            // leave the cache consistent.
            let _ = handle.await;
        }
    }

    fn spawn_prefetch(&self, state: &mut PagerState, epoch: u64, page: u32) {
        let repo = self.repo.clone();
        let limit = self.limit;
        let shared = Arc::clone(&self.state);

        let handle = tokio::spawn(async move {
            let Ok(fetched) = fetch_page(&repo, limit, page).await else {
                return;
            };
            let mut state = shared.lock().await;
            // A prefetched page is still valid data as long as no
            // mutation happened; navigation elsewhere doesn't spoil it.
            if state.epoch == epoch {
                state.pages.entry(page).or_insert(fetched);
            }
        });

        if let Some(old) = state.prefetch.replace(handle) {
            old.abort();
        }
    }

    #[cfg(test)]
    async fn cached_page_numbers(&self) -> Vec<u32> {
        let state = self.state.lock().await;
        let mut pages: Vec<u32> = state.pages.keys().copied().collect();
        pages.sort_unstable();
        pages
    }
}

/// Fetches one page from the repository.
async fn fetch_page(repo: &InvoiceRepository, limit: i64, page: u32) -> ApiResult<InvoicePage> {
    let skip = (page as i64 - 1) * limit;
    let items = repo.list_page(skip, limit).await?;
    let has_next_page = items.len() as i64 == limit;

    Ok(InvoicePage {
        items,
        page,
        has_next_page,
        has_previous_page: page > 1,
    })
}

/// Writes a fetched page into the cache if it is still wanted.
///
/// Returns false when the fetch was superseded by a newer load or by an
/// invalidation.
fn apply_fetch(state: &mut PagerState, epoch: u64, seq: u64, page: InvoicePage) -> bool {
    if state.epoch != epoch || state.latest_seq != seq {
        return false;
    }
    state.pages.insert(page.page, page);
    true
}

// =============================================================================
// Unit Tests
// =============================================================================
