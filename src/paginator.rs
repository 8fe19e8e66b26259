//! Sequential page fetcher for server-side paged collections.
//!
//! Requests carry the generation they were issued under; [`Paginator::reset`]
//! bumps it, so a response arriving after a reset is discarded instead of
//! being appended to the fresh list.

use crate::errors::AppResult;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

type PageFuture<T> = Pin<Box<dyn Future<Output = AppResult<Vec<T>>> + Send>>;
type PageSource<T> = Arc<dyn Fn(u32) -> PageFuture<T> + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct PageState<T> {
    pub current_page: u32,
    pub is_loading: bool,
    pub end_reached: bool,
    pub items: Vec<T>,
    pub error: Option<String>,
    pub generation: u64,
}

impl<T> PageState<T> {
    fn initial(page: u32, generation: u64) -> Self {
        Self {
            current_page: page,
            is_loading: false,
            end_reached: false,
            items: Vec::new(),
            error: None,
            generation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A non-empty page was appended.
    Appended(usize),
    /// The page came back empty; no further fetches will be issued.
    EndReached,
    /// A fetch was already running or the end had been reached.
    Skipped,
    /// The paginator was reset while the request was in flight.
    Stale,
    Failed(String),
}

/// Clears `is_loading` when a `fetch_next` future is dropped before its
/// page arrives.
struct LoadingGuard<'a, T>
where
    T: Clone + Send + Sync + 'static,
{
    paginator: &'a Paginator<T>,
    generation: u64,
    armed: bool,
}

impl<T> Drop for LoadingGuard<'_, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut s = self.paginator.lock();
        if s.generation == self.generation && s.is_loading {
            debug!(generation = self.generation, "page request abandoned");
            s.is_loading = false;
            self.paginator.publish(&s);
        }
    }
}

pub struct Paginator<T> {
    initial_key: u32,
    source: PageSource<T>,
    state: Mutex<PageState<T>>,
    tx: watch::Sender<PageState<T>>,
}

impl<T> Paginator<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// `source` receives the page number to load; the first request asks for
    /// `initial_key + 1`.
    pub fn new<F, Fut>(initial_key: u32, source: F) -> Self
    where
        F: Fn(u32) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Vec<T>>> + Send + 'static,
    {
        let state = PageState::initial(initial_key, 0);
        let (tx, _) = watch::channel(state.clone());
        Self {
            initial_key,
            source: Arc::new(move |page| Box::pin(source(page)) as PageFuture<T>),
            state: Mutex::new(state),
            tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageState<T>> {
        // State stays consistent between statements; a poisoned lock is safe
        // to reuse.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &PageState<T>) {
        self.tx.send_replace(state.clone());
    }

    pub fn snapshot(&self) -> PageState<T> {
        self.lock().clone()
    }

    /// Receives a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<PageState<T>> {
        self.tx.subscribe()
    }

    pub async fn fetch_next(&self) -> FetchOutcome {
        let (page, generation) = {
            let mut s = self.lock();
            if s.is_loading || s.end_reached {
                return FetchOutcome::Skipped;
            }
            s.is_loading = true;
            s.error = None;
            self.publish(&s);
            (s.current_page + 1, s.generation)
        };

        let mut guard = LoadingGuard {
            paginator: self,
            generation,
            armed: true,
        };

        debug!(page, generation, "requesting page");
        let result = (self.source)(page).await;
        guard.armed = false;

        let mut s = self.lock();
        if s.generation != generation {
            debug!(page, generation, current = s.generation, "discarding stale page");
            return FetchOutcome::Stale;
        }

        s.is_loading = false;
        let outcome = match result {
            Ok(items) => {
                let n = items.len();
                s.current_page = page;
                s.end_reached = items.is_empty();
                s.items.extend(items);
                if n == 0 {
                    FetchOutcome::EndReached
                } else {
                    FetchOutcome::Appended(n)
                }
            }
            Err(e) => {
                let msg = e.user_message();
                s.error = Some(msg.clone());
                FetchOutcome::Failed(msg)
            }
        };
        self.publish(&s);
        outcome
    }

    /// Back to the initial page with no items. A request still in flight is
    /// not cancelled; its response will be reported as stale.
    pub fn reset(&self) {
        let mut s = self.lock();
        let generation = s.generation + 1;
        *s = PageState::initial(self.initial_key, generation);
        self.publish(&s);
    }
}
