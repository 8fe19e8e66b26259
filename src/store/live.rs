//! Live queries: table-level invalidation fanned out over a broadcast channel.
//!
//! Every committed write announces the set of tables it touched. A
//! [`LiveQuery`] re-runs its SQL whenever one of its watched tables shows up
//! in such an announcement.

use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::store::entity::Table;
use futures::Stream;
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, trace};

pub type TableSet = Arc<BTreeSet<Table>>;

/// Default buffer of pending invalidations per subscriber.
const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct InvalidationTracker {
    sender: broadcast::Sender<TableSet>,
}

impl Default for InvalidationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl InvalidationTracker {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn notify(&self, tables: BTreeSet<Table>) {
        if tables.is_empty() {
            return;
        }
        trace!(?tables, "tables invalidated");
        // No receivers just means nobody is observing right now.
        let _ = self.sender.send(Arc::new(tables));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableSet> {
        self.sender.subscribe()
    }
}

type QueryFn<R> = Arc<dyn Fn(&Connection) -> AppResult<R> + Send + Sync>;

/// A continuously re-evaluated query.
///
/// The first call to [`next`](LiveQuery::next) yields the current result;
/// every later call waits for a write to one of the watched tables. The
/// sequence never ends while the store is alive.
pub struct LiveQuery<R> {
    pool: Arc<DbPool>,
    tracker: InvalidationTracker,
    tables: Arc<[Table]>,
    query: QueryFn<R>,
    rx: broadcast::Receiver<TableSet>,
    primed: bool,
}

impl<R: Send + 'static> LiveQuery<R> {
    pub(crate) fn new(
        pool: Arc<DbPool>,
        tracker: InvalidationTracker,
        tables: &[Table],
        query: QueryFn<R>,
    ) -> Self {
        // Subscribe before the first read so no write can slip in between.
        let rx = tracker.subscribe();
        Self {
            pool,
            tracker,
            tables: Arc::from(tables),
            query,
            rx,
            primed: false,
        }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Run the query right now without consuming a notification.
    pub fn current(&self) -> AppResult<R> {
        let query = Arc::clone(&self.query);
        self.pool.with_conn(|conn| query(&*conn))
    }

    /// Same as [`current`](LiveQuery::current), on the blocking pool.
    async fn evaluate(&self) -> AppResult<R> {
        let pool = Arc::clone(&self.pool);
        let query = Arc::clone(&self.query);
        tokio::task::spawn_blocking(move || pool.with_conn(|conn| query(&*conn)))
            .await
            .map_err(|e| AppError::Other(format!("live query task failed: {e}")))?
    }

    pub async fn next(&mut self) -> Option<AppResult<R>> {
        if !self.primed {
            self.primed = true;
            return Some(self.evaluate().await);
        }

        loop {
            match self.rx.recv().await {
                Ok(changed) => {
                    if changed.iter().any(|t| self.tables.contains(t)) {
                        return Some(self.evaluate().await);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, tables = ?self.tables, "live query lagged, re-evaluating");
                    return Some(self.evaluate().await);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Start over: a fresh subscription whose first item is the current value.
    pub fn resubscribe(&self) -> LiveQuery<R> {
        LiveQuery::new(
            Arc::clone(&self.pool),
            self.tracker.clone(),
            &self.tables,
            Arc::clone(&self.query),
        )
    }

    /// Transform every emitted value.
    pub fn map<U, F>(self, f: F) -> LiveQuery<U>
    where
        U: Send + 'static,
        F: Fn(R) -> U + Send + Sync + 'static,
    {
        let inner = self.query;
        LiveQuery {
            pool: self.pool,
            tracker: self.tracker,
            tables: self.tables,
            query: Arc::new(move |conn: &Connection| inner(conn).map(&f)),
            rx: self.rx,
            primed: self.primed,
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = AppResult<R>> + Send {
        futures::stream::unfold(self, |mut live| async move {
            live.next().await.map(|item| (item, live))
        })
    }
}
