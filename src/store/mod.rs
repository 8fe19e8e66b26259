//! Local cache store: the only source of truth for reads.
//!
//! Writes are pure overwrites keyed by primary key and commit atomically per
//! call. Foreign keys are enforced by SQLite; ordering is the caller's job.

pub mod entity;
pub mod live;

use crate::db::log::ttlog;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use entity::{Entity, Table, upsert_sql};
use live::{InvalidationTracker, LiveQuery};
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, error};

/// Which rows a delete targets.
#[derive(Debug, Clone)]
pub enum Criteria {
    All,
    /// Rows whose single-column primary key is in the list.
    Ids(Vec<Value>),
    /// Rows where `column = value`.
    Eq(&'static str, Value),
}

impl Criteria {
    pub fn ids<I, V>(ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Criteria::Ids(ids.into_iter().map(Into::into).collect())
    }

    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Criteria::Eq(column, value.into())
    }

    fn where_clause<T: Entity>(&self) -> AppResult<(String, Vec<Value>)> {
        match self {
            Criteria::All => Ok((String::new(), Vec::new())),
            Criteria::Ids(ids) => {
                let [pk] = T::PRIMARY_KEY else {
                    return Err(AppError::Other(format!(
                        "delete by id needs a single-column key on {}",
                        T::TABLE.name()
                    )));
                };
                let placeholders = vec!["?"; ids.len()].join(",");
                Ok((format!(" WHERE {pk} IN ({placeholders})"), ids.clone()))
            }
            Criteria::Eq(column, value) => {
                if !T::COLUMNS.contains(column) {
                    return Err(AppError::Other(format!(
                        "unknown column {} on {}",
                        column,
                        T::TABLE.name()
                    )));
                }
                Ok((format!(" WHERE {column} = ?"), vec![value.clone()]))
            }
        }
    }
}

/// Map SQLite foreign-key failures to `ConstraintViolation`.
fn classify(table: &'static str, e: rusqlite::Error) -> AppError {
    if let rusqlite::Error::SqliteFailure(err, msg) = &e
        && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    {
        let message = msg.clone().unwrap_or_else(|| err.to_string());
        error!(table, %message, "foreign key violation, write rolled back");
        return AppError::ConstraintViolation { table, message };
    }
    AppError::Db(e)
}

/// Writes grouped in one SQLite transaction.
///
/// Created by [`CacheStore::batch`]; every touched table is announced to live
/// queries once the transaction commits.
pub struct Batch<'a> {
    tx: &'a Connection,
    touched: BTreeSet<Table>,
}

impl Batch<'_> {
    pub fn upsert<T: Entity>(&mut self, rows: &[T]) -> AppResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let table = T::TABLE.name();
        let mut stmt = self.tx.prepare_cached(&upsert_sql::<T>())?;
        for row in rows {
            stmt.execute(params_from_iter(row.to_values()))
                .map_err(|e| classify(table, e))?;
        }
        self.touched.insert(T::TABLE);
        debug!(table, rows = rows.len(), "upserted");
        Ok(rows.len())
    }

    pub fn delete<T: Entity>(&mut self, criteria: &Criteria) -> AppResult<usize> {
        let table = T::TABLE.name();
        let (clause, values) = criteria.where_clause::<T>()?;
        let sql = format!("DELETE FROM {table}{clause}");
        let n = self
            .tx
            .execute(&sql, params_from_iter(values))
            .map_err(|e| classify(table, e))?;
        if n > 0 {
            self.touched.insert(T::TABLE);
        }
        debug!(table, rows = n, "deleted");
        Ok(n)
    }

    /// Raw execution for statements that do not fit upsert/delete.
    pub fn execute(&mut self, table: Table, sql: &str, values: Vec<Value>) -> AppResult<usize> {
        let n = self
            .tx
            .execute(sql, params_from_iter(values))
            .map_err(|e| classify(table.name(), e))?;
        if n > 0 {
            self.touched.insert(table);
        }
        Ok(n)
    }

    /// Read inside the transaction (sees the batch's own writes).
    pub fn conn(&self) -> &Connection {
        self.tx
    }
}

#[derive(Clone)]
pub struct CacheStore {
    pool: Arc<DbPool>,
    tracker: InvalidationTracker,
}

impl CacheStore {
    pub fn open(path: &str) -> AppResult<Self> {
        Self::from_pool(DbPool::new(path)?)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        Self::from_pool(DbPool::in_memory()?)
    }

    fn from_pool(pool: DbPool) -> AppResult<Self> {
        let applied = pool.with_conn(run_pending_migrations)?;
        if applied > 0 {
            debug!(applied, path = pool.path(), "cache schema upgraded");
        }
        Ok(Self {
            pool: Arc::new(pool),
            tracker: InvalidationTracker::default(),
        })
    }

    pub fn path(&self) -> &str {
        self.pool.path()
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Insert-or-overwrite every row in one transaction.
    pub fn upsert<T: Entity>(&self, rows: &[T]) -> AppResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.batch(|b| b.upsert(rows))
    }

    pub fn delete<T: Entity>(&self, criteria: Criteria) -> AppResult<usize> {
        self.batch(|b| b.delete::<T>(&criteria))
    }

    /// Run several writes atomically. Deferred constraints are checked at
    /// commit; any failure rolls the whole batch back.
    pub fn batch<R, F>(&self, f: F) -> AppResult<R>
    where
        F: FnOnce(&mut Batch<'_>) -> AppResult<R>,
    {
        let (out, touched) = self.pool.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut batch = Batch {
                tx: &*tx,
                touched: BTreeSet::new(),
            };
            let out = f(&mut batch)?;
            let touched = batch.touched;
            tx.commit().map_err(|e| classify("batch", e))?;
            Ok((out, touched))
        })?;

        self.tracker.notify(touched);
        Ok(out)
    }

    /// One-shot read.
    pub fn query<R, F>(&self, f: F) -> AppResult<R>
    where
        F: FnOnce(&Connection) -> AppResult<R>,
    {
        self.pool.with_conn(|conn| f(&*conn))
    }

    /// Live read re-evaluated whenever one of `tables` is written.
    pub fn observe<R, F>(&self, tables: &[Table], f: F) -> LiveQuery<R>
    where
        R: Send + 'static,
        F: Fn(&Connection) -> AppResult<R> + Send + Sync + 'static,
    {
        LiveQuery::new(
            Arc::clone(&self.pool),
            self.tracker.clone(),
            tables,
            Arc::new(f),
        )
    }

    pub fn all<T: Entity>(&self) -> AppResult<Vec<T>> {
        self.query(|conn| load_all::<T>(conn))
    }

    pub fn get<T: Entity>(&self, id: impl Into<Value>) -> AppResult<Option<T>> {
        let id = id.into();
        self.query(|conn| load_by_id::<T>(conn, id))
    }

    /// Primary keys currently cached for a table keyed by one text column.
    pub fn ids<T: Entity>(&self) -> AppResult<HashSet<String>> {
        self.query(|conn| known_ids::<T>(conn))
    }

    pub fn count(&self, table: Table) -> AppResult<i64> {
        self.query(|conn| {
            let n = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.name()), [], |r| {
                r.get(0)
            })?;
            Ok(n)
        })
    }

    /// Record an entry in the internal log table.
    pub fn log(&self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        self.query(|conn| ttlog(conn, operation, target, message))
    }
}

// ---------------------------------------------------------------------------
// Shared read helpers
// ---------------------------------------------------------------------------

/// Collect rows produced by a prepared query.
pub fn collect<T, I>(rows: I) -> AppResult<Vec<T>>
where
    I: Iterator<Item = rusqlite::Result<T>>,
{
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_all<T: Entity>(conn: &Connection) -> AppResult<Vec<T>> {
    let mut stmt = conn.prepare_cached(&T::select_sql())?;
    let rows = stmt.query_map([], |row| T::from_row(row))?;
    collect(rows)
}

pub fn load_where<T: Entity>(
    conn: &Connection,
    clause: &str,
    values: Vec<Value>,
) -> AppResult<Vec<T>> {
    let sql = format!("{} WHERE {}", T::select_sql(), clause);
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| T::from_row(row))?;
    collect(rows)
}

pub fn load_by_id<T: Entity>(conn: &Connection, id: Value) -> AppResult<Option<T>> {
    let [pk] = T::PRIMARY_KEY else {
        return Err(AppError::Other(format!(
            "lookup by id needs a single-column key on {}",
            T::TABLE.name()
        )));
    };
    let mut rows = load_where::<T>(conn, &format!("{pk} = ?1"), vec![id])?;
    Ok(rows.pop())
}

pub fn known_ids<T: Entity>(conn: &Connection) -> AppResult<HashSet<String>> {
    let [pk] = T::PRIMARY_KEY else {
        return Err(AppError::Other(format!(
            "id set needs a single-column key on {}",
            T::TABLE.name()
        )));
    };
    let sql = format!("SELECT {pk} FROM {}", T::TABLE.name());
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    Ok(collect(rows)?.into_iter().collect())
}

/// `%query%` pattern for LIKE searches.
pub fn like(query: &str) -> Value {
    Value::Text(format!("%{}%", query.trim()))
}
