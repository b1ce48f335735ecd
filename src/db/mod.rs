mod live;
mod schema;
mod seed;

use anyhow::{anyhow, Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::models::Expense;

pub(crate) use live::{LiveQuery, QueryFilter};
pub(crate) use seed::demo_expenses;

const SELECT_EXPENSES: &str = "SELECT id, date, detail, category, spend FROM expenses";

/// Handle to the local expense table. Cheap to clone; every clone shares the
/// same connection and change counter.
#[derive(Clone)]
pub(crate) struct ExpenseStore {
    inner: Arc<Inner>,
}

struct Inner {
    conn: Mutex<Connection>,
    /// Bumped after every write that changed the table.
    changes: watch::Sender<u64>,
}

impl ExpenseStore {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Drop the expense table so every later statement fails.
    #[cfg(test)]
    pub(crate) async fn drop_expenses_table(&self) -> Result<()> {
        self.with_conn(|conn| Ok(conn.execute_batch("DROP TABLE expenses")?))
            .await
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        migrate(&mut conn).context("Database migration failed")?;
        let (changes, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
                changes,
            }),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || -> Result<T> {
            let conn = inner
                .conn
                .lock()
                .map_err(|_| anyhow!("Database connection lock poisoned"))?;
            f(&conn)
        })
        .await
        .context("Database task failed")?
    }

    fn notify_changed(&self) {
        self.inner.changes.send_modify(|v| *v = v.wrapping_add(1));
    }

    fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    // ── Writes ────────────────────────────────────────────────

    /// Insert `expense`, ignoring it if the same content (or the same id)
    /// is already stored. Returns whether a row was written.
    pub(crate) async fn insert(&self, expense: &Expense) -> Result<bool> {
        let expense = expense.clone();
        let inserted = self
            .with_conn(move |conn| {
                let n = conn
                    .execute(
                        "INSERT OR IGNORE INTO expenses (id, date, detail, category, spend)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            expense.id,
                            expense.date,
                            expense.detail,
                            expense.category,
                            expense.spend_key(),
                        ],
                    )
                    .context("Failed to insert expense")?;
                if n > 0 {
                    tracing::info!(id = conn.last_insert_rowid(), date = %expense.date, "expense inserted");
                } else {
                    tracing::debug!(date = %expense.date, detail = %expense.detail, "duplicate expense ignored");
                }
                Ok(n > 0)
            })
            .await?;
        if inserted {
            self.notify_changed();
        }
        Ok(inserted)
    }

    /// Delete the row equal to `expense` in every column, id included.
    /// Returns whether a row was removed.
    pub(crate) async fn delete(&self, expense: &Expense) -> Result<bool> {
        let Some(id) = expense.id else {
            tracing::debug!(detail = %expense.detail, "delete skipped: expense has no id");
            return Ok(false);
        };
        let expense = expense.clone();
        let deleted = self
            .with_conn(move |conn| {
                let n = conn
                    .execute(
                        "DELETE FROM expenses
                         WHERE id = ?1 AND date = ?2 AND detail = ?3 AND category = ?4 AND spend = ?5",
                        params![
                            id,
                            expense.date,
                            expense.detail,
                            expense.category,
                            expense.spend_key(),
                        ],
                    )
                    .context("Failed to delete expense")?;
                if n > 0 {
                    tracing::info!(id, "expense deleted");
                } else {
                    tracing::debug!(id, "delete matched no expense");
                }
                Ok(n > 0)
            })
            .await?;
        if deleted {
            self.notify_changed();
        }
        Ok(deleted)
    }

    // ── Reads ─────────────────────────────────────────────────

    pub(crate) async fn count(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?)
        })
        .await
    }

    /// Live snapshots of every expense, date ascending.
    pub(crate) fn query_all(&self) -> LiveQuery {
        LiveQuery::new(self.clone(), QueryFilter::All)
    }

    /// Live snapshots of expenses whose date starts with `month` (`YYYY-MM`).
    /// This is a string-prefix match, so a malformed date that shares the
    /// prefix still matches.
    pub(crate) fn query_month(&self, month: &str) -> LiveQuery {
        LiveQuery::new(self.clone(), QueryFilter::Month(month.to_string()))
    }

    async fn snapshot(&self, filter: QueryFilter) -> Result<Vec<Expense>> {
        self.with_conn(move |conn| match filter {
            QueryFilter::All => {
                let mut stmt =
                    conn.prepare(&format!("{SELECT_EXPENSES} ORDER BY date ASC, id ASC"))?;
                let rows = stmt.query_map([], row_to_expense)?;
                Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
            }
            QueryFilter::Month(month) => {
                let mut stmt = conn.prepare(&format!(
                    "{SELECT_EXPENSES} WHERE date LIKE ?1 || '-%' ORDER BY date ASC, id ASC"
                ))?;
                let rows = stmt.query_map(params![month], row_to_expense)?;
                Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
            }
        })
        .await
    }

    // ── Export ────────────────────────────────────────────────

    /// Write one month of expenses to a CSV file. Returns the row count.
    pub(crate) async fn export_month_csv(&self, path: PathBuf, month: &str) -> Result<usize> {
        let expenses = self.snapshot(QueryFilter::Month(month.to_string())).await?;
        tokio::task::spawn_blocking(move || -> Result<usize> {
            let mut wtr = csv::Writer::from_path(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            wtr.write_record(["id", "date", "category", "spend", "detail"])?;
            for e in &expenses {
                wtr.write_record([
                    e.id.map(|id| id.to_string()).unwrap_or_default(),
                    e.date.clone(),
                    e.category.clone(),
                    e.spend.to_string(),
                    e.detail.clone(),
                ])?;
            }
            wtr.flush()?;
            Ok(expenses.len())
        })
        .await
        .context("Export task failed")?
    }
}

fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let spend_str: String = row.get(4)?;
    let spend = Decimal::from_str(&spend_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(Expense::new(row.get(1)?, row.get(2)?, row.get(3)?, spend).with_id(row.get(0)?))
}

fn migrate(conn: &mut Connection) -> Result<()> {
    let has_version_table: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !has_version_table {
        let tx = conn.transaction()?;
        tx.execute_batch(schema::SCHEMA_V1)?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![schema::CURRENT_VERSION],
        )?;
        tx.commit()?;
        tracing::info!(version = schema::CURRENT_VERSION, "database schema created");
        return Ok(());
    }

    let current: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    for &(from_version, sql) in schema::MIGRATIONS {
        if current <= from_version {
            conn.execute_batch(sql)?;
        }
    }

    if current < schema::CURRENT_VERSION {
        conn.execute(
            "UPDATE schema_version SET version = ?1",
            params![schema::CURRENT_VERSION],
        )?;
        tracing::info!(from = current, to = schema::CURRENT_VERSION, "database migrated");
    }

    Ok(())
}
