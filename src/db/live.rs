use anyhow::{anyhow, Result};
use tokio::sync::watch;

use super::ExpenseStore;
use crate::models::Expense;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryFilter {
    All,
    /// `YYYY-MM` prefix, matched as `date LIKE prefix || '-%'`.
    Month(String),
}

/// A push-updating query over the expense table.
///
/// Nothing runs until the first [`LiveQuery::next_snapshot`] call, which
/// resolves immediately with the current contents. Each later call waits
/// for the store's change counter to move and then re-runs the query, so
/// every snapshot is a complete, authoritative result rather than a diff.
/// Several writes landing before the consumer polls again are folded into
/// one snapshot; snapshots are never delivered out of order.
pub(crate) struct LiveQuery {
    store: ExpenseStore,
    filter: QueryFilter,
    changes: watch::Receiver<u64>,
    started: bool,
}

impl LiveQuery {
    pub(super) fn new(store: ExpenseStore, filter: QueryFilter) -> Self {
        let changes = store.subscribe_changes();
        Self {
            store,
            filter,
            changes,
            started: false,
        }
    }

    pub(crate) fn filter(&self) -> &QueryFilter {
        &self.filter
    }

    pub(crate) async fn next_snapshot(&mut self) -> Result<Vec<Expense>> {
        if self.started {
            self.changes
                .changed()
                .await
                .map_err(|_| anyhow!("Expense store closed"))?;
        } else {
            self.started = true;
            self.changes.borrow_and_update();
        }
        self.store.snapshot(self.filter.clone()).await
    }

    /// True when a call to `next_snapshot` would resolve without waiting.
    pub(crate) fn has_pending(&self) -> bool {
        !self.started || self.changes.has_changed().unwrap_or(false)
    }

    /// Resolve once `next_snapshot` would return without waiting. Nothing is
    /// consumed, so this can be raced in `select!` and dropped freely.
    pub(crate) async fn wait_pending(&self) {
        if self.has_pending() {
            return;
        }
        let mut changes = self.changes.clone();
        if changes.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// A fresh query over the same filter, starting from a new initial snapshot.
    pub(crate) fn restart(&self) -> Self {
        Self::new(self.store.clone(), self.filter.clone())
    }
}
