//! Session state shared by the TUI and the CLI.
//!
//! [`ExpenseViewModel`] owns the draft being edited, the month cursor and a
//! continuously refreshed copy of every stored expense. It is driven from a
//! single task through `&mut self`; the only concurrent piece is the
//! background sync task started by [`ExpenseViewModel::initialize`], which
//! replaces the expense list whenever the store changes.
use anyhow::{anyhow, Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::db::{demo_expenses, LiveQuery};
use crate::models::{Expense, Month};
use crate::repository::ExpenseRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Uninitialized,
    Initializing,
    Ready,
}

/// What the presentation layer renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct UiState {
    pub(crate) current_draft: Expense,
    /// Every stored expense, date ascending. Always a whole snapshot.
    pub(crate) all_expenses: Vec<Expense>,
}

pub(crate) struct ExpenseViewModel {
    repository: ExpenseRepository,
    phase: Phase,
    current_draft: Expense,
    current_month: Month,
    all_expenses: watch::Receiver<Vec<Expense>>,
    /// Handed to the sync task on initialize.
    all_expenses_tx: Option<watch::Sender<Vec<Expense>>>,
    sync_task: Option<JoinHandle<()>>,
}

impl ExpenseViewModel {
    pub(crate) fn new(repository: ExpenseRepository, start_month: Month) -> Self {
        let (tx, rx) = watch::channel(Vec::new());
        Self {
            repository,
            phase: Phase::Uninitialized,
            current_draft: Expense::default(),
            current_month: start_month,
            all_expenses: rx,
            all_expenses_tx: Some(tx),
            sync_task: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    /// Seed demo data into an empty store and start mirroring the full
    /// expense list. Only the first call does anything; a failed attempt
    /// leaves the model in `Initializing` and is not retried.
    pub(crate) async fn initialize(&mut self) -> Result<()> {
        if self.phase != Phase::Uninitialized {
            tracing::debug!(phase = ?self.phase, "initialize ignored");
            return Ok(());
        }
        self.phase = Phase::Initializing;

        let count = self
            .repository
            .expense_count()
            .await
            .context("Failed to count expenses")?;
        if count == 0 {
            self.seed_demo_data().await?;
        }

        let mut live = self.repository.all_expenses_stream();
        let first = live
            .next_snapshot()
            .await
            .context("Failed to load expenses")?;
        let tx = self
            .all_expenses_tx
            .take()
            .ok_or_else(|| anyhow!("Expense sync already started"))?;
        tx.send_replace(first);
        self.sync_task = Some(tokio::spawn(sync_all_expenses(live, tx)));

        self.phase = Phase::Ready;
        tracing::info!(month = %self.current_month, "expense session ready");
        Ok(())
    }

    async fn seed_demo_data(&self) -> Result<()> {
        let demo = demo_expenses();
        tracing::info!(records = demo.len(), "seeding empty store with demo expenses");
        for expense in &demo {
            self.repository
                .insert_expense(expense)
                .await
                .context("Failed to seed demo expenses")?;
        }
        Ok(())
    }

    // ── Commands ──────────────────────────────────────────────

    pub(crate) fn stage_expense(&mut self, expense: Expense) {
        self.current_draft = expense;
    }

    /// Persist the staged draft. Validation is the caller's job.
    pub(crate) async fn commit_add(&self) -> Result<bool> {
        self.repository
            .insert_expense(&self.current_draft)
            .await
            .inspect_err(|e| tracing::error!("add expense failed: {e:#}"))
            .context("Failed to add expense")
    }

    /// Remove the stored row equal to the staged draft, id included.
    pub(crate) async fn commit_delete(&self) -> Result<bool> {
        self.repository
            .delete_expense(&self.current_draft)
            .await
            .inspect_err(|e| tracing::error!("delete expense failed: {e:#}"))
            .context("Failed to delete expense")
    }

    /// A new live query over the current month. Each call subscribes on its
    /// own; drop the result to stop it.
    pub(crate) fn monthly_view(&self) -> LiveQuery {
        self.repository
            .expenses_in_month(&self.current_month.prefix())
    }

    pub(crate) fn advance_month(&mut self) {
        self.current_month = self.current_month.next();
    }

    pub(crate) fn retreat_month(&mut self) {
        self.current_month = self.current_month.prev();
    }

    // ── Accessors ─────────────────────────────────────────────

    pub(crate) fn current_month(&self) -> Month {
        self.current_month
    }

    pub(crate) fn current_draft(&self) -> &Expense {
        &self.current_draft
    }

    pub(crate) fn ui_state(&self) -> UiState {
        UiState {
            current_draft: self.current_draft.clone(),
            all_expenses: self.all_expenses.borrow().clone(),
        }
    }

    /// A receiver that wakes whenever the expense list is replaced.
    pub(crate) fn watch_all_expenses(&self) -> watch::Receiver<Vec<Expense>> {
        self.all_expenses.clone()
    }

    pub(crate) fn repository(&self) -> &ExpenseRepository {
        &self.repository
    }
}

impl Drop for ExpenseViewModel {
    fn drop(&mut self) {
        if let Some(task) = self.sync_task.take() {
            task.abort();
        }
    }
}

/// Forward every snapshot of the full expense list to the view model until
/// the model is dropped or the store fails.
async fn sync_all_expenses(mut live: LiveQuery, tx: watch::Sender<Vec<Expense>>) {
    loop {
        match live.next_snapshot().await {
            Ok(all) => {
                tracing::debug!(records = all.len(), "expense list refreshed");
                if tx.send(all).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!("expense sync stopped: {e:#}");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests;
