use anyhow::Result;

use crate::db::{ExpenseStore, LiveQuery};
use crate::models::Expense;

/// The only door from the state layer into storage. Every method forwards
/// to the store unchanged.
#[derive(Clone)]
pub(crate) struct ExpenseRepository {
    store: ExpenseStore,
}

impl ExpenseRepository {
    pub(crate) fn new(store: ExpenseStore) -> Self {
        Self { store }
    }

    pub(crate) fn all_expenses_stream(&self) -> LiveQuery {
        self.store.query_all()
    }

    pub(crate) fn expenses_in_month(&self, month: &str) -> LiveQuery {
        self.store.query_month(month)
    }

    pub(crate) async fn expense_count(&self) -> Result<i64> {
        self.store.count().await
    }

    pub(crate) async fn insert_expense(&self, expense: &Expense) -> Result<bool> {
        self.store.insert(expense).await
    }

    pub(crate) async fn delete_expense(&self, expense: &Expense) -> Result<bool> {
        self.store.delete(expense).await
    }

    pub(crate) fn store(&self) -> &ExpenseStore {
        &self.store
    }
}
