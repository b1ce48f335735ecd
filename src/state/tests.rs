#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rust_decimal_macros::dec;

use super::*;
use crate::db::ExpenseStore;
use crate::models::DEFAULT_MONTH;

const WAIT: Duration = Duration::from_secs(5);

fn new_model() -> ExpenseViewModel {
    let store = ExpenseStore::open_in_memory().unwrap();
    ExpenseViewModel::new(ExpenseRepository::new(store), DEFAULT_MONTH)
}

async fn wait_for_expenses<F>(model: &ExpenseViewModel, pred: F) -> Vec<Expense>
where
    F: FnMut(&Vec<Expense>) -> bool,
{
    let mut rx = model.watch_all_expenses();
    let all = tokio::time::timeout(WAIT, rx.wait_for(pred))
        .await
        .unwrap()
        .unwrap()
        .clone();
    all
}

fn bus() -> Expense {
    Expense::new(
        "2025-04-15".into(),
        "Bus".into(),
        "Transport".into(),
        dec!(2.5),
    )
}

// ── Initialization ────────────────────────────────────────────

#[tokio::test]
async fn test_new_model_is_uninitialized_and_blank() {
    let model = new_model();
    assert_eq!(model.phase(), Phase::Uninitialized);
    assert_eq!(model.ui_state(), UiState::default());
    assert_eq!(model.current_month(), DEFAULT_MONTH);
}

#[tokio::test]
async fn test_initialize_seeds_empty_store() {
    let mut model = new_model();
    model.initialize().await.unwrap();

    let n = demo_expenses().len();
    assert_eq!(model.phase(), Phase::Ready);
    assert_eq!(model.repository().expense_count().await.unwrap(), n as i64);
    assert_eq!(model.ui_state().all_expenses.len(), n);
}

#[tokio::test]
async fn test_initialize_does_not_seed_non_empty_store() {
    let store = ExpenseStore::open_in_memory().unwrap();
    store.insert(&bus()).await.unwrap();
    let mut model = ExpenseViewModel::new(ExpenseRepository::new(store), DEFAULT_MONTH);
    model.initialize().await.unwrap();

    assert_eq!(model.repository().expense_count().await.unwrap(), 1);
    let all = model.ui_state().all_expenses;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].detail, "Bus");
}

#[tokio::test]
async fn test_initialize_twice_is_noop() {
    let mut model = new_model();
    model.initialize().await.unwrap();
    let before = model.repository().expense_count().await.unwrap();
    model.initialize().await.unwrap();
    assert_eq!(model.phase(), Phase::Ready);
    assert_eq!(model.repository().expense_count().await.unwrap(), before);
}

#[tokio::test]
async fn test_all_expenses_sorted_after_initialize() {
    let mut model = new_model();
    model.initialize().await.unwrap();
    let all = model.ui_state().all_expenses;
    assert!(all.windows(2).all(|w| w[0].date <= w[1].date));
}

// ── Stage / commit ────────────────────────────────────────────

#[tokio::test]
async fn test_stage_expense_sets_draft_only() {
    let mut model = new_model();
    model.stage_expense(bus());
    assert_eq!(model.current_draft(), &bus());
    assert!(model.ui_state().all_expenses.is_empty());
    assert_eq!(model.repository().expense_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_commit_add_reaches_monthly_view() {
    let mut model = new_model();
    model.initialize().await.unwrap();
    let mut april = model.monthly_view();
    let before = april.next_snapshot().await.unwrap();

    model.stage_expense(bus());
    assert!(model.commit_add().await.unwrap());

    let after = april.next_snapshot().await.unwrap();
    assert_eq!(after.len(), before.len() + 1);
    let added: Vec<&Expense> = after.iter().filter(|e| e.id.is_some() && e.detail == "Bus" && e.date == "2025-04-15").collect();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].spend, dec!(2.5));
    assert_eq!(added[0].category, "Transport");
    for e in &before {
        assert!(after.contains(e));
    }
}

#[tokio::test]
async fn test_commit_add_updates_all_expenses() {
    let mut model = new_model();
    model.initialize().await.unwrap();
    let n = model.ui_state().all_expenses.len();

    model.stage_expense(bus());
    model.commit_add().await.unwrap();

    let all = wait_for_expenses(&model, |all| all.len() == n + 1).await;
    assert!(all.iter().any(|e| e.detail == "Bus" && e.date == "2025-04-15"));
}

#[tokio::test]
async fn test_commit_add_duplicate_is_silent() {
    let mut model = new_model();
    model.initialize().await.unwrap();
    model.stage_expense(bus());
    assert!(model.commit_add().await.unwrap());
    let count = model.repository().expense_count().await.unwrap();
    assert!(!model.commit_add().await.unwrap());
    assert_eq!(model.repository().expense_count().await.unwrap(), count);
}

#[tokio::test]
async fn test_commit_delete_seeded_record() {
    let mut model = new_model();
    model.initialize().await.unwrap();
    let n = demo_expenses().len();
    let victim = model.ui_state().all_expenses[3].clone();
    assert!(victim.id.is_some());

    model.stage_expense(victim.clone());
    assert!(model.commit_delete().await.unwrap());

    assert_eq!(
        model.repository().expense_count().await.unwrap(),
        (n - 1) as i64
    );
    let all = wait_for_expenses(&model, |all| all.len() == n - 1).await;
    assert!(!all.contains(&victim));
}

#[tokio::test]
async fn test_commit_delete_without_id_is_noop() {
    let mut model = new_model();
    model.initialize().await.unwrap();
    let mut victim = model.ui_state().all_expenses[0].clone();
    victim.id = None;
    model.stage_expense(victim);
    assert!(!model.commit_delete().await.unwrap());
    assert_eq!(
        model.repository().expense_count().await.unwrap(),
        demo_expenses().len() as i64
    );
}

#[tokio::test]
async fn test_commit_before_initialize_still_persists() {
    let mut model = new_model();
    model.stage_expense(bus());
    assert!(model.commit_add().await.unwrap());
    assert_eq!(model.repository().expense_count().await.unwrap(), 1);
    // No subscription yet, so the mirrored list is still empty.
    assert!(model.ui_state().all_expenses.is_empty());
}

// ── Storage failures ──────────────────────────────────────────

#[tokio::test]
async fn test_failed_initialize_stays_initializing() {
    let mut model = new_model();
    model.repository().store().drop_expenses_table().await.unwrap();

    assert!(model.initialize().await.is_err());
    assert_eq!(model.phase(), Phase::Initializing);

    model.initialize().await.unwrap();
    assert_eq!(model.phase(), Phase::Initializing);
    assert!(model.ui_state().all_expenses.is_empty());
}

#[tokio::test]
async fn test_failed_commit_add_leaves_state_unchanged() {
    let mut model = new_model();
    model.initialize().await.unwrap();
    model.stage_expense(bus());
    let before = model.ui_state();
    model.repository().store().drop_expenses_table().await.unwrap();

    let err = model.commit_add().await.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to add expense"));
    assert_eq!(model.ui_state(), before);
    assert_eq!(model.current_draft(), &bus());
}

#[tokio::test]
async fn test_failed_commit_delete_leaves_state_unchanged() {
    let mut model = new_model();
    model.initialize().await.unwrap();
    let target = model.ui_state().all_expenses[0].clone();
    model.stage_expense(target.clone());
    let before = model.ui_state();
    model.repository().store().drop_expenses_table().await.unwrap();

    let err = model.commit_delete().await.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to delete expense"));
    assert_eq!(model.ui_state(), before);
    assert!(before.all_expenses.contains(&target));
}

// ── Month cursor ──────────────────────────────────────────────

#[tokio::test]
async fn test_month_navigation() {
    let mut model = new_model();
    model.advance_month();
    assert_eq!(model.current_month().to_string(), "2025-05");
    model.retreat_month();
    model.retreat_month();
    assert_eq!(model.current_month().to_string(), "2025-03");
}

#[tokio::test]
async fn test_month_navigation_rolls_over_year() {
    let store = ExpenseStore::open_in_memory().unwrap();
    let december: Month = "2025-12".parse().unwrap();
    let mut model = ExpenseViewModel::new(ExpenseRepository::new(store), december);
    model.advance_month();
    assert_eq!(model.current_month().to_string(), "2026-01");
    model.retreat_month();
    model.retreat_month();
    assert_eq!(model.current_month().to_string(), "2025-11");
}

#[tokio::test]
async fn test_monthly_view_follows_cursor() {
    let mut model = new_model();
    model.initialize().await.unwrap();

    let april = model.monthly_view().next_snapshot().await.unwrap();
    assert!(!april.is_empty());
    assert!(april.iter().all(|e| e.date.starts_with("2025-04-")));

    model.advance_month();
    let may = model.monthly_view().next_snapshot().await.unwrap();
    assert!(!may.is_empty());
    assert!(may.iter().all(|e| e.date.starts_with("2025-05-")));

    model.advance_month();
    assert!(model.monthly_view().next_snapshot().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_monthly_view_calls_are_independent() {
    let mut model = new_model();
    model.initialize().await.unwrap();
    let mut first = model.monthly_view();
    first.next_snapshot().await.unwrap();
    let second = model.monthly_view();
    assert!(!first.has_pending());
    assert!(second.has_pending());
}
