#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn make_expense(date: &str, category: &str, spend: Decimal) -> Expense {
    Expense::new(date.into(), "Test".into(), category.into(), spend)
}

// ── Expense ───────────────────────────────────────────────────

#[test]
fn test_expense_default_is_blank() {
    let e = Expense::default();
    assert!(e.id.is_none());
    assert!(e.date.is_empty());
    assert!(e.detail.is_empty());
    assert!(e.category.is_empty());
    assert_eq!(e.spend, Decimal::ZERO);
}

#[test]
fn test_expense_with_id() {
    let e = make_expense("2025-04-01", "Food", dec!(3)).with_id(7);
    assert_eq!(e.id, Some(7));
}

#[test]
fn test_spend_key_normalizes_trailing_zeros() {
    let a = make_expense("2025-04-01", "Food", dec!(2.5));
    let b = make_expense("2025-04-01", "Food", dec!(2.50));
    assert_eq!(a.spend_key(), "2.5");
    assert_eq!(a.spend_key(), b.spend_key());
    assert_eq!(make_expense("2025-04-01", "Food", dec!(200.00)).spend_key(), "200");
}

#[test]
fn test_expense_from_input() {
    let e = Expense::from_input(" 2025-04-15 ", "transport", "2.50", " Bus ");
    assert_eq!(
        e,
        Expense::new("2025-04-15".into(), "Bus".into(), "Transport".into(), dec!(2.50))
    );

    let raw = Expense::from_input("2025-04-15", " Gadgets ", "abc", "");
    assert_eq!(raw.category, "Gadgets");
    assert_eq!(raw.spend, Decimal::ZERO);
    assert!(raw.detail.is_empty());
}

#[test]
fn test_expense_category_kind() {
    assert_eq!(
        make_expense("2025-04-01", "transport", dec!(1)).category_kind(),
        Some(Category::Transport)
    );
    assert_eq!(make_expense("2025-04-01", "Gadgets", dec!(1)).category_kind(), None);
}

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_category_parse() {
    assert_eq!(Category::parse("food"), Some(Category::Food));
    assert_eq!(Category::parse("FOOD"), Some(Category::Food));
    assert_eq!(Category::parse(" Bills "), Some(Category::Bills));
    assert_eq!(Category::parse("unknown"), None);
    assert_eq!(Category::parse(""), None);
}

#[test]
fn test_category_roundtrip() {
    for c in Category::all() {
        assert_eq!(Category::parse(c.as_str()), Some(*c), "Roundtrip failed for {c}");
    }
}

#[test]
fn test_category_cycle_wraps() {
    assert_eq!(Category::Food.cycle(1), Category::Transport);
    assert_eq!(Category::Food.cycle(-1), Category::Other);
    assert_eq!(Category::Other.cycle(1), Category::Food);
}

#[test]
fn test_category_display() {
    assert_eq!(format!("{}", Category::Entertainment), "Entertainment");
}

// ── Month ─────────────────────────────────────────────────────

#[test]
fn test_month_parse_and_display() {
    let m: Month = "2025-04".parse().unwrap();
    assert_eq!(m, Month::new(2025, 4).unwrap());
    assert_eq!(m, DEFAULT_MONTH);
    assert_eq!(m.to_string(), "2025-04");
}

#[test]
fn test_month_parse_rejects_malformed() {
    assert!("2025-13".parse::<Month>().is_err());
    assert!("2025-00".parse::<Month>().is_err());
    assert!("2025-4".parse::<Month>().is_err());
    assert!("25-04".parse::<Month>().is_err());
    assert!("2025/04".parse::<Month>().is_err());
    assert!("abcd-ef".parse::<Month>().is_err());
    assert!("".parse::<Month>().is_err());
}

#[test]
fn test_month_next_rolls_over_year() {
    let m: Month = "2025-12".parse().unwrap();
    assert_eq!(m.next().to_string(), "2026-01");
}

#[test]
fn test_month_prev_rolls_over_year() {
    let m: Month = "2025-01".parse().unwrap();
    assert_eq!(m.prev().to_string(), "2024-12");
}

#[test]
fn test_month_next_within_year_pads() {
    let m: Month = "2025-09".parse().unwrap();
    assert_eq!(m.next().to_string(), "2025-10");
    assert_eq!(m.prev().to_string(), "2025-08");
}

#[test]
fn test_month_next_prev_inverse() {
    for year in [1999, 2024, 2025] {
        for month in 1..=12 {
            let m = Month::new(year, month).unwrap();
            assert_eq!(m.prev().next(), m);
            assert_eq!(m.next().prev(), m);
        }
    }
}

#[test]
fn test_month_steps_stop_at_range_ends() {
    let last = Month::new(9999, 12).unwrap();
    assert_eq!(last.next(), last);
    assert_eq!(last.next().to_string().parse::<Month>().unwrap(), last);

    let first = Month::new(0, 1).unwrap();
    assert_eq!(first.prev(), first);
    assert_eq!(first.prev().to_string(), "0000-01");
    assert_eq!(first.next().to_string(), "0000-02");
}

#[test]
fn test_month_display_name() {
    assert_eq!(DEFAULT_MONTH.display_name(), "April 2025");
    assert_eq!(Month::new(2024, 12).unwrap().display_name(), "December 2024");
}

// ── MonthlySummary ────────────────────────────────────────────

#[test]
fn test_summary_totals_by_category() {
    let expenses = vec![
        make_expense("2025-04-03", "Food", dec!(12.50)),
        make_expense("2025-04-01", "Food", dec!(7.50)),
        make_expense("2025-04-02", "Transport", dec!(2.5)),
    ];
    let summary = MonthlySummary::from_expenses(DEFAULT_MONTH, &expenses);

    assert_eq!(summary.total, dec!(22.5));
    assert_eq!(summary.expense_count(), 3);
    assert_eq!(summary.by_category.len(), Category::all().len());

    let food = &summary.by_category[0];
    assert_eq!(food.name, "Food");
    assert_eq!(food.total, dec!(20));
    // Date ascending within a category
    assert_eq!(food.expenses[0].date, "2025-04-01");
    assert_eq!(food.expenses[1].date, "2025-04-03");

    let shopping = summary.by_category.iter().find(|c| c.name == "Shopping").unwrap();
    assert!(shopping.is_empty());
    assert_eq!(shopping.total, Decimal::ZERO);
}

#[test]
fn test_summary_keeps_unknown_categories() {
    let expenses = vec![
        make_expense("2025-04-03", "Gadgets", dec!(99)),
        make_expense("2025-04-04", "food", dec!(1)),
    ];
    let summary = MonthlySummary::from_expenses(DEFAULT_MONTH, &expenses);

    assert_eq!(summary.total, dec!(100));
    let last = summary.by_category.last().unwrap();
    assert_eq!(last.name, "Gadgets");
    assert_eq!(last.total, dec!(99));
    // Case-insensitive match folds into the fixed category
    assert_eq!(summary.by_category[0].total, dec!(1));
}

#[test]
fn test_summary_empty() {
    let summary = MonthlySummary::from_expenses(DEFAULT_MONTH, &[]);
    assert!(summary.is_empty());
    assert_eq!(summary.total, Decimal::ZERO);
    assert_eq!(summary.expense_count(), 0);
}
