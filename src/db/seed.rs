use rust_decimal::Decimal;

use crate::models::Expense;

/// Demo data inserted on first launch, when the store is empty.
/// Amounts are in cents to keep the table literal-only.
const DEMO_EXPENSES: &[(&str, &str, &str, i64)] = &[
    ("2025-03-02", "Groceries", "Food", 4_270),
    ("2025-03-05", "Monthly bus pass", "Transport", 3_000),
    ("2025-03-14", "Cinema", "Entertainment", 1_200),
    ("2025-03-28", "Electricity bill", "Bills", 6_480),
    ("2025-04-01", "Bus", "Transport", 250),
    ("2025-04-03", "Lunch", "Food", 1_150),
    ("2025-04-06", "Running shoes", "Shopping", 8_999),
    ("2025-04-09", "Pharmacy", "Health", 1_425),
    ("2025-04-12", "Concert tickets", "Entertainment", 4_500),
    ("2025-04-18", "Groceries", "Food", 5_630),
    ("2025-04-22", "Phone bill", "Bills", 2_500),
    ("2025-04-27", "Birthday gift", "Other", 3_000),
    ("2025-05-02", "Train ticket", "Transport", 1_890),
    ("2025-05-10", "Dinner out", "Food", 3_640),
];

pub(crate) fn demo_expenses() -> Vec<Expense> {
    DEMO_EXPENSES
        .iter()
        .map(|&(date, detail, category, cents)| {
            Expense::new(
                date.to_string(),
                detail.to_string(),
                category.to_string(),
                Decimal::new(cents, 2),
            )
        })
        .collect()
}
