use rust_decimal::Decimal;

use super::{Category, Expense, Month};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub total: Decimal,
    pub expenses: Vec<Expense>,
}

impl CategoryTotal {
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}

/// Aggregation of one month of expenses for the summary screen.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub month: Month,
    pub total: Decimal,
    /// Every fixed category in enumeration order, followed by any
    /// unrecognised category names found in the data.
    pub by_category: Vec<CategoryTotal>,
}

impl MonthlySummary {
    pub fn from_expenses(month: Month, expenses: &[Expense]) -> Self {
        let mut by_category: Vec<CategoryTotal> = Category::all()
            .iter()
            .map(|c| CategoryTotal {
                name: c.as_str().to_string(),
                total: Decimal::ZERO,
                expenses: Vec::new(),
            })
            .collect();

        let mut sorted: Vec<&Expense> = expenses.iter().collect();
        sorted.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

        for expense in sorted {
            let name = expense
                .category_kind()
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| expense.category.clone());
            let slot = match by_category.iter().position(|c| c.name == name) {
                Some(idx) => idx,
                None => {
                    by_category.push(CategoryTotal {
                        name,
                        total: Decimal::ZERO,
                        expenses: Vec::new(),
                    });
                    by_category.len() - 1
                }
            };
            by_category[slot].total += expense.spend;
            by_category[slot].expenses.push(expense.clone());
        }

        let total = by_category.iter().map(|c| c.total).sum();
        Self {
            month,
            total,
            by_category,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.iter().all(CategoryTotal::is_empty)
    }

    pub fn expense_count(&self) -> usize {
        self.by_category.iter().map(|c| c.expenses.len()).sum()
    }
}
