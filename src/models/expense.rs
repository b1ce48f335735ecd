use rust_decimal::Decimal;
use std::str::FromStr;

use super::Category;

/// A single recorded expense. `id` is `None` until the store assigns one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expense {
    pub id: Option<i64>,
    pub date: String,
    pub detail: String,
    pub category: String,
    pub spend: Decimal,
}

impl Expense {
    pub fn new(date: String, detail: String, category: String, spend: Decimal) -> Self {
        Self {
            id: None,
            date,
            detail,
            category,
            spend,
        }
    }

    /// A draft from raw user input. A known category is stored in its
    /// canonical spelling, anything else as typed; an amount that does not
    /// parse becomes zero so the spend check reports it.
    pub fn from_input(date: &str, category: &str, amount: &str, detail: &str) -> Self {
        let category = match Category::parse(category) {
            Some(c) => c.as_str().to_string(),
            None => category.trim().to_string(),
        };
        Self::new(
            date.trim().to_string(),
            detail.trim().to_string(),
            category,
            Decimal::from_str(amount.trim()).unwrap_or(Decimal::ZERO),
        )
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn category_kind(&self) -> Option<Category> {
        Category::parse(&self.category)
    }

    /// Normalized text form of `spend` as stored in the database, so that
    /// `2.5` and `2.50` compare equal in SQL as they do in Rust.
    pub fn spend_key(&self) -> String {
        self.spend.normalize().to_string()
    }
}
