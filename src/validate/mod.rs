//! Field checks run on a draft expense before it is committed.
//!
//! Each predicate is independent. [`validate`] applies them in the order the
//! add form reports errors (detail, category, spend, date) and stops at the
//! first failure.
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::Expense;

static DATE_SHAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("Please enter a detail for the expense.")]
    Detail,
    #[error("Please choose a category for the expense.")]
    Category,
    #[error("The amount spent must be greater than zero.")]
    Spend,
    #[error("The date must be a real calendar date in the format YYYY-MM-DD.")]
    Date,
}

impl ValidationError {
    /// Short heading for the error popup.
    pub(crate) fn title(&self) -> &'static str {
        match self {
            Self::Detail => "Missing detail",
            Self::Category => "Missing category",
            Self::Spend => "Invalid amount",
            Self::Date => "Invalid date",
        }
    }
}

pub(crate) fn is_detail_valid(expense: &Expense) -> bool {
    !expense.detail.trim().is_empty()
}

pub(crate) fn is_category_valid(expense: &Expense) -> bool {
    !expense.category.trim().is_empty()
}

pub(crate) fn is_spend_valid(expense: &Expense) -> bool {
    expense.spend > Decimal::ZERO
}

pub(crate) fn is_date_valid(expense: &Expense) -> bool {
    is_date_str_valid(&expense.date)
}

/// Strict `YYYY-MM-DD`: exactly four, two and two digits, naming a day that
/// exists in the calendar.
pub(crate) fn is_date_str_valid(date: &str) -> bool {
    let shaped = DATE_SHAPE.as_ref().is_some_and(|re| re.is_match(date));
    shaped && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

pub(crate) fn validate(expense: &Expense) -> Result<(), ValidationError> {
    if !is_detail_valid(expense) {
        return Err(ValidationError::Detail);
    }
    if !is_category_valid(expense) {
        return Err(ValidationError::Category);
    }
    if !is_spend_valid(expense) {
        return Err(ValidationError::Spend);
    }
    if !is_date_valid(expense) {
        return Err(ValidationError::Date);
    }
    Ok(())
}
