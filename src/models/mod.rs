mod category;
mod expense;
mod month;
mod summary;

pub use category::Category;
pub use expense::Expense;
pub use month::{Month, DEFAULT_MONTH};
pub use summary::MonthlySummary;

#[cfg(test)]
mod tests;
