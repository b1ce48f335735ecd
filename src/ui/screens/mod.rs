pub(crate) mod add_expense;
pub(crate) mod summary;
