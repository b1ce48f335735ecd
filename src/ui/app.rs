use chrono::Local;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::models::{Category, Expense, Month, MonthlySummary};
use crate::validate::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Summary,
    AddExpense,
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "Summary"),
            Self::AddExpense => write!(f, "Add Expense"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteExpense(Expense),
}

/// Work the run loop performs against the view model after input handling.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    AddExpense(Expense),
    DeleteExpense(Expense),
    NextMonth,
    PrevMonth,
    Export(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Detail,
    Category,
    Date,
    Amount,
}

impl FormField {
    pub(crate) fn all() -> &'static [FormField] {
        &[Self::Detail, Self::Category, Self::Date, Self::Amount]
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Detail => "Detail",
            Self::Category => "Category",
            Self::Date => "Date",
            Self::Amount => "Amount",
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Self::Detail => Self::Category,
            Self::Category => Self::Date,
            Self::Date => Self::Amount,
            Self::Amount => Self::Detail,
        }
    }

    pub(crate) fn prev(self) -> Self {
        match self {
            Self::Detail => Self::Amount,
            Self::Category => Self::Detail,
            Self::Date => Self::Category,
            Self::Amount => Self::Date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExpenseForm {
    pub(crate) detail: String,
    pub(crate) category: Category,
    pub(crate) date: String,
    pub(crate) amount: String,
    pub(crate) field: FormField,
}

impl ExpenseForm {
    pub(crate) fn new(date: String) -> Self {
        Self {
            detail: String::new(),
            category: Category::Food,
            date,
            amount: String::new(),
            field: FormField::Detail,
        }
    }

    /// The text buffer behind the focused field. The category field has none.
    pub(crate) fn focused_text(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Detail => Some(&mut self.detail),
            FormField::Date => Some(&mut self.date),
            FormField::Amount => Some(&mut self.amount),
            FormField::Category => None,
        }
    }

    pub(crate) fn to_expense(&self) -> Expense {
        Expense::from_input(
            &self.date,
            self.category.as_str(),
            &self.amount,
            &self.detail,
        )
    }
}

/// One visible line of the category list on the summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SummaryRow {
    Category(usize),
    Expense(usize, usize),
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    // Summary
    pub(crate) month: Month,
    pub(crate) summary: MonthlySummary,
    pub(crate) expanded: HashSet<String>,
    pub(crate) row_index: usize,
    pub(crate) row_scroll: usize,
    pub(crate) total_records: usize,

    // Add form
    pub(crate) form: ExpenseForm,
    pub(crate) error_popup: Option<ValidationError>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    pub(crate) effects: Vec<Effect>,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(month: Month) -> Self {
        Self {
            running: true,
            screen: Screen::Summary,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,

            month,
            summary: MonthlySummary::from_expenses(month, &[]),
            expanded: HashSet::new(),
            row_index: 0,
            row_scroll: 0,
            total_records: 0,

            form: ExpenseForm::new(default_form_date(month)),
            error_popup: None,

            pending_action: None,
            confirm_message: String::new(),

            effects: Vec::new(),

            visible_rows: 20,
        }
    }

    /// Replace the summary with a fresh snapshot of `month`.
    pub(crate) fn set_month_expenses(&mut self, month: Month, expenses: &[Expense]) {
        if month != self.month {
            self.row_index = 0;
            self.row_scroll = 0;
        }
        self.month = month;
        self.summary = MonthlySummary::from_expenses(month, expenses);
        let len = self.summary_rows().len();
        if self.row_index >= len {
            self.row_index = len.saturating_sub(1);
        }
        if self.row_scroll > self.row_index {
            self.row_scroll = self.row_index;
        }
    }

    pub(crate) fn summary_rows(&self) -> Vec<SummaryRow> {
        let mut rows = Vec::new();
        for (ci, cat) in self.summary.by_category.iter().enumerate() {
            rows.push(SummaryRow::Category(ci));
            if self.expanded.contains(&cat.name) {
                rows.extend((0..cat.expenses.len()).map(|ei| SummaryRow::Expense(ci, ei)));
            }
        }
        rows
    }

    pub(crate) fn selected_row(&self) -> Option<SummaryRow> {
        self.summary_rows().get(self.row_index).copied()
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        match self.selected_row()? {
            SummaryRow::Expense(ci, ei) => self.summary.by_category.get(ci)?.expenses.get(ei),
            SummaryRow::Category(_) => None,
        }
    }

    /// Expand or collapse the category under the cursor. On an expense row
    /// this collapses the owning category and moves the cursor onto it.
    pub(crate) fn toggle_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let ci = match row {
            SummaryRow::Category(ci) | SummaryRow::Expense(ci, _) => ci,
        };
        let Some(name) = self.summary.by_category.get(ci).map(|c| c.name.clone()) else {
            return;
        };
        if !self.expanded.remove(&name) {
            self.expanded.insert(name);
        }
        if let Some(pos) = self
            .summary_rows()
            .iter()
            .position(|r| *r == SummaryRow::Category(ci))
        {
            self.row_index = pos;
            if self.row_scroll > pos {
                self.row_scroll = pos;
            }
        }
    }

    pub(crate) fn request_delete_selected(&mut self) {
        let Some(expense) = self.selected_expense().cloned() else {
            self.set_status("Select an expense to delete (Enter expands a category)");
            return;
        };
        self.confirm_message = format!("Delete '{}' ({})?", expense.detail, expense.date);
        self.pending_action = Some(PendingAction::DeleteExpense(expense));
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn confirm_pending(&mut self) {
        if let Some(action) = self.pending_action.take() {
            match action {
                PendingAction::DeleteExpense(expense) => {
                    self.effects.push(Effect::DeleteExpense(expense));
                }
            }
        }
        self.confirm_message.clear();
        self.input_mode = InputMode::Normal;
    }

    pub(crate) fn cancel_pending(&mut self) {
        self.pending_action = None;
        self.confirm_message.clear();
        self.input_mode = InputMode::Normal;
        self.set_status("Cancelled");
    }

    pub(crate) fn open_add_form(&mut self) {
        self.form = ExpenseForm::new(default_form_date(self.month));
        self.error_popup = None;
        self.screen = Screen::AddExpense;
        self.input_mode = InputMode::Editing;
    }

    pub(crate) fn close_add_form(&mut self) {
        self.error_popup = None;
        self.screen = Screen::Summary;
        self.input_mode = InputMode::Normal;
    }

    /// Validate the form. The first failing check opens the error popup;
    /// otherwise an add is queued for the run loop.
    pub(crate) fn submit_form(&mut self) {
        let expense = self.form.to_expense();
        match validate::validate(&expense) {
            Ok(()) => {
                self.error_popup = None;
                self.effects.push(Effect::AddExpense(expense));
            }
            Err(e) => {
                tracing::debug!(error = %e, "expense form rejected");
                self.error_popup = Some(e);
            }
        }
    }

    pub(crate) fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

/// Today when it falls in `month`, otherwise the first of `month`.
fn default_form_date(month: Month) -> String {
    let today = Local::now().format("%Y-%m-%d").to_string();
    if today.starts_with(&format!("{}-", month.prefix())) {
        today
    } else {
        format!("{}-01", month.prefix())
    }
}
