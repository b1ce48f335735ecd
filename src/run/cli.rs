use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

use super::shellexpand;
use crate::models::{Category, Expense, Month, MonthlySummary};
use crate::state::ExpenseViewModel;
use crate::ui::util::{format_amount, percent_of, truncate};
use crate::validate::{self, ValidationError};

pub(crate) async fn as_cli(args: &[String], vm: &mut ExpenseViewModel) -> Result<()> {
    match args[1].as_str() {
        "summary" | "s" => cli_summary(&args[2..], vm).await,
        "list" | "ls" => cli_list(&args[2..], vm).await,
        "add" => cli_add(&args[2..], vm).await,
        "delete" | "rm" => cli_delete(&args[2..], vm).await,
        "export" => cli_export(&args[2..], vm).await,
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

/// Answer `help` and `version` without touching the store. Returns whether
/// the command was one of them.
pub(crate) fn as_info(args: &[String]) -> bool {
    match args.get(1).map(String::as_str) {
        Some("--help" | "-h" | "help") => print_usage(),
        Some("--version" | "-V" | "version") => {
            println!("expensetrack {}", env!("CARGO_PKG_VERSION"));
        }
        _ => return false,
    }
    true
}

fn print_usage() {
    println!("ExpenseTrack: local personal expense tracker");
    println!();
    println!("Usage: expensetrack [command]");
    println!();
    println!("Commands:");
    println!("  (none)                               Launch interactive TUI");
    println!("  summary [YYYY-MM]                    Print spend per category for a month");
    println!("  list [YYYY-MM]                       List a month's expenses");
    println!("  add <YYYY-MM-DD> <category> <amount> <detail...>");
    println!("                                       Record an expense");
    println!("  delete <id>                          Delete an expense by id");
    println!("  export [path]                        Export a month to CSV");
    println!("    --month <YYYY-MM>                  Month to export (default: current)");
    println!("  --help, -h                           Show this help");
    println!("  --version, -V                        Show version");
    println!();
    let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
    println!("Categories: {}", names.join(", "));
}

/// Month from the first positional argument, or the session's month cursor.
fn month_arg(args: &[String], vm: &ExpenseViewModel) -> Result<Month> {
    match args.first().filter(|a| !a.starts_with('-')) {
        Some(raw) => raw
            .parse::<Month>()
            .with_context(|| format!("Invalid month '{raw}', expected YYYY-MM")),
        None => Ok(vm.current_month()),
    }
}

async fn month_expenses(vm: &ExpenseViewModel, month: Month) -> Result<Vec<Expense>> {
    vm.repository()
        .expenses_in_month(&month.prefix())
        .next_snapshot()
        .await
}

async fn cli_summary(args: &[String], vm: &mut ExpenseViewModel) -> Result<()> {
    let month = month_arg(args, vm)?;
    let expenses = month_expenses(vm, month).await?;
    let summary = MonthlySummary::from_expenses(month, &expenses);

    println!("ExpenseTrack: {}", month.display_name());
    println!("{}", "─".repeat(44));
    println!("  Total spent: {}", format_amount(summary.total));
    println!("  Expenses:    {}", summary.expense_count());

    if !summary.is_empty() {
        println!();
        println!("Spending by Category:");
        for cat in summary.by_category.iter().filter(|c| !c.is_empty()) {
            println!(
                "  {:<16} {:>12} {:>4}%",
                cat.name,
                format_amount(cat.total),
                percent_of(cat.total, summary.total)
            );
        }
    }
    Ok(())
}

async fn cli_list(args: &[String], vm: &mut ExpenseViewModel) -> Result<()> {
    let month = month_arg(args, vm)?;
    let expenses = month_expenses(vm, month).await?;
    if expenses.is_empty() {
        println!("No expenses for {month}");
        return Ok(());
    }

    println!(
        "{:<5} {:<11} {:<14} {:>12}  Detail",
        "ID", "Date", "Category", "Amount"
    );
    println!("{}", "─".repeat(64));
    for e in &expenses {
        println!(
            "{:<5} {:<11} {:<14} {:>12}  {}",
            e.id.unwrap_or(0),
            e.date,
            truncate(&e.category, 14),
            format_amount(e.spend),
            e.detail,
        );
    }
    Ok(())
}

/// Build and check an expense from `<date> <category> <amount> <detail...>`.
/// Field checks come first, in their usual order; category membership last.
fn draft_from_args(args: &[String]) -> Result<Expense> {
    if args.len() < 4 {
        bail!("Usage: expensetrack add <YYYY-MM-DD> <category> <amount> <detail...>");
    }

    let expense = Expense::from_input(&args[0], &args[1], &args[2], &args[3..].join(" "));
    if let Err(e) = validate::validate(&expense) {
        if e == ValidationError::Spend && Decimal::from_str(args[2].trim()).is_err() {
            bail!("Invalid amount '{}': {e}", args[2]);
        }
        return Err(e).with_context(|| format!("Cannot add '{}'", expense.detail));
    }
    if expense.category_kind().is_none() {
        let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        bail!(
            "Unknown category '{}'. Use one of: {}",
            expense.category,
            names.join(", ")
        );
    }
    Ok(expense)
}

async fn cli_add(args: &[String], vm: &mut ExpenseViewModel) -> Result<()> {
    let expense = draft_from_args(args)?;
    vm.stage_expense(expense);
    let added = vm.commit_add().await?;
    let draft = vm.ui_state().current_draft;
    if added {
        println!(
            "Added {} {} {} ({})",
            draft.date,
            draft.category,
            format_amount(draft.spend),
            draft.detail
        );
    } else {
        println!("Already recorded: {} ({})", draft.detail, draft.date);
    }
    Ok(())
}

async fn cli_delete(args: &[String], vm: &mut ExpenseViewModel) -> Result<()> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: expensetrack delete <id>"))?;
    let id = raw
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{raw}'"))?;

    let found = vm
        .ui_state()
        .all_expenses
        .into_iter()
        .find(|e| e.id == Some(id));
    let Some(expense) = found else {
        bail!("No expense with id {id}");
    };

    vm.stage_expense(expense.clone());
    if vm.commit_delete().await? {
        println!("Deleted {id}: {} ({})", expense.detail, expense.date);
    } else {
        println!("Expense {id} changed before it could be deleted");
    }
    Ok(())
}

async fn cli_export(args: &[String], vm: &mut ExpenseViewModel) -> Result<()> {
    let month = match args.windows(2).find(|w| w[0] == "--month") {
        Some(w) => w[1]
            .parse::<Month>()
            .with_context(|| format!("Invalid month '{}', expected YYYY-MM", w[1]))?,
        None => vm.current_month(),
    };

    // Output path is the first non-flag argument
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/expensetrack-export-{month}.csv")
        });

    let count = vm
        .repository()
        .store()
        .export_month_csv(PathBuf::from(&output_path), &month.prefix())
        .await?;
    if count == 0 {
        println!("No expenses for {month}");
    } else {
        println!("Exported {count} expenses to {output_path}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use rust_decimal_macros::dec;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn error_of(raw: &[&str]) -> String {
        format!("{:#}", draft_from_args(&args(raw)).unwrap_err())
    }

    #[test]
    fn test_info_commands_need_no_store() {
        assert!(as_info(&args(&["expensetrack", "--version"])));
        assert!(as_info(&args(&["expensetrack", "help"])));
        assert!(!as_info(&args(&["expensetrack", "summary"])));
        assert!(!as_info(&args(&["expensetrack"])));
    }

    #[test]
    fn test_draft_from_args_builds_expense() {
        let expense =
            draft_from_args(&args(&["2025-04-15", "food", "12.40", "Lunch", "out"])).unwrap();
        assert_eq!(
            expense,
            Expense::new(
                "2025-04-15".into(),
                "Lunch out".into(),
                "Food".into(),
                dec!(12.40),
            )
        );
    }

    #[test]
    fn test_draft_from_args_reports_blank_detail_first() {
        let detail = ValidationError::Detail.to_string();
        assert!(error_of(&["2025-04-01", "Gadgets", "5", "  "]).contains(&detail));
        assert!(error_of(&["2025-04-01", "Food", "abc", "  "]).contains(&detail));
        assert!(error_of(&["2025-04-31", "Gadgets", "abc", " "]).contains(&detail));
    }

    #[test]
    fn test_draft_from_args_checks_amount_before_date_and_category() {
        let err = error_of(&["2025-04-31", "Gadgets", "abc", "Lunch"]);
        assert!(err.contains("Invalid amount 'abc'"));
        assert!(err.contains(&ValidationError::Spend.to_string()));
        assert!(error_of(&["2025-04-31", "Gadgets", "5", "Lunch"])
            .contains(&ValidationError::Date.to_string()));
    }

    #[test]
    fn test_draft_from_args_rejects_unknown_category_last() {
        let err = error_of(&["2025-04-15", "Gadgets", "5", "Cable"]);
        assert!(err.contains("Unknown category 'Gadgets'"));
    }

    #[test]
    fn test_draft_from_args_needs_four_arguments() {
        assert!(error_of(&["2025-04-15", "Food", "5"]).starts_with("Usage:"));
    }
}
