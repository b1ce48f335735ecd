use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::app::{App, Effect, Screen};
use crate::models::{Category, Expense};
use crate::validate;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit", cmd_quit, r);
    register_command!("quit", "Quit", cmd_quit, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "add",
        "Add expense (form, or :add 2025-04-15 Transport 2.50 Bus)",
        cmd_add,
        r
    );
    register_command!(
        "a",
        "Add expense (form, or :add 2025-04-15 Transport 2.50 Bus)",
        cmd_add,
        r
    );
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("n", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!("p", "Go to previous month", cmd_prev_month, r);
    register_command!("delete", "Delete selected expense", cmd_delete, r);
    register_command!(
        "export",
        "Export month to CSV (e.g. :export ~/april.csv)",
        cmd_export,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

pub(crate) fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_add(args: &str, app: &mut App) -> anyhow::Result<()> {
    if args.is_empty() {
        app.open_add_form();
        return Ok(());
    }

    // <date> <category> <amount> <detail...>
    let parts: Vec<&str> = args.splitn(4, ' ').collect();
    if parts.len() < 4 {
        app.set_status("Usage: :add <YYYY-MM-DD> <category> <amount> <detail>");
        return Ok(());
    }

    let expense = Expense::from_input(parts[0], parts[1], parts[2], parts[3]);
    if let Err(e) = validate::validate(&expense) {
        app.set_status(format!("{}: {e}", e.title()));
        return Ok(());
    }
    if expense.category_kind().is_none() {
        let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        app.set_status(format!(
            "Unknown category: {}. Use one of: {}",
            expense.category,
            names.join(", ")
        ));
        return Ok(());
    }
    app.effects.push(Effect::AddExpense(expense));
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App) -> anyhow::Result<()> {
    app.effects.push(Effect::NextMonth);
    Ok(())
}

fn cmd_prev_month(_args: &str, app: &mut App) -> anyhow::Result<()> {
    app.effects.push(Effect::PrevMonth);
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App) -> anyhow::Result<()> {
    if app.screen != Screen::Summary {
        app.set_status("Return to the summary and select an expense first");
        return Ok(());
    }
    app.request_delete_selected();
    Ok(())
}

fn cmd_export(args: &str, app: &mut App) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/expensetrack-export-{}.csv", app.month)
    } else {
        crate::run::shellexpand(args)
    };
    app.effects.push(Effect::Export(PathBuf::from(path)));
    Ok(())
}
