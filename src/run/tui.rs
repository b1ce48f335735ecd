use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::db::LiveQuery;
use crate::state::ExpenseViewModel;
use crate::ui::app::{App, Effect, FormField, InputMode, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

/// How often the input task checks whether the UI is still listening.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) async fn as_tui(vm: &mut ExpenseViewModel) -> Result<()> {
    let mut app = App::new(vm.current_month());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, vm).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!("tui exited with error: {e:#}");
        eprintln!("Error: {e:?}");
    }

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    vm: &mut ExpenseViewModel,
) -> Result<()> {
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let reader = tokio::task::spawn_blocking(move || read_terminal_events(event_tx));

    let mut monthly = vm.monthly_view();
    let mut all_expenses = vm.watch_all_expenses();
    app.total_records = all_expenses.borrow_and_update().len();

    while app.running {
        if monthly.has_pending() {
            match monthly.next_snapshot().await {
                Ok(expenses) => app.set_month_expenses(vm.current_month(), &expenses),
                Err(e) => {
                    tracing::warn!(filter = ?monthly.filter(), "month query failed: {e:#}");
                    app.set_status(format!("Error: {e:#}"));
                    monthly = monthly.restart();
                }
            }
        }

        terminal.draw(|f| {
            // title + status + command bars, block borders, table header, month header
            let content_height = f.area().height.saturating_sub(11) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        // Sleep until a key arrives or the store has something new.
        tokio::select! {
            event = events.recv() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_key(key, app)?;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Ok(()) = all_expenses.changed() => {
                app.total_records = all_expenses.borrow_and_update().len();
            }
            () = monthly.wait_pending() => {}
        }

        for effect in app.take_effects() {
            apply_effect(effect, app, vm, &mut monthly).await;
        }
    }

    drop(events);
    reader.await?;
    Ok(())
}

/// Forward terminal events to the UI until its receiver is dropped.
fn read_terminal_events(tx: mpsc::UnboundedSender<io::Result<Event>>) {
    while !tx.is_closed() {
        match event::poll(POLL_INTERVAL) {
            Ok(false) => {}
            Ok(true) => {
                if tx.send(event::read()).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                break;
            }
        }
    }
}

async fn apply_effect(
    effect: Effect,
    app: &mut App,
    vm: &mut ExpenseViewModel,
    monthly: &mut LiveQuery,
) {
    match effect {
        Effect::AddExpense(expense) => {
            vm.stage_expense(expense);
            let draft = vm.current_draft();
            let label = format!("{} ({})", draft.detail, draft.date);
            match vm.commit_add().await {
                Ok(true) => {
                    app.close_add_form();
                    app.set_status(format!("Added: {label}"));
                }
                Ok(false) => {
                    app.close_add_form();
                    app.set_status(format!("Already recorded: {label}"));
                }
                Err(e) => app.set_status(format!("Error: {e:#}")),
            }
        }
        Effect::DeleteExpense(expense) => {
            let label = expense.detail.clone();
            vm.stage_expense(expense);
            match vm.commit_delete().await {
                Ok(true) => app.set_status(format!("Deleted: {label}")),
                Ok(false) => app.set_status(format!("Nothing deleted: {label} has changed")),
                Err(e) => app.set_status(format!("Error: {e:#}")),
            }
        }
        Effect::NextMonth => {
            vm.advance_month();
            *monthly = vm.monthly_view();
            app.set_status(format!("Month: {}", vm.current_month().display_name()));
        }
        Effect::PrevMonth => {
            vm.retreat_month();
            *monthly = vm.monthly_view();
            app.set_status(format!("Month: {}", vm.current_month().display_name()));
        }
        Effect::Export(path) => {
            let month = vm.current_month().to_string();
            match vm
                .repository()
                .store()
                .export_month_csv(path.clone(), &month)
                .await
            {
                Ok(0) => app.set_status(format!("No expenses for {month}")),
                Ok(n) => app.set_status(format!("Exported {n} expenses to {}", path.display())),
                Err(e) => {
                    tracing::error!("export failed: {e:#}");
                    app.set_status(format!("Error: {e:#}"));
                }
            }
        }
    }
}

// ── Input handlers ───────────────────────────────────────────

fn handle_key(key: event::KeyEvent, app: &mut App) -> Result<()> {
    if app.show_help {
        app.show_help = false;
        return Ok(());
    }
    if app.error_popup.is_some() {
        app.error_popup = None;
        return Ok(());
    }
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.running = false;
        return Ok(());
    }
    match app.input_mode {
        InputMode::Normal => handle_normal_input(key, app),
        InputMode::Command => handle_command_input(key, app),
        InputMode::Editing => {
            handle_editing_input(key, app);
            Ok(())
        }
        InputMode::Confirm => {
            handle_confirm_input(key, app);
            Ok(())
        }
    }
}

fn handle_normal_input(key: event::KeyEvent, app: &mut App) -> Result<()> {
    let len = app.summary_rows().len();
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            scroll_down(&mut app.row_index, &mut app.row_scroll, len, app.visible_rows);
        }
        KeyCode::Char('k') | KeyCode::Up => scroll_up(&mut app.row_index, &mut app.row_scroll),
        KeyCode::Char('g') => scroll_to_top(&mut app.row_index, &mut app.row_scroll),
        KeyCode::Char('G') => {
            scroll_to_bottom(&mut app.row_index, &mut app.row_scroll, len, app.visible_rows);
        }
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('D') | KeyCode::Delete => app.request_delete_selected(),
        KeyCode::Char('H') | KeyCode::Left => commands::handle_command("prev-month", app)?,
        KeyCode::Char('L') | KeyCode::Right => commands::handle_command("next-month", app)?,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Esc => app.set_status(""),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App) {
    if app.screen != Screen::AddExpense {
        app.input_mode = InputMode::Normal;
        return;
    }
    match key.code {
        KeyCode::Esc => {
            app.close_add_form();
            app.set_status("Add cancelled");
        }
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab | KeyCode::Down => app.form.field = app.form.field.next(),
        KeyCode::BackTab | KeyCode::Up => app.form.field = app.form.field.prev(),
        KeyCode::Left if app.form.field == FormField::Category => {
            app.form.category = app.form.category.cycle(-1);
        }
        KeyCode::Right | KeyCode::Char(' ') if app.form.field == FormField::Category => {
            app.form.category = app.form.category.cycle(1);
        }
        KeyCode::Backspace => {
            if let Some(text) = app.form.focused_text() {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(text) = app.form.focused_text() {
                text.push(c);
            }
        }
        _ => {}
    }
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_pending(),
        _ => app.cancel_pending(),
    }
}
