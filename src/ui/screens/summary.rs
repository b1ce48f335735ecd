use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::ui::app::{App, SummaryRow};
use crate::ui::theme;
use crate::ui::util::{format_amount, percent_of, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Month + total
            Constraint::Min(8),    // Chart and category list
        ])
        .split(area);

    render_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_category_chart(f, body[0], app);
    render_category_list(f, body[1], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(" Month ", theme::title_style()));

    let count = app.summary.expense_count();
    let text = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("◀ ", theme::dim_style()),
            Span::styled(
                app.month.display_name(),
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ▶", theme::dim_style()),
        ]),
        Line::from(Span::styled(
            format!("Total spent {}", format_amount(app.summary.total)),
            theme::spend_style().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{count} expense{}",
                if count == 1 { "" } else { "s" }
            ),
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_category_chart(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(" Spending by Category ", theme::title_style()));

    if app.summary.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No expenses for this month",
                theme::dim_style(),
            )),
            Line::from(Span::styled("Press a to add one", theme::dim_style())),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = app
        .summary
        .by_category
        .iter()
        .enumerate()
        .filter(|(_, cat)| cat.total > Decimal::ZERO)
        .map(|(i, cat)| {
            // Cents keep small amounts visible next to large ones.
            let cents = (cat.total * Decimal::ONE_HUNDRED).to_u64().unwrap_or(0);
            let color = theme::category_color(i);
            Bar::default()
                .value(cents)
                .text_value(format!(
                    "{} ({}%)",
                    format_amount(cat.total),
                    percent_of(cat.total, app.summary.total)
                ))
                .label(Line::from(truncate(&cat.name, 13)))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(theme::HEADER_BG).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(1);

    f.render_widget(chart, area);
}

fn render_category_list(f: &mut Frame, area: Rect, app: &App) {
    let rows_data = app.summary_rows();
    let page = area.height.saturating_sub(3) as usize;

    let rows: Vec<Row> = rows_data
        .iter()
        .enumerate()
        .skip(app.row_scroll)
        .take(page)
        .filter_map(|(i, row)| {
            let is_cursor = i == app.row_index;
            let cells = match *row {
                SummaryRow::Category(ci) => {
                    let cat = app.summary.by_category.get(ci)?;
                    let marker = if cat.is_empty() {
                        "  "
                    } else if app.expanded.contains(&cat.name) {
                        "▾ "
                    } else {
                        "▸ "
                    };
                    let style = if cat.is_empty() {
                        theme::dim_style()
                    } else {
                        Style::default()
                            .fg(theme::category_color(ci))
                            .add_modifier(Modifier::BOLD)
                    };
                    vec![
                        Cell::from(Span::styled(format!("{marker}{}", cat.name), style)),
                        Cell::from(format!("{} items", cat.expenses.len())),
                        Cell::from(Span::styled(
                            format_amount(cat.total),
                            theme::spend_style(),
                        )),
                    ]
                }
                SummaryRow::Expense(ci, ei) => {
                    let e = app.summary.by_category.get(ci)?.expenses.get(ei)?;
                    vec![
                        Cell::from(format!("    {}", truncate(&e.detail, 28))),
                        Cell::from(Span::styled(e.date.clone(), theme::dim_style())),
                        Cell::from(format_amount(e.spend)),
                    ]
                }
            };
            let style = if is_cursor {
                theme::selected_style()
            } else {
                theme::normal_style()
            };
            Some(Row::new(cells).style(style))
        })
        .collect();

    let header = Row::new(
        ["Category", "Entries", "Amount"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let widths = [
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Categories ", theme::title_style())),
    );

    f.render_widget(table, area);
}
