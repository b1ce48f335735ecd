use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::models::Category;
use crate::ui::app::{App, FormField};
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let width = 60.min(area.width);
    let form_area = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y,
        width,
        area.height,
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(form_area);

    for (i, field) in FormField::all().iter().enumerate() {
        render_field(f, rows[i], app, *field);
    }

    let hint = Paragraph::new(Line::from(Span::styled(
        "Tab/↓ next field · ←/→ change category · Enter save · Esc cancel",
        theme::dim_style(),
    )))
    .centered();
    f.render_widget(hint, rows[4]);

    if let Some(err) = app.error_popup {
        render_error_popup(f, area, err.title(), &err.to_string());
    }
}

fn render_field(f: &mut Frame, area: Rect, app: &App, field: FormField) {
    let focused = app.form.field == field;
    let border = if focused { theme::ACCENT } else { theme::OVERLAY };

    let content = match field {
        FormField::Detail => Line::from(app.form.detail.as_str()),
        FormField::Date => Line::from(app.form.date.as_str()),
        FormField::Amount => Line::from(vec![
            Span::styled("€ ", theme::dim_style()),
            Span::raw(app.form.amount.as_str()),
        ]),
        FormField::Category => category_picker(app.form.category),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", field.label()),
            if focused {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme::title_style()
            },
        ));
    f.render_widget(Paragraph::new(content).block(block), area);

    if focused {
        let typed = match field {
            FormField::Detail => app.form.detail.chars().count(),
            FormField::Date => app.form.date.chars().count(),
            FormField::Amount => app.form.amount.chars().count() + 2,
            FormField::Category => return,
        };
        let x = (area.x + 1 + typed as u16).min(area.right().saturating_sub(2));
        f.set_cursor_position((x, area.y + 1));
    }
}

fn category_picker(selected: Category) -> Line<'static> {
    let mut spans = vec![Span::styled("◀ ", theme::dim_style())];
    for (i, cat) in Category::all().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        if *cat == selected {
            spans.push(Span::styled(cat.as_str(), theme::selected_style()));
        } else {
            spans.push(Span::styled(cat.as_str(), theme::dim_style()));
        }
    }
    spans.push(Span::styled(" ▶", theme::dim_style()));
    Line::from(spans)
}

fn render_error_popup(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height);
    let x = area.x + area.width.saturating_sub(popup_width) / 2;
    let y = area.y + area.height.saturating_sub(popup_height) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);
    let popup = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme::normal_style())),
        Line::from(""),
        Line::from(Span::styled(" Press any key to close ", theme::dim_style())),
    ])
    .centered()
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::RED))
            .title(Span::styled(
                format!(" {title} "),
                Style::default()
                    .fg(theme::RED)
                    .add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(popup, popup_area);
}
