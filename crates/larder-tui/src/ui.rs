// UI rendering logic
use crate::app::{App, InputMode, ItemForm, FORM_FIELDS};
use chrono::Local;
use larder_core::classifier::{classify_raw, Freshness};
use larder_core::theme::{self, ThemeColors};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search / filter / sort bar
            Constraint::Min(5),    // Item table
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    frame.render_widget(
        Block::default().style(Style::default().bg(color(app.theme.colors.background))),
        frame.area(),
    );

    render_filter_bar(frame, app, chunks[0]);
    render_item_table(frame, app, chunks[1]);
    render_status_line(frame, app, chunks[2]);
    render_key_hints(frame, app, chunks[3]);

    // Popups draw over the table, most recent concern on top.
    if app.stats.is_some() {
        render_stats_popup(frame, app, frame.area());
    }
    if app.expiry_report.is_some() {
        render_expiry_popup(frame, app, frame.area());
    }
    if app.input_mode == InputMode::Form {
        render_form_popup(frame, app, frame.area());
    }
    if app.input_mode == InputMode::ConfirmDelete {
        render_confirm_delete_popup(frame, app, frame.area());
    }
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let searching = app.input_mode == InputMode::Searching;

    let border_color = if searching {
        colors.border_focused
    } else {
        colors.border
    };

    let mut spans = vec![
        Span::styled("Search: ", Style::default().fg(color(colors.muted))),
        Span::styled(
            if app.search_input.is_empty() && !searching {
                "(press / to search)".to_string()
            } else {
                app.search_input.clone()
            },
            Style::default().fg(color(colors.foreground)),
        ),
    ];
    if searching {
        spans.push(Span::styled(
            "█",
            Style::default().fg(color(colors.border_focused)),
        ));
    }
    spans.extend([
        Span::styled("   Category: ", Style::default().fg(color(colors.muted))),
        Span::styled(
            app.category_filter.to_string(),
            Style::default().fg(color(colors.title)),
        ),
        Span::styled("   Sort: ", Style::default().fg(color(colors.muted))),
        Span::styled(
            app.sort_key.to_string(),
            Style::default().fg(color(colors.title)),
        ),
    ]);

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color(border_color)))
            .title(Span::styled(
                " Larder ",
                Style::default()
                    .fg(color(colors.title))
                    .add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(bar, area);
}

fn render_item_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let colors = app.theme.colors.clone();
    let today = Local::now().date_naive();

    let header = Row::new(["ID", "Name", "Category", "Expiry Date", "Status", "Notes"])
        .style(
            Style::default()
                .fg(color(colors.title))
                .add_modifier(Modifier::BOLD),
        );

    let rows: Vec<Row> = app
        .items
        .iter()
        .map(|item| {
            let tag = classify_raw(&item.expiry_date, today);
            let row_color = freshness_color(&colors, tag);
            Row::new(vec![
                Cell::from(item.id.to_string()),
                Cell::from(item.name.clone()),
                Cell::from(item.category.label()),
                Cell::from(item.expiry_date.clone()),
                Cell::from(tag.label()),
                Cell::from(item.notes.clone()),
            ])
            .style(Style::default().fg(color(row_color)))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(16),
            Constraint::Length(11),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Min(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color(colors.border)))
            .title(format!(" {} item(s) ", app.items.len())),
    )
    .row_highlight_style(
        Style::default()
            .bg(color(colors.selected_bg))
            .add_modifier(Modifier::BOLD),
    );

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let (text, fg) = if let Some(error) = &app.error_message {
        (error.clone(), colors.error)
    } else if let Some(status) = &app.status_message {
        (status.clone(), colors.status)
    } else {
        (String::new(), colors.muted)
    };

    let line = Paragraph::new(text).style(Style::default().fg(color(fg)));
    frame.render_widget(line, area);
}

fn render_key_hints(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.input_mode {
        InputMode::Searching => "type to search | Enter/Esc done",
        InputMode::Form => "Tab/↑↓ field | ←→ category | Enter save | Esc cancel",
        InputMode::ConfirmDelete => "y confirm | any other key cancels",
        InputMode::Normal => {
            "a add | e edit | d delete | / search | c category | s sort | \
             x export | r reminders | i stats | t theme | q quit"
        }
    };
    let line = Paragraph::new(hints).style(Style::default().fg(color(app.theme.colors.muted)));
    frame.render_widget(line, area);
}

fn render_form_popup(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let popup = centered_rect(50, 40, area);
    frame.render_widget(Clear, popup);

    let title = if app.form.editing_id.is_some() {
        " Edit Food Item "
    } else {
        " Add Food Item "
    };

    let mut lines = Vec::new();
    for field in 0..FORM_FIELDS {
        let focused = app.form.cursor == field;
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            Style::default()
                .fg(color(colors.border_focused))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color(colors.muted))
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{}: ", ItemForm::field_label(field)), label_style),
            Span::styled(
                app.form.field_value(field),
                Style::default().fg(color(colors.foreground)),
            ),
        ]));
        lines.push(Line::from(""));
    }

    let form = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(color(colors.background)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color(colors.border_focused)))
                .title(title),
        );
    frame.render_widget(form, popup);
}

fn render_confirm_delete_popup(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let popup = centered_rect(40, 20, area);
    frame.render_widget(Clear, popup);

    let name = app
        .pending_delete
        .as_ref()
        .map(|item| item.name.as_str())
        .unwrap_or("");
    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(format!("Are you sure you want to delete '{name}'?")),
        Line::from(""),
        Line::from(Span::styled(
            "y to confirm, any other key to cancel",
            Style::default().fg(color(colors.muted)),
        )),
    ])
    .wrap(Wrap { trim: false })
    .style(Style::default().bg(color(colors.background)))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color(colors.error)))
            .title(" Confirm Deletion "),
    );
    frame.render_widget(body, popup);
}

fn render_stats_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(stats) = &app.stats else { return };
    let colors = &app.theme.colors;
    let popup = centered_rect(50, 60, area);
    frame.render_widget(Clear, popup);

    let mut lines = vec![
        Line::from(""),
        Line::from(format!("Total Items: {}", stats.total)),
        Line::from(Span::styled(
            format!("Expired Items: {}", stats.expired),
            Style::default().fg(color(colors.expired)),
        )),
        Line::from(Span::styled(
            format!("Items Expiring Soon: {}", stats.expiring_soon),
            Style::default().fg(color(colors.soon)),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Category Breakdown:",
            Style::default()
                .fg(color(colors.title))
                .add_modifier(Modifier::BOLD),
        )),
    ];
    for (category, count) in &stats.by_category {
        lines.push(Line::from(format!("  {category}: {count} items")));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Recent Activity:",
        Style::default()
            .fg(color(colors.title))
            .add_modifier(Modifier::BOLD),
    )));
    for (action, count) in &stats.top_actions {
        lines.push(Line::from(format!("  {action}: {count} times")));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc to close",
        Style::default().fg(color(colors.muted)),
    )));

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .style(
            Style::default()
                .bg(color(colors.background))
                .fg(color(colors.foreground)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color(colors.border_focused)))
                .title(" Food Inventory Statistics "),
        );
    frame.render_widget(body, popup);
}

fn render_expiry_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(report) = &app.expiry_report else {
        return;
    };
    let colors = &app.theme.colors;
    let popup = centered_rect(50, 50, area);
    frame.render_widget(Clear, popup);

    let mut lines = vec![Line::from(""), Line::from("Items expiring:"), Line::from("")];
    for item in &report.items {
        let style = if item.days_left < 0 {
            Style::default().fg(color(colors.expired))
        } else {
            Style::default().fg(color(colors.soon))
        };
        lines.push(Line::from(Span::styled(
            format!("  • {} - {}", item.name, item.expiry_date),
            style,
        )));
    }
    if !report.warnings.is_empty() {
        lines.push(Line::from(""));
        for warning in &report.warnings {
            lines.push(Line::from(Span::styled(
                format!("  warning: {warning}"),
                Style::default().fg(color(colors.error)),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc to close",
        Style::default().fg(color(colors.muted)),
    )));

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .style(
            Style::default()
                .bg(color(colors.background))
                .fg(color(colors.foreground)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color(colors.soon)))
                .title(" Expiry Alert "),
        );
    frame.render_widget(body, popup);
}

fn freshness_color(colors: &ThemeColors, tag: Freshness) -> theme::Color {
    match tag {
        Freshness::Expired => colors.expired,
        Freshness::Soon => colors.soon,
        Freshness::Fresh => colors.fresh,
    }
}

fn color(c: theme::Color) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Helper to build a centered rect using a percentage of the available area
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
