//! Terminal rendering

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Modal, View};
use crate::engine::{TimerStatus, format_time};
use crate::stats::Summary;
use crate::store::KeyValueStore;

const ACCENT: Color = Color::Rgb(74, 144, 226);
const BORDER: Color = Color::Rgb(0, 200, 255);
const RUNNING: Color = Color::Rgb(46, 204, 113);
const PAUSED: Color = Color::Rgb(241, 196, 15);
const DANGER: Color = Color::Rgb(231, 76, 60);
const BAR: Color = Color::Rgb(52, 152, 219);

pub fn render<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    match app.view {
        View::Timer => render_timer(f, app),
        View::Report => render_report(f, app),
        View::Help => render_help(f),
    }

    if let Some(modal) = &app.modal {
        render_modal(f, modal);
    }
}

fn framed(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
}

fn span_key(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
}

// ============================================================================
// Timer
// ============================================================================

fn render_timer<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER))
            .title(Span::styled(" ⏱  FOCUS TIME ", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))),
        chunks[0],
    );

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Percentage(10),
        ])
        .split(chunks[1]);

    f.render_widget(
        Paragraph::new("Choose a category")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        sections[1],
    );
    f.render_widget(Paragraph::new(category_row(app)).alignment(Alignment::Center), sections[3]);

    let snapshot = app.engine.snapshot();
    let (status, color) = match snapshot.status {
        TimerStatus::Running => ("● Focusing...", RUNNING),
        TimerStatus::Paused => ("⏸  Paused", PAUSED),
        TimerStatus::Idle => ("Ready?", Color::Gray),
        TimerStatus::Finished => ("✓ Done", RUNNING),
    };

    f.render_widget(
        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format_time(snapshot.time_left),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center),
        sections[5],
    );
    f.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[7],
    );

    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(ACCENT).bg(Color::Black))
            .ratio(app.engine.progress().clamp(0.0, 1.0)),
        sections[9],
    );

    let info = format!(
        "{}  •  Distractions: {}  •  {} min session",
        snapshot.category,
        snapshot.distraction_count,
        app.engine.focus_minutes()
    );
    f.render_widget(
        Paragraph::new(info).style(Style::default().fg(Color::Gray)).alignment(Alignment::Center),
        sections[11],
    );

    let start_label = if snapshot.is_active { " Pause  •  " } else { " Start  •  " };
    let controls = vec![
        Line::from(vec![
            span_key("Space"), Span::raw(start_label),
            span_key("R"), Span::raw(" Reset  •  "),
            span_key("←→ / 1-9"), Span::raw(" Category"),
        ]),
        Line::from(vec![
            span_key("Tab"), Span::raw(" Report  •  "),
            span_key("?"), Span::raw(" Help  •  "),
            span_key("Q"), Span::raw(" Quit"),
        ]),
    ];
    f.render_widget(
        Paragraph::new(controls).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn category_row<S: KeyValueStore>(app: &App<S>) -> Line<'_> {
    let selected = app.selected_category();
    let locked = app.engine.is_active();
    let mut spans = Vec::new();

    for (idx, name) in app.categories.iter().enumerate() {
        let style = if selected == Some(idx) {
            Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
        } else if locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Gray)
        };
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(format!(" {name} "), style));
    }

    Line::from(spans)
}

// ============================================================================
// Report
// ============================================================================

fn render_report<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let area = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Length(2),
        ])
        .split(area);

    render_cards(f, &app.summary, chunks[0]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_week_chart(f, &app.summary, charts[0]);
    render_categories(f, &app.summary, charts[1]);

    let footer = match &app.flash {
        Some(msg) => Line::from(Span::styled(msg.as_str(), Style::default().fg(RUNNING))),
        None => Line::from(vec![
            span_key("Tab"), Span::raw(" Timer  •  "),
            span_key("E"), Span::raw(" Export CSV  •  "),
            span_key("X"), Span::raw(" Clear all  •  "),
            span_key("Q"), Span::raw(" Quit"),
            Span::raw(format!("   ({} sessions)", app.session_count)),
        ]),
    };
    f.render_widget(
        Paragraph::new(footer).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn render_cards(f: &mut Frame, summary: &Summary, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let values = [
        ("Today", format!("{} min", summary.today_focus), Color::Rgb(26, 188, 156)),
        ("Total", format!("{} min", summary.total_focus), BAR),
        ("Distractions", summary.total_distractions.to_string(), DANGER),
    ];

    for ((title, value, color), rect) in values.into_iter().zip(cards.iter()) {
        f.render_widget(
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD))),
            ])
            .alignment(Alignment::Center)
            .block(framed(title)),
            *rect,
        );
    }
}

fn render_week_chart(f: &mut Frame, summary: &Summary, area: Rect) {
    let data: Vec<(&str, u64)> = summary
        .week
        .labels
        .iter()
        .map(String::as_str)
        .zip(summary.week.values.iter().copied())
        .collect();

    let chart = BarChart::default()
        .block(framed("Last 7 days (min)"))
        .data(data.as_slice())
        .bar_width(5)
        .bar_gap(1)
        .bar_style(Style::default().fg(BAR))
        .value_style(Style::default().fg(Color::Black).bg(BAR).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(Color::Gray));

    f.render_widget(chart, area);
}

fn render_categories(f: &mut Frame, summary: &Summary, area: Rect) {
    let block = framed("Categories");

    if !summary.has_category_data() {
        f.render_widget(
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No data yet.",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )),
            ])
            .alignment(Alignment::Center)
            .block(block),
            area,
        );
        return;
    }

    let total: u64 = summary.categories.iter().map(|c| c.minutes).sum();
    let bar_room = area.width.saturating_sub(30).max(4) as u64;
    let mut lines = vec![Line::from("")];

    for slice in &summary.categories {
        let color = slice.color.parse::<Color>().unwrap_or(Color::White);
        let share = if total > 0 { slice.minutes * 100 / total } else { 0 };
        let width = if total > 0 { (slice.minutes * bar_room / total) as usize } else { 0 };
        lines.push(Line::from(vec![
            Span::styled(" ■ ", Style::default().fg(color)),
            Span::styled(format!("{:<12}", slice.name), Style::default().fg(Color::White)),
            Span::styled("█".repeat(width.max(1)), Style::default().fg(color)),
            Span::raw(format!(" {} min ({share}%)", slice.minutes)),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Help
// ============================================================================

fn render_help(f: &mut Frame) {
    let area = centered_rect(70, 80, f.size());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("⌨️  KEYBOARD SHORTCUTS", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  Timer:"),
        help_line("Space", "Start / pause"),
        help_line("R", "Reset (nothing is recorded)"),
        help_line("← → / 1-9", "Pick a category (while stopped)"),
        Line::from(""),
        Line::from("  Report:"),
        help_line("E", "Export CSV"),
        help_line("X", "Clear all sessions"),
        Line::from(""),
        Line::from("  General:"),
        help_line("Tab", "Switch timer / report"),
        help_line("Q / Esc", "Quit / go back"),
        help_line("Ctrl+C", "Force quit"),
        Line::from(""),
        Line::from(Span::styled(
            "  Leaving the terminal window while focusing pauses the timer and counts a distraction.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }).block(framed("Help")), area);
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(format!("{key:<12}"), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(desc),
    ])
}

// ============================================================================
// Modals
// ============================================================================

fn render_modal(f: &mut Frame, modal: &Modal) {
    let area = centered_rect(60, 30, f.size());

    let (title, color, body, hint) = match modal {
        Modal::Completed(notice) => (
            notice.title.as_str(),
            RUNNING,
            notice.message.clone(),
            "Enter: OK",
        ),
        Modal::ResumePrompt => (
            "Welcome back",
            PAUSED,
            "Your focus session was interrupted. Resume it or abandon it?".to_string(),
            "Y: Resume  •  N: Abandon",
        ),
        Modal::ConfirmClear => (
            "Clear all sessions?",
            DANGER,
            "Every recorded session will be deleted. This cannot be undone.".to_string(),
            "Y: Confirm  •  N/Esc: Cancel",
        ),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(body, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(format!(" {title} "), Style::default().fg(color).add_modifier(Modifier::BOLD)))
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(color)),
            ),
        area,
    );
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}
