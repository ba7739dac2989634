use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

use crate::output::{format_percent, format_score, format_timestamp, min_appts_label, rank_badge};
use crate::output::formatter::{BUILDING_DATA_MESSAGE, MATRIX_CAPTION, NO_BUCKET_DATA_MESSAGE, NO_REPS_MESSAGE};
use crate::scoring::RankedRep;
use crate::tui::app::{App, InputMode, View};
use crate::tui::theme::ThemeColors;

const SPINNER_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 8 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Content(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar with quick stats
        Constraint::Length(1), // Tab bar
        Constraint::Fill(1),   // Current view
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);

    if app.dashboard.is_none() {
        render_placeholder(frame, chunks[2], app);
    } else {
        match app.current_view {
            View::Rankings => render_rankings(frame, chunks[2], app),
            View::Leaders => render_leaders(frame, chunks[2], app),
            View::Matrix => render_matrix(frame, chunks[2], app),
        }
    }
    render_status_bar(frame, chunks[3], app);

    // Render overlays based on input mode
    match app.input_mode {
        InputMode::Help => render_help_popup(frame, &app.theme),
        InputMode::ScoreBreakdown => render_breakdown_popup(frame, app),
        InputMode::Normal => {}
    }

    // Render loading overlay if loading (appears on top of everything)
    if app.is_loading {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let title = "Sales Rep Performance Rankings";
    let mut spans = vec![Span::styled(title, Style::default().fg(theme.title_color).bold())];

    if let Some(summary) = &app.summary {
        let top = match &summary.top_performer {
            Some(t) => format!("{} ({:.1})", t.first_name, t.score),
            None => "N/A".to_string(),
        };
        let stats = format!(
            "Reps: {}  Avg Close: {:.1}%  Avg Capture: {:.1}%  Top: {}",
            summary.total_reps, summary.avg_close, summary.avg_capture, top
        );
        let padding_len = (area.width as usize)
            .saturating_sub(title.chars().count() + stats.chars().count());
        if padding_len > 0 {
            spans.push(Span::raw(" ".repeat(padding_len)));
            spans.push(Span::styled(stats, Style::default().fg(theme.muted)));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<&str> = View::ALL.iter().map(|v| v.title()).collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive_style)
        .highlight_style(app.theme.tab_active_style.reversed())
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_placeholder(frame: &mut Frame, area: Rect, app: &App) {
    let (text, color) = match &app.load_error {
        Some(err) => (
            format!("Could not load {}\n\n{}\n\nPress r to retry", app.source.label(), err),
            app.theme.flash_error,
        ),
        None => ("Waiting for data...".to_string(), app.theme.muted),
    };
    let msg = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(color));
    frame.render_widget(msg, area);
}

fn alt_row_style(idx: usize, theme: &ThemeColors) -> Style {
    // Alternating row background (odd rows get subtle background)
    if idx % 2 == 1 {
        Style::default().bg(theme.row_alt_bg)
    } else {
        Style::default()
    }
}

fn render_rankings(frame: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).split(area);

    let caption = format!(
        "Overall Performance Rankings ({})",
        min_appts_label(app.min_appointments)
    );
    frame.render_widget(
        Paragraph::new(Span::styled(caption, Style::default().fg(theme.muted))),
        chunks[0],
    );

    if app.filtered.is_empty() {
        let empty_msg = Paragraph::new(NO_REPS_MESSAGE)
            .alignment(Alignment::Center)
            .block(Block::default());
        frame.render_widget(empty_msg, chunks[1]);
        return;
    }

    // Calculate max score for bar scaling
    let max_score = app
        .filtered
        .iter()
        .map(|r| r.result.score)
        .fold(0.0_f64, f64::max);

    let rows: Vec<Row> = app
        .filtered
        .iter()
        .enumerate()
        .map(|(idx, ranked)| {
            let score_color = theme.score_color(ranked.result.score, max_score);
            let mut score_spans = vec![Span::styled(
                format!("{:>6} ", format_score(ranked.result.score, ranked.result.incomplete)),
                Style::default().fg(score_color),
            )];
            score_spans.extend(score_bar(ranked.result.score, max_score, 8, theme).spans);

            let rep = &ranked.rep;
            Row::new(vec![
                Cell::from(rank_badge(ranked.rank)).style(Style::default().fg(theme.index_color)),
                Cell::from(rep.name.clone()),
                Cell::from(Line::from(score_spans)),
                Cell::from(format_percent(rep.overall_close, 1)),
                Cell::from(format_percent(rep.overall_capture, 0)),
                Cell::from(format!("{}", rep.total_appts)),
                Cell::from(format!("{}/5", ranked.result.valid_categories)),
            ])
            .style(alt_row_style(idx, theme))
        })
        .collect();

    let widths = [
        Constraint::Length(7),  // Rank: "🥇 1"
        Constraint::Fill(1),    // Sales rep
        Constraint::Length(16), // Score + bar: "71.9 ████████"
        Constraint::Length(11), // Close rate
        Constraint::Length(13), // Capture rate
        Constraint::Length(13), // Appointments
        Constraint::Length(11), // Valid categories
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec![
                "Rank",
                "Sales Rep",
                "Score",
                "Close Rate",
                "Capture Rate",
                "Total Appts",
                "Categories",
            ])
            .style(theme.header_style)
            .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, chunks[1], &mut app.table_state);
}

fn render_leaders(frame: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    let chunks = Layout::vertical([
        Constraint::Length(7), // Leader cards
        Constraint::Length(1), // Bucket selector
        Constraint::Fill(1),   // Selected bucket table
    ])
    .split(area);

    let card_areas = Layout::horizontal(vec![Constraint::Ratio(1, 5); app.leaders.len().max(1)])
        .split(chunks[0]);
    let leader_min = app.scoring.leader_min_appointments();
    for ((bucket, leader), card_area) in app.leaders.iter().zip(card_areas.iter()) {
        let lines = match leader {
            Some(l) => vec![
                Line::from(Span::styled(format!("🏆 {}", l.name), theme.leader_name)),
                Line::from(format!("📊 {} Close", format_percent(l.stats.close_rate, 1))),
                Line::from(format!(
                    "📈 {:.0}% Capture",
                    l.stats.capture_rate.unwrap_or(0.0)
                )),
                Line::from(format!("📅 {} Appts", l.stats.appointments)),
            ],
            None => vec![
                Line::from(Span::styled(
                    BUILDING_DATA_MESSAGE,
                    Style::default().fg(theme.building_data).bold(),
                )),
                Line::from(Span::styled(
                    format!("Need {}+ appointments", leader_min),
                    Style::default().fg(theme.muted),
                )),
            ],
        };
        let card = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .title(format!(" {} ", bucket.display_name()))
                    .border_style(Style::default().fg(theme.muted)),
            );
        frame.render_widget(card, *card_area);
    }

    let bucket_titles: Vec<String> = app
        .bucket_tables
        .iter()
        .map(|(b, _)| format!("{} Units", b))
        .collect();
    let selector = Tabs::new(bucket_titles)
        .select(app.selected_bucket)
        .style(theme.tab_inactive_style)
        .highlight_style(theme.tab_active_style)
        .divider(" | ");
    frame.render_widget(selector, chunks[1]);

    let entries = app.selected_bucket_entries();
    if entries.is_empty() {
        let empty_msg = Paragraph::new(NO_BUCKET_DATA_MESSAGE).alignment(Alignment::Center);
        frame.render_widget(empty_msg, chunks[2]);
        return;
    }

    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            Row::new(vec![
                Cell::from(format!("{}", e.rank)).style(Style::default().fg(theme.index_color)),
                Cell::from(e.name.clone()),
                Cell::from(format_percent(e.stats.close_rate, 1)),
                Cell::from(format!("{:.0}%", e.stats.capture_rate.unwrap_or(0.0))),
                Cell::from(format!("{}", e.stats.appointments)),
            ])
            .style(alt_row_style(idx, theme))
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Fill(1),
        Constraint::Length(11),
        Constraint::Length(13),
        Constraint::Length(13),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Rank", "Sales Rep", "Close Rate", "Capture Rate", "Appointments"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, chunks[2], &mut app.table_state);
}

fn render_matrix(frame: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).split(area);
    frame.render_widget(
        Paragraph::new(Span::styled(MATRIX_CAPTION, Style::default().fg(theme.muted))),
        chunks[0],
    );

    if app.matrix.is_empty() {
        let empty_msg = Paragraph::new(NO_REPS_MESSAGE).alignment(Alignment::Center);
        frame.render_widget(empty_msg, chunks[1]);
        return;
    }

    let max_score = app.matrix.iter().map(|r| r.score).fold(0.0_f64, f64::max);
    let rows: Vec<Row> = app
        .matrix
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = vec![
                Cell::from(row.name.clone()),
                Cell::from(format_score(row.score, row.incomplete))
                    .style(Style::default().fg(theme.score_color(row.score, max_score))),
            ];
            cells.extend(row.cells.iter().map(|(_, text)| Cell::from(text.clone())));
            cells.push(Cell::from(format!("{}", row.total_appts)));
            Row::new(cells).style(alt_row_style(idx, theme))
        })
        .collect();

    let mut header = vec!["Sales Rep".to_string(), "Score".to_string()];
    let mut widths = vec![Constraint::Fill(1), Constraint::Length(7)];
    if let Some(first) = app.matrix.first() {
        for (bucket, _) in &first.cells {
            header.push(format!("{} Units", bucket));
            widths.push(Constraint::Length(20));
        }
    }
    header.push("Total".to_string());
    widths.push(Constraint::Length(6));

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(theme.header_style).bottom_margin(1))
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, chunks[1], &mut app.table_state);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, _)) = app.flash_message {
        // Show flash message with color based on message type
        let msg_color = if msg.starts_with("Failed")
            || msg.starts_with("Could not")
            || msg.contains("timed out")
        {
            theme.flash_error
        } else if msg.starts_with("Loaded") || msg.starts_with("Opened") {
            theme.flash_success
        } else {
            theme.text
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let source = app
            .dashboard
            .as_ref()
            .map(|d| format!("{} @ {}", d.source_label, format_timestamp(d.loaded_at)))
            .unwrap_or_else(|| app.source.label());

        // Build hints with colored shortcut keys
        let mut hints = vec![("j", "/", "k", ":nav ")];
        match app.current_view {
            View::Leaders => hints.push(("h", "/", "l", ":bucket ")),
            _ => hints.push(("b", "", "", ":breakdown ")),
        }
        hints.extend([
            ("m", "", "", ":min appts "),
            ("r", "", "", ":reload "),
            ("Tab", "", "", ":view "),
            ("?", "", "", ":help "),
            ("q", "", "", ":quit"),
        ]);

        let mut spans = vec![
            Span::styled(source, Style::default().fg(theme.muted)),
            Span::raw(" "),
            Span::styled(
                min_appts_label(app.min_appointments),
                Style::default().fg(theme.muted),
            ),
            Span::raw("  "),
        ];
        for (i, (key1, sep, key2, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key1, Style::default().fg(theme.status_key_color)));
            if !sep.is_empty() {
                spans.push(Span::raw(*sep));
                spans.push(Span::styled(*key2, Style::default().fg(theme.status_key_color)));
            }
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

fn score_bar(score: f64, max_score: f64, width: usize, theme: &ThemeColors) -> Line<'static> {
    let ratio = if max_score > 0.0 {
        (score / max_score).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar_color = theme.score_color(score, max_score);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(bar_color)));
    }
    if empty > 0 {
        spans.push(Span::styled("░".repeat(empty), Style::default().fg(theme.bar_empty)));
    }

    Line::from(spans)
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, theme: &ThemeColors) {
    let popup_area = centered_rect_fixed(52, 17, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let shortcuts = [
        ("j / Down      ", "Move down"),
        ("k / Up        ", "Move up"),
        ("Tab           ", "Next view"),
        ("1 / 2 / 3     ", "Rankings / Leaders / Matrix"),
        ("h / l         ", "Previous / next unit bucket"),
        ("m             ", "Cycle minimum appointments"),
        ("b             ", "Score breakdown for selected rep"),
        ("r             ", "Reload data source"),
        ("o             ", "Open Google Sheet in browser"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = shortcuts
        .iter()
        .map(|(key, desc)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*desc)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Scores marked * are missing overall rates",
        Style::default().fg(theme.muted),
    )));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Lines explaining how a rep's score was built
fn breakdown_lines(ranked: &RankedRep, theme: &ThemeColors) -> Vec<Line<'static>> {
    let result = &ranked.result;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Score: ", Style::default().fg(theme.muted)),
            Span::styled(
                format_score(result.score, result.incomplete),
                Style::default().fg(theme.text).bold(),
            ),
        ]),
        Line::from(""),
    ];

    for factor in &result.breakdown.factors {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<16}", factor.label), Style::default().fg(theme.status_key_color)),
            Span::raw(format!("{:<18}", factor.description)),
            Span::styled(
                format!("+{:.2}", factor.contribution()),
                Style::default().fg(theme.score_high),
            ),
        ]));
    }

    lines.push(Line::from(""));
    let buckets = if result.breakdown.valid_buckets.is_empty() {
        "none".to_string()
    } else {
        result
            .breakdown
            .valid_buckets
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(Line::from(Span::styled(
        format!("Counted buckets: {}", buckets),
        Style::default().fg(theme.muted),
    )));
    if result.incomplete {
        lines.push(Line::from(Span::styled(
            "* overall close or capture rate missing",
            Style::default().fg(theme.building_data),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc/b: close  j/k: next rep",
        Style::default().fg(theme.muted),
    )));
    lines
}

fn render_breakdown_popup(frame: &mut Frame, app: &App) {
    let Some(ranked) = app.selected_ranked() else {
        return;
    };
    let theme = &app.theme;
    let lines = breakdown_lines(ranked, theme);
    let height = lines.len() as u16 + 2;
    let popup_area = centered_rect_fixed(72, height, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(format!(" {} ", ranked.rep.name), theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the loading spinner overlay
fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(34, 3, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().border_style(Style::default().fg(app.theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let spinner = SPINNER_CHARS[app.spinner_frame % SPINNER_CHARS.len()];

    // Display different text based on whether this is initial load or reload
    let text = if app.dashboard.is_none() {
        format!("{} Loading sales data...", spinner)
    } else {
        format!("{} Reloading...", spinner)
    };

    let loading_text = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.title_color));

    frame.render_widget(loading_text, inner);
}
