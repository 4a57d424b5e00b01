use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Sparkline, Wrap},
};
use std::io::stdout;

use crate::app_store::AppStore;
use crate::i18n::{status_label, tr};
use crate::models::{Application, ApplicationStatus, RADAR_AXES};
use crate::stats::{self, DashboardMetrics, SortOrder};

struct AppState {
    selected: usize,
    scroll_offset: u16,
    show_notifications: bool,
    show_reasoning: bool,
    status_line: Option<String>,
}

impl AppState {
    fn new() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            show_notifications: false,
            show_reasoning: false,
            status_line: None,
        }
    }

    fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn next(&mut self, len: usize) {
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

pub async fn run_dashboard(store: &mut AppStore) -> Result<()> {
    store.refresh().await;

    let mut state = AppState::new();

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, store).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    store: &mut AppStore,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        let view = stats::filter_and_sort(store.applications(), "", SortOrder::DateDesc);
        state.clamp(view.len());
        list_state.select(if view.is_empty() { None } else { Some(state.selected) });

        terminal.draw(|frame| draw(frame, state, store, &view, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if state.show_notifications {
                match key.code {
                    KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => {
                        state.show_notifications = false;
                    }
                    _ => {}
                }
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(view.len()),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('d') => state.show_reasoning = !state.show_reasoning,
                KeyCode::Char('n') => {
                    state.show_notifications = true;
                    store.notifications_mut().mark_all_read();
                }
                KeyCode::Char('r') => {
                    store.refresh().await;
                    state.status_line = Some("refreshed".to_string());
                }
                KeyCode::Char('w') => move_selected(state, store, &view, ApplicationStatus::Wishlist).await,
                KeyCode::Char('a') => move_selected(state, store, &view, ApplicationStatus::Applied).await,
                KeyCode::Char('i') => move_selected(state, store, &view, ApplicationStatus::Interviewing).await,
                KeyCode::Char('o') => move_selected(state, store, &view, ApplicationStatus::OfferReceived).await,
                KeyCode::Char('x') => move_selected(state, store, &view, ApplicationStatus::Rejected).await,
                _ => {}
            }
        }
    }
    Ok(())
}

async fn move_selected(
    state: &mut AppState,
    store: &mut AppStore,
    view: &[Application],
    status: ApplicationStatus,
) {
    let Some(app) = view.get(state.selected) else { return };
    let id = app.id.clone();
    match store.move_application(&id, status).await {
        Ok(()) => {
            state.status_line = Some(format!("moved to {status}"));
        }
        Err(err) => {
            state.status_line = Some(err.to_string());
        }
    }
}

fn draw(
    frame: &mut Frame,
    state: &AppState,
    store: &AppStore,
    view: &[Application],
    list_state: &mut ListState,
) {
    let lang = store.language();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Header: metrics and 30-day activity sparkline
    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[0]);

    let metrics = DashboardMetrics::compute(store.applications());
    let unread = store.notifications().unread_count();
    let metrics_line = format!(
        " {}: {}  {}: {}  {}: {}  {}: {}  [n] {} ({})",
        tr(lang, "dashboard.total"),
        metrics.total_applications,
        tr(lang, "dashboard.interviewing"),
        metrics.in_interview,
        tr(lang, "dashboard.offers"),
        metrics.offers,
        tr(lang, "dashboard.perfect_matches"),
        metrics.high_matches,
        tr(lang, "notif.title"),
        unread,
    );
    frame.render_widget(
        Paragraph::new(metrics_line)
            .block(Block::default().borders(Borders::ALL).title(" CareerFlow ")),
        header[0],
    );

    let today = chrono::Local::now().date_naive();
    let histogram = stats::activity_histogram(store.applications(), today);
    let counts: Vec<u64> = histogram.iter().map(|(_, n)| *n).collect();
    frame.render_widget(
        Sparkline::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", tr(lang, "dashboard.activity"))),
            )
            .data(&counts)
            .style(Style::default().fg(Color::Cyan)),
        header[1],
    );

    // Main: application list and detail
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    let items: Vec<ListItem> = view
        .iter()
        .map(|app| {
            let marker = match app.status {
                ApplicationStatus::New => " ",
                ApplicationStatus::Wishlist => "w",
                ApplicationStatus::Applied => "+",
                ApplicationStatus::Interviewing => "*",
                ApplicationStatus::OfferReceived => "o",
                ApplicationStatus::Rejected => "x",
            };
            let title = truncate(&app.job_title, 28);
            ListItem::new(format!(
                "{} {:>3}% {} | {}",
                marker, app.match_score, title, app.company_name
            ))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " {} ({}) ",
            tr(lang, "dashboard.applications"),
            view.len()
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, main[0], list_state);

    let detail = build_detail(state, store, view);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(detail_widget, main[1]);

    // Footer help
    let help = state.status_line.clone().unwrap_or_else(|| {
        " j/k:navigate  J/K:scroll  w/a/i/o/x:move stage  d:reasoning  n:notifications  r:refresh  q:quit"
            .to_string()
    });
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );

    if state.show_notifications {
        draw_notifications(frame, store);
    }
}

fn draw_notifications(frame: &mut Frame, store: &AppStore) {
    let lang = store.language();
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = if store.notifications().is_empty() {
        vec![ListItem::new(tr(lang, "notif.empty"))]
    } else {
        store
            .notifications()
            .entries()
            .iter()
            .map(|n| ListItem::new(format!("[{}] {} - {}", n.timestamp, n.title, n.message)))
            .collect()
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", tr(lang, "notif.title"))),
    );
    frame.render_widget(list, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn build_detail<'a>(state: &AppState, store: &'a AppStore, view: &'a [Application]) -> Text<'a> {
    let lang = store.language();
    let Some(app) = view.get(state.selected) else {
        return Text::raw(tr(lang, "dashboard.no_apps"));
    };

    let mut lines: Vec<Line> = Vec::new();

    // Header
    lines.push(Line::from(Span::styled(
        app.job_title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", app.company_name)));

    let status_style = match app.status {
        ApplicationStatus::New => Style::default().fg(Color::Green),
        ApplicationStatus::Wishlist => Style::default().fg(Color::Magenta),
        ApplicationStatus::Applied => Style::default().fg(Color::Cyan),
        ApplicationStatus::Interviewing => Style::default().fg(Color::Yellow),
        ApplicationStatus::OfferReceived => Style::default().fg(Color::LightGreen),
        ApplicationStatus::Rejected => Style::default().fg(Color::Red),
    };
    lines.push(Line::from(Span::styled(
        format!("Status: {}", status_label(lang, app.status)),
        status_style,
    )));
    lines.push(Line::from(format!(
        "{}: {}%   {}: {}",
        tr(lang, "result.overall_score"),
        app.match_score,
        tr(lang, "dashboard.added"),
        app.date_display
    )));
    lines.push(Line::from(""));

    if let Some(report) = &app.analysis {
        lines.push(Line::from(Span::styled(
            tr(lang, "result.ai_assessment"),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        let assessment = report.bilingual_content.general_assessment.get(lang);
        if assessment.is_empty() {
            lines.push(Line::from(Span::styled(
                tr(lang, "result.no_assessment"),
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            for line in textwrap::fill(assessment, 70).lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        lines.push(Line::from(""));

        // Radar axes with optional per-axis reasoning
        lines.push(Line::from(Span::styled(
            tr(lang, "result.radar_chart"),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for axis in RADAR_AXES {
            let score = report.radar_chart.get(axis).copied().unwrap_or(0);
            let filled = "#".repeat(score.clamp(0, 10) as usize);
            let empty = ".".repeat(10usize.saturating_sub(score.clamp(0, 10) as usize));
            lines.push(Line::from(format!("  {axis:<17} [{filled}{empty}] {score}/10")));
            if state.show_reasoning {
                if let Some(reason) = report.radar_reasoning.get(axis) {
                    let text = reason.get(lang);
                    if !text.is_empty() {
                        for line in textwrap::fill(text, 66).lines() {
                            lines.push(Line::from(Span::styled(
                                format!("    {line}"),
                                Style::default().fg(Color::DarkGray),
                            )));
                        }
                    }
                }
            }
        }
        lines.push(Line::from(""));

        let strengths = report.bilingual_content.strengths.get(lang);
        if !strengths.is_empty() {
            lines.push(Line::from(Span::styled(
                tr(lang, "result.strengths"),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            for item in strengths {
                lines.push(Line::from(format!("  + {item}")));
            }
            lines.push(Line::from(""));
        }
        let gaps = report.bilingual_content.weaknesses_missing_skills.get(lang);
        if !gaps.is_empty() {
            lines.push(Line::from(Span::styled(
                tr(lang, "result.weaknesses"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            for item in gaps {
                lines.push(Line::from(format!("  - {item}")));
            }
            lines.push(Line::from(""));
        }

        let rows = &report.bilingual_content.comparison_table;
        if !rows.is_empty() {
            lines.push(Line::from(Span::styled(
                tr(lang, "result.detailed_comparison"),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for row in rows {
                let mark = if row.is_matched() { "v" } else { "x" };
                lines.push(Line::from(format!(
                    "  [{mark}] {} | {}",
                    truncate(&row.jd_requirement, 32),
                    truncate(&row.cv_evidence, 32)
                )));
            }
        }
    } else {
        lines.push(Line::from(Span::styled(
            tr(lang, "result.none"),
            Style::default().fg(Color::DarkGray),
        )));
        if !app.jd_content.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                tr(lang, "result.jd"),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for line in app.jd_content.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
    }

    Text::from(lines)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
