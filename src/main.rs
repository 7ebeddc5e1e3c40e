use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
    Row, Table,
};

use samu_tracker::charts::{self, BoxSummary, ScatterChart};
use samu_tracker::config::{DashboardConfig, HistorySource};
use samu_tracker::context::DashboardContext;
use samu_tracker::export;
use samu_tracker::filter::{FilterOutcome, PlayerFilter};
use samu_tracker::match_history::{LoadReport, MatchRecord, Team, format_number};
use samu_tracker::schema::{Field, Metric};
use samu_tracker::state::{self, AppState, Screen};

const SERIES_COLORS: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
    Color::LightBlue,
    Color::White,
    Color::LightGreen,
];

struct App {
    ctx: DashboardContext,
    state: AppState,
    export_path: PathBuf,
    recency_step: usize,
    should_quit: bool,
}

impl App {
    fn new(ctx: DashboardContext, export_path: PathBuf, recency_step: usize) -> Self {
        let state = AppState::new(&ctx);
        Self {
            ctx,
            state,
            export_path,
            recency_step,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                self.state.screen = match self.state.screen {
                    Screen::Dashboard => Screen::Matches,
                    Screen::Matches => Screen::Dashboard,
                }
            }
            KeyCode::Char('m') => self.state.cycle_mode(&self.ctx),
            KeyCode::Char('j') | KeyCode::Down => self.state.player_next(&self.ctx),
            KeyCode::Char('k') | KeyCode::Up => self.state.player_prev(&self.ctx),
            KeyCode::Char(' ') => self.state.cycle_player_filter(&self.ctx),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.state.recency_up(self.recency_step);
                self.state.sync_recency(&self.ctx);
            }
            KeyCode::Char('-') => {
                self.state.recency_down(self.recency_step);
                self.state.sync_recency(&self.ctx);
            }
            KeyCode::Char('x') => self.state.cycle_x(true),
            KeyCode::Char('X') => self.state.cycle_x(false),
            KeyCode::Char('y') => self.state.cycle_y(true),
            KeyCode::Char('Y') => self.state.cycle_y(false),
            KeyCode::Char('1') => self.state.cycle_box_metric(0),
            KeyCode::Char('2') => self.state.cycle_box_metric(1),
            KeyCode::Char('t') => self.state.toggle_trend(),
            KeyCode::Char('p') => self.state.toggle_trend_scope(),
            KeyCode::Char(']') => self.state.step_detail_match(&self.ctx, true),
            KeyCode::Char('[') => self.state.step_detail_match(&self.ctx, false),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn export(&mut self) {
        let outcome = self.ctx.filter(&self.state.selection);
        match export::export_view(&self.export_path, &outcome.rows, self.ctx.roster()) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} rows / {} players to {}",
                report.match_rows,
                report.summary_rows,
                self.export_path.display()
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }
}

fn main() -> Result<()> {
    let config = DashboardConfig::from_env().context("invalid dashboard configuration")?;
    let (ctx, report) =
        DashboardContext::load(&config).context("failed to load match history")?;

    let mut app = App::new(ctx, config.export_path.clone(), config.recency_step);
    app.state.x_metric = config.scatter_x;
    app.state.y_metric = config.scatter_y;
    log_load_report(&mut app.state, &config, &report);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn log_load_report(state: &mut AppState, config: &DashboardConfig, report: &LoadReport) {
    let source = match &config.source {
        HistorySource::ExportDir(path) => format!("{} export(s) from {}", report.files, path.display()),
        HistorySource::Snapshot(path) => format!("snapshot {}", path.display()),
    };
    state.push_log(format!(
        "[INFO] Loaded {source}: {} rows, {} matches",
        report.rows, report.matches
    ));
    if report.recovered_rows > 0 {
        state.push_log(format!(
            "[WARN] {} malformed line(s) kept for team size only",
            report.recovered_rows
        ));
    }
    if report.duplicates_removed > 0 {
        state.push_log(format!(
            "[INFO] Dropped {} duplicate row(s)",
            report.duplicates_removed
        ));
    }
    for id in &report.odd_matches {
        state.push_log(format!("[WARN] Match {id} has an odd participant count"));
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let outcome = app.ctx.filter(&app.state.selection);

    let header = Paragraph::new(header_text(&app.state, &outcome))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(chunks[1]);
    render_sidebar(frame, body[0], app);

    match app.state.screen {
        Screen::Dashboard => render_dashboard(frame, body[1], app, &outcome),
        Screen::Matches => render_match_table(frame, body[1], &outcome.rows),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "Tab View | m Mode | j/k Player | Space Filter | +/- Recency | x/y Axes | t Trend | [/] Match | e Export | ? Help | q Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState, outcome: &FilterOutcome<'_>) -> String {
    format!(
        "SAMU TRACKER | {} | last {} of {} matches | {} rows",
        state.selection.game_mode,
        state.selection.recency_count.min(state.recency_limit),
        state.recency_limit,
        outcome.rows.len()
    )
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(area);

    let state = &app.state;
    let settings = [
        format!("Mode:    {}", state.selection.game_mode),
        format!(
            "Recency: {} / {}",
            state.selection.recency_count, state.recency_limit
        ),
        format!("Scatter: {} vs {}", state.y_metric.label(), state.x_metric.label()),
        format!("Trend:   {}", state::trend_label(state.trend, state.trend_scope)),
    ]
    .join("\n");
    let settings = Paragraph::new(settings)
        .block(Block::default().title("Filters").borders(Borders::ALL));
    frame.render_widget(settings, sections[0]);

    let mut lines = Vec::new();
    for (idx, (id, name)) in app.ctx.roster().players().iter().enumerate() {
        let filter = state.selection.filter_for(id);
        let marker = match filter {
            PlayerFilter::Include => "+",
            PlayerFilter::Exclude => "-",
            PlayerFilter::Any => " ",
        };
        let style = match filter {
            PlayerFilter::Include => Style::default().fg(Color::Green),
            PlayerFilter::Exclude => Style::default().fg(Color::Red),
            PlayerFilter::Any => Style::default(),
        };
        let style = if idx == state.player_cursor {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        };
        lines.push(Line::styled(format!("[{marker}] {name}"), style));
    }
    let players = Paragraph::new(lines)
        .block(Block::default().title("Players").borders(Borders::ALL));
    frame.render_widget(players, sections[1]);
}

fn render_dashboard(frame: &mut Frame, area: Rect, app: &App, outcome: &FilterOutcome<'_>) {
    if outcome.is_empty() {
        let empty = Paragraph::new("No matches for this selection")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
        ])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(bottom[1]);

    let roster = app.ctx.roster();
    for (slot, metric) in app.state.box_metrics.iter().enumerate() {
        let boxes = charts::box_summary(&outcome.rows, roster, *metric);
        render_boxes(frame, top[slot], metric.label(), &boxes);
    }
    render_winrate(frame, top[2], &charts::winrate(&outcome.rows, roster));

    let scatter = charts::scatter(
        &outcome.rows,
        roster,
        app.state.x_metric,
        app.state.y_metric,
        app.state.trend,
        app.state.trend_scope,
    );
    render_scatter(frame, bottom[0], &scatter);
    render_summary(frame, right[0], &charts::summary(&outcome.rows, roster));
    render_match_detail(frame, right[1], app);
}

fn render_boxes(frame: &mut Frame, area: Rect, title: &str, boxes: &[BoxSummary]) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if boxes.is_empty() || inner.width < 20 {
        return;
    }

    let lo = boxes.iter().map(|b| b.min).fold(f64::INFINITY, f64::min);
    let hi = boxes.iter().map(|b| b.max).fold(f64::NEG_INFINITY, f64::max);
    let name_width = 10usize;
    let strip_width = (inner.width as usize).saturating_sub(name_width + 1).max(5);

    let mut lines = Vec::new();
    for (idx, b) in boxes.iter().enumerate() {
        let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
        let name = truncate(&b.name, name_width);
        lines.push(Line::from(vec![
            Span::raw(format!("{name:<name_width$} ")),
            Span::styled(box_strip(b, lo, hi, strip_width), Style::default().fg(color)),
        ]));
        lines.push(Line::styled(
            format!(
                "{:>name_width$} med {} ({}..{}) n={}",
                "",
                format_number(b.median),
                format_number(b.q1),
                format_number(b.q3),
                b.n
            ),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

// ASCII box-and-whisker scaled to [lo, hi].
fn box_strip(b: &BoxSummary, lo: f64, hi: f64, width: usize) -> String {
    let span = if hi > lo { hi - lo } else { 1.0 };
    let pos = |v: f64| (((v - lo) / span) * (width - 1) as f64).round() as usize;
    let mut cells = vec![' '; width];
    let (min, q1, med, q3, max) = (pos(b.min), pos(b.q1), pos(b.median), pos(b.q3), pos(b.max));
    for cell in cells.iter_mut().take(max + 1).skip(min) {
        *cell = '─';
    }
    for cell in cells.iter_mut().take(q3 + 1).skip(q1) {
        *cell = '█';
    }
    cells[min] = '├';
    cells[max] = '┤';
    cells[med] = '┃';
    cells.into_iter().collect()
}

fn render_winrate(frame: &mut Frame, area: Rect, bars: &[charts::WinrateBar]) {
    let data = bars
        .iter()
        .enumerate()
        .map(|(idx, bar)| {
            Bar::default()
                .value(bar.winrate.round() as u64)
                .label(Line::from(truncate(&bar.name, 8)))
                .text_value(format!("{:.2}%", bar.winrate))
                .style(Style::default().fg(SERIES_COLORS[idx % SERIES_COLORS.len()]))
        })
        .collect::<Vec<_>>();
    let chart = BarChart::default()
        .block(Block::default().title("Winrate %").borders(Borders::ALL))
        .data(BarGroup::default().bars(&data))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(100);
    frame.render_widget(chart, area);
}

fn render_scatter(frame: &mut Frame, area: Rect, chart: &ScatterChart) {
    let title = match chart.r_squared {
        Some(r2) => format!("{} vs {} (R² {:.3})", chart.y.label(), chart.x.label(), r2),
        None => format!("{} vs {}", chart.y.label(), chart.x.label()),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let Some((xb, yb)) = chart.bounds() else {
        frame.render_widget(block, area);
        return;
    };
    let xb = widen(xb);
    let yb = widen(yb);

    let mut trend_points = Vec::new();
    for (idx, series) in chart.series.iter().enumerate() {
        if let Some(line) = series.trend {
            trend_points.push((idx, line.endpoints().to_vec()));
        }
    }
    let overall = chart.overall_trend.map(|line| line.endpoints().to_vec());

    let mut datasets = Vec::new();
    for (idx, series) in chart.series.iter().enumerate() {
        datasets.push(
            Dataset::default()
                .name(series.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(SERIES_COLORS[idx % SERIES_COLORS.len()]))
                .data(&series.points),
        );
    }
    for (idx, points) in &trend_points {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[idx % SERIES_COLORS.len()]))
                .data(points),
        );
    }
    if let Some(points) = &overall {
        datasets.push(
            Dataset::default()
                .name("OLS")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Gray))
                .data(points),
        );
    }

    let chart_widget = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(chart.x.label())
                .bounds(xb)
                .labels(axis_labels(xb)),
        )
        .y_axis(
            Axis::default()
                .title(chart.y.label())
                .bounds(yb)
                .labels(axis_labels(yb)),
        );
    frame.render_widget(chart_widget, area);
}

fn widen(bounds: [f64; 2]) -> [f64; 2] {
    if bounds[1] > bounds[0] {
        bounds
    } else {
        [bounds[0] - 1.0, bounds[1] + 1.0]
    }
}

fn axis_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .into_iter()
        .map(|v| Span::raw(format!("{v:.0}")))
        .collect()
}

fn render_summary(frame: &mut Frame, area: Rect, summary: &[charts::SummaryRow]) {
    let header = Row::new(charts::SUMMARY_HEADERS.iter().map(|h| h.to_string()))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = summary.iter().map(|s| {
        Row::new(vec![
            s.name.clone(),
            s.games.to_string(),
            format_number(s.goals),
            format_number(s.assists),
            format_number(s.saves),
            format_number(s.shots),
            format_number(s.demolishes),
        ])
    });
    let widths = [
        Constraint::Min(10),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title("Summary").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_match_detail(frame: &mut Frame, area: Rect, app: &App) {
    let Some(match_id) = &app.state.detail_match else {
        let empty = Paragraph::new("No match selected")
            .block(Block::default().title("Match").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let header = Row::new(["Team", "Player", "Score", "Goals", "Saves", "Shots", "Demos"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = charts::match_detail(app.ctx.table(), match_id)
        .into_iter()
        .map(|d| {
            let color = match d.team {
                Team::Blue => Color::LightBlue,
                Team::Orange => Color::LightRed,
            };
            Row::new(vec![
                d.team.label().to_string(),
                d.player_name,
                format_number(d.score),
                format_number(d.goals),
                format_number(d.saves),
                format_number(d.shots),
                format_number(d.demolishes),
            ])
            .style(Style::default().fg(color))
        });
    let widths = [
        Constraint::Length(6),
        Constraint::Min(10),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!("Match {match_id}"))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn render_match_table(frame: &mut Frame, area: Rect, rows: &[&MatchRecord]) {
    let fields = [
        Field::Date,
        Field::Time,
        Field::DisplayName,
        Field::Team,
        Field::GameMode,
        Field::Outcome,
        Field::Metric(Metric::Score),
        Field::Metric(Metric::Goals),
        Field::Metric(Metric::Assists),
        Field::Metric(Metric::Saves),
        Field::Metric(Metric::Shots),
    ];
    let header = Row::new(fields.iter().map(|f| f.label().to_string()))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let body = rows
        .iter()
        .map(|r| Row::new(fields.iter().map(|f| r.value_text(*f))));
    let widths = fields.iter().map(|f| match f {
        Field::Date | Field::DisplayName => Constraint::Length(12),
        Field::Time => Constraint::Length(9),
        _ => Constraint::Length(8),
    });
    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().title("Matches").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Samu Tracker - Help",
        "",
        "Filters:",
        "  m            Cycle game mode",
        "  j/k or ↑/↓   Move player cursor",
        "  Space        Player: include / exclude / any",
        "  + / -        Recency count",
        "",
        "Charts:",
        "  x / y        Scatter variables (X / Y back)",
        "  1 / 2        Box plot variables",
        "  t            Trendline on/off",
        "  p            Trend overall / per player",
        "  [ / ]        Newer / older match detail",
        "",
        "Global:",
        "  Tab          Dashboard / match table",
        "  e            Export XLSX",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
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

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
