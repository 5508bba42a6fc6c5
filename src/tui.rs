use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::indicators::{CrashSignal, Mood, Risk};
use crate::market_data::MarketDataProvider;
use crate::pipeline::{self, BatchReport};
use crate::storage_utils::AppConfig;

// --- App State ---

struct App {
    input: String,
    batch: Option<BatchReport>,
    is_running: bool,
    last_run: Option<DateTime<Utc>>,
}

impl App {
    fn new() -> Self {
        Self {
            input: String::new(),
            batch: None,
            is_running: false,
            last_run: None,
        }
    }

    fn set_batch(&mut self, batch: BatchReport) {
        self.batch = Some(batch);
        self.is_running = false;
        self.last_run = Some(Utc::now());
    }
}

// --- TUI ---

pub async fn run_tui(provider: Arc<dyn MarketDataProvider>, config: AppConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, provider, config).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    provider: Arc<dyn MarketDataProvider>,
    config: AppConfig,
) -> Result<()> {
    let (batch_tx, mut batch_rx) = mpsc::channel::<BatchReport>(1);
    let mut app = App::new();

    loop {
        terminal.draw(|f| ui(f, &app, &config.currency))?;

        if let Ok(batch) = batch_rx.try_recv() {
            app.set_batch(batch);
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if !handle_key_event(key, &mut app, &batch_tx, &provider, &config) {
                        return Ok(());
                    }
                }
                // A resize just falls through; the next draw picks up the
                // new dimensions.
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }
}

fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    tx: &mpsc::Sender<BatchReport>,
    provider: &Arc<dyn MarketDataProvider>,
    config: &AppConfig,
) -> bool {
    match key.code {
        KeyCode::Esc => return false,
        KeyCode::Enter if !app.is_running && !app.input.trim().is_empty() => {
            app.is_running = true;
            let tx = tx.clone();
            let provider = provider.clone();
            let config = config.clone();
            let symbols = app.input.clone();
            tokio::spawn(async move {
                let batch = pipeline::run_batch(provider.as_ref(), &symbols, &config).await;
                let _ = tx.send(batch).await;
            });
        }
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(c) => app.input.push(c),
        _ => {}
    }
    true
}

fn mood_style(mood: Mood) -> Style {
    let color = match mood {
        Mood::Bullish => Color::Green,
        Mood::Bearish => Color::Red,
        Mood::Neutral => Color::Gray,
        Mood::Unknown => Color::DarkGray,
    };
    Style::default().fg(color)
}

fn risk_style(risk: Risk) -> Style {
    let color = match risk {
        Risk::Low => Color::Green,
        Risk::Medium => Color::Yellow,
        Risk::High => Color::Red,
        Risk::Unknown => Color::DarkGray,
    };
    Style::default().fg(color)
}

fn crash_style(crash: CrashSignal) -> Style {
    let color = match crash {
        CrashSignal::Stable => Color::Green,
        CrashSignal::Downtrend => Color::Red,
        CrashSignal::Unknown => Color::DarkGray,
    };
    Style::default().fg(color)
}

fn ui(f: &mut Frame, app: &App, currency: &str) {
    let main_layout =
        Layout::horizontal([Constraint::Percentage(24), Constraint::Percentage(76)]).split(f.size());

    // Sidebar: portfolio suggestion plus the skipped symbols.
    let sidebar_block = Block::default()
        .borders(Borders::ALL)
        .title("Portfolio")
        .title_alignment(Alignment::Center);
    let inner_sidebar_area = sidebar_block.inner(main_layout[0]);
    f.render_widget(sidebar_block, main_layout[0]);

    let sidebar_chunks = Layout::vertical([
        Constraint::Min(1),    // suggestion + skipped list
        Constraint::Length(1), // key hints
    ])
    .split(inner_sidebar_area);

    let mut sidebar_lines: Vec<Line> = Vec::new();
    if let Some(batch) = &app.batch {
        match batch.portfolio() {
            Some(suggestion) => {
                sidebar_lines.push(
                    Line::from(format!("High Return  {}", suggestion.high_return))
                        .style(Style::default().fg(Color::Green)),
                );
                sidebar_lines.push(
                    Line::from(format!("Balanced     {}", suggestion.balanced))
                        .style(Style::default().fg(Color::Yellow)),
                );
                sidebar_lines.push(
                    Line::from(format!("Low Risk     {}", suggestion.low_risk))
                        .style(Style::default().fg(Color::Cyan)),
                );
            }
            None => sidebar_lines.push(Line::from("No results yet")),
        }

        if !batch.failures.is_empty() {
            sidebar_lines.push(Line::from(""));
            sidebar_lines.push(Line::from("Skipped"));
            for failure in &batch.failures {
                sidebar_lines.push(
                    Line::from(format!("✗ {}: {}", failure.symbol, failure.error))
                        .style(Style::default().fg(Color::Red)),
                );
            }
        }
    } else {
        sidebar_lines.push(Line::from("Enter symbols to analyze"));
    }

    f.render_widget(Paragraph::new(sidebar_lines), sidebar_chunks[0]);
    f.render_widget(
        Paragraph::new("Enter runs · Esc quits").alignment(Alignment::Center),
        sidebar_chunks[1],
    );

    // Right side: input line above the results table.
    let right_chunks =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).split(main_layout[1]);

    f.render_widget(
        Paragraph::new(app.input.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Symbols (comma-separated)"),
        ),
        right_chunks[0],
    );

    let header = Row::new(vec![
        Cell::from("Rank"),
        Cell::from("Symbol"),
        Cell::from("Predicted (30d)"),
        Cell::from("Mood"),
        Cell::from("Risk"),
        Cell::from("Crash"),
        Cell::from("Growth (%)"),
    ])
    .style(Style::default().bg(Color::DarkGray));

    let rows: Vec<Row> = app
        .batch
        .iter()
        .flat_map(|batch| batch.ranked())
        .enumerate()
        .map(|(i, report)| {
            let growth_color = if report.growth_pct < 0.0 {
                Color::Red
            } else {
                Color::Green
            };

            Row::new([
                Cell::from(format!("{}", i + 1)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(report.symbol.clone()).style(Style::default().fg(Color::Cyan)),
                Cell::from(format!("{}{:.2}", currency, report.predicted_price)),
                Cell::from(report.mood.to_string()).style(mood_style(report.mood)),
                Cell::from(report.risk.to_string()).style(risk_style(report.risk)),
                Cell::from(report.crash.to_string()).style(crash_style(report.crash)),
                Cell::from(format!("{:.2}%", report.growth_pct))
                    .style(Style::default().fg(growth_color)),
            ])
            .height(1)
        })
        .collect();

    let table_title = match app.last_run {
        Some(at) => format!("Results (updated {} UTC)", at.format("%H:%M:%S")),
        None => "Results".to_string(),
    };

    f.render_widget(
        Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Percentage(18),
                Constraint::Percentage(18),
                Constraint::Percentage(13),
                Constraint::Percentage(13),
                Constraint::Percentage(14),
                Constraint::Percentage(18),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(table_title)),
        right_chunks[1],
    );

    if app.is_running {
        let area = centered_rect(60, 20, main_layout[1]);
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new("Running analysis pipeline...\nPlease wait.")
                .block(Block::default().title("Analyzing").borders(Borders::ALL))
                .alignment(Alignment::Center),
            area,
        );
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
