//! TUI progress view for a valuation run

use crate::status::StatusEvent;
use crate::Result;
use chrono::{DateTime, Local};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

/// Maximum number of status lines kept for display
const MAX_RECENT_LINES: usize = 200;

/// Progress view state
pub struct ProgressApp {
    /// Number of identifiers to process
    total: usize,
    /// Number of identifiers finished
    completed: usize,
    /// Recent status lines, oldest first
    recent: VecDeque<(DateTime<Local>, String)>,
    list_state: ListState,
    status_message: String,
    is_complete: bool,
    should_quit: bool,
    /// Fired when the user quits before the run is over
    cancel: CancellationToken,
}

impl ProgressApp {
    pub fn new(total: usize, cancel: CancellationToken) -> Self {
        Self {
            total,
            completed: 0,
            recent: VecDeque::new(),
            list_state: ListState::default(),
            status_message: "Processing profiles... Press 'q' to cancel.".to_string(),
            is_complete: false,
            should_quit: false,
            cancel,
        }
    }

    /// Run the view until the user quits
    pub async fn run(&mut self, rx: UnboundedReceiver<StatusEvent>) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app(&mut terminal, rx).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn run_app<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut rx: UnboundedReceiver<StatusEvent>,
    ) -> Result<()> {
        let mut events = EventStream::new();
        let mut channel_open = true;

        while !self.should_quit {
            terminal.draw(|f| self.ui(f))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                received = rx.recv(), if channel_open => {
                    channel_open = received.is_some();
                    self.receive(received);
                }
            }
        }

        Ok(())
    }

    /// Apply one channel message; `None` means every worker is done
    fn receive(&mut self, received: Option<StatusEvent>) {
        match received {
            Some(event) => self.apply(event),
            None => self.finish(),
        }
    }

    fn apply(&mut self, event: StatusEvent) {
        match event {
            StatusEvent::Status { at, line } => {
                self.recent.push_back((at, line));
                if self.recent.len() > MAX_RECENT_LINES {
                    self.recent.pop_front();
                }
            }
            StatusEvent::Progress => {
                self.completed += 1;
                self.status_message = format!(
                    "Processing... {}% ({}/{}) | Press 'q' to cancel",
                    self.percent(),
                    self.completed,
                    self.total
                );
            }
        }
    }

    fn finish(&mut self) {
        if self.is_complete {
            return;
        }
        self.is_complete = true;
        self.status_message = if self.cancel.is_cancelled() {
            format!(
                "Cancelled after {}/{} profiles | Press 'q' to quit",
                self.completed, self.total
            )
        } else {
            format!(
                "Complete! Processed: {} | Press 'q' to quit",
                self.completed
            )
        };
    }

    fn percent(&self) -> u16 {
        if self.total > 0 {
            ((self.completed.min(self.total) as f64 / self.total as f64) * 100.0) as u16
        } else {
            100
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Raw mode turns Ctrl-C into a key press instead of a signal
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }
        self.handle_input(key.code);
    }

    fn quit(&mut self) {
        if !self.is_complete {
            self.cancel.cancel();
        }
        self.should_quit = true;
    }

    fn handle_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Down => {
                let i = match self.list_state.selected() {
                    Some(i) if i + 1 < self.recent.len() => i + 1,
                    _ => 0,
                };
                self.list_state.select(Some(i));
            }
            KeyCode::Up => {
                let i = match self.list_state.selected() {
                    Some(0) | None => self.recent.len().saturating_sub(1),
                    Some(i) => i - 1,
                };
                self.list_state.select(Some(i));
            }
            _ => {}
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Progress bar
                Constraint::Min(0),    // Status lines
                Constraint::Length(3), // Status bar
            ])
            .split(f.size());

        let title = Paragraph::new("Inventory Valuation")
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        let progress_label = format!("{}/{} ({}%)", self.completed, self.total, self.percent());
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Processing URLs"))
            .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
            .percent(self.percent())
            .label(progress_label);
        f.render_widget(gauge, chunks[1]);

        let items: Vec<ListItem> = self
            .recent
            .iter()
            .rev() // Show newest first
            .map(|(at, line)| {
                ListItem::new(format!("{} {}", at.format("%H:%M:%S"), line))
                    .style(Style::default().fg(Color::Yellow))
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Status ({})", self.recent.len())),
            )
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, chunks[2], &mut self.list_state);

        let status = Paragraph::new(self.status_message.clone())
            .style(if self.is_complete {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Yellow)
            })
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(status, chunks[3]);
    }
}
