//! Application chrome and per-event orchestration
//!
//! Owns the navigation engine plus the surrounding furniture: title bar,
//! filter line, status surface with timeout-based auto-clear, and the
//! action bar derived from the focused view's configured bindings.

use super::navigation::{Dispatch, NavigationEngine};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use std::time::{Duration, Instant};

/// How long a status message stays visible.
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Main application state
pub struct App {
    engine: NavigationEngine,
    status_message: Option<(String, bool)>,
    status_message_time: Option<Instant>,
    should_quit: bool,
}

impl App {
    pub fn new(engine: NavigationEngine) -> Self {
        Self {
            engine,
            status_message: None,
            status_message_time: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn engine(&self) -> &NavigationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut NavigationEngine {
        &mut self.engine
    }

    /// Handle one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl-C always exits, regardless of configured bindings.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.engine.dispatch(key) {
            Dispatch::Quit => self.should_quit = true,
            Dispatch::Consumed => {}
            Dispatch::Unhandled(event) => self.engine.handle_default(&event),
        }

        if let Some(status) = self.engine.take_status() {
            self.set_status_message(status);
        }
    }

    /// Per-tick maintenance: drain async results, expire status messages.
    pub fn tick(&mut self) {
        for status in self.engine.poll() {
            self.set_status_message(status);
        }

        if let Some(set_at) = self.status_message_time {
            if set_at.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn set_status_message(&mut self, status: (String, bool)) {
        self.status_message = Some(status);
        self.status_message_time = Some(Instant::now());
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let [title_area, filter_area, main_area, status_area, action_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let title = Line::from(vec![
            Span::styled(
                "az9s",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" :: Azure tenant browser"),
        ]);
        frame.render_widget(Paragraph::new(title), title_area);

        let filter_style = if self.engine.filter_mode() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let filter_text = format!(
            "(F10) Filter: {}{}",
            self.engine.stack().filter(),
            if self.engine.filter_mode() { "_" } else { "" }
        );
        frame.render_widget(Paragraph::new(filter_text).style(filter_style), filter_area);

        self.render_stack(frame, main_area);

        let status_line = match &self.status_message {
            Some((message, is_error)) => {
                let color = if *is_error { Color::Red } else { Color::Green };
                Line::styled(message.clone(), Style::default().fg(color))
            }
            None => Line::raw(format!(
                "Status: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            )),
        };
        frame.render_widget(Paragraph::new(status_line), status_area);

        frame.render_widget(
            Paragraph::new(self.engine.action_bar_text())
                .style(Style::default().fg(Color::DarkGray)),
            action_area,
        );
    }

    fn render_stack(&mut self, frame: &mut Frame<'_>, area: ratatui::layout::Rect) {
        let focused = self.engine.stack().focused_index();
        let widths: Vec<Constraint> = self
            .engine
            .stack()
            .entries()
            .iter()
            .map(|entry| Constraint::Fill(entry.width.max(1)))
            .collect();
        if widths.is_empty() {
            return;
        }

        let areas = Layout::horizontal(widths).split(area);
        for (i, entry) in self.engine.stack_mut().entries_mut().iter_mut().enumerate() {
            entry.node.render(frame, areas[i], i == focused);
        }
    }
}
