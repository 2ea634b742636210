//! Text panels: static detail views and remote command output

use super::{ViewContext, pane_block, poll_fetch};
use crate::tui::error::NavError;
use crate::tui::node::{ActionOutcome, StatusUpdate, ViewNode};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;
use std::sync::Arc;
use tokio::sync::oneshot;

/// A static, scrollable text panel
pub struct TextPanelView {
    title: String,
    lines: Vec<String>,
    scroll: u16,
}

impl TextPanelView {
    pub fn new(title: String, lines: Vec<String>) -> Self {
        Self {
            title,
            lines,
            scroll: 0,
        }
    }
}

impl ViewNode for TextPanelView {
    fn kind(&self) -> &'static str {
        "TextPanelView"
    }

    fn call_action(&mut self, operation: &str) -> Result<ActionOutcome, NavError> {
        Err(NavError::ActionNotFound {
            kind: self.kind(),
            operation: operation.to_string(),
        })
    }

    fn handle_default(&mut self, event: &KeyEvent) {
        scroll_text(&mut self.scroll, self.lines.len(), event);
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, focused: bool) {
        let block = pane_block(self.title(), focused);
        frame.render_widget(
            Paragraph::new(self.lines.join("\n"))
                .block(block)
                .scroll((self.scroll, 0)),
            area,
        );
    }
}

/// Output panel for one remote command, run on a background task
pub struct CommandOutputView {
    command_label: String,
    lines: Vec<String>,
    scroll: u16,
    running: bool,
    rx: Option<oneshot::Receiver<Result<String>>>,
}

impl CommandOutputView {
    /// Start the command and mount the panel in a running state.
    pub fn spawn(ctx: ViewContext, command_label: String, args: Vec<String>) -> Self {
        let provider = Arc::clone(&ctx.provider);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = provider.run_vm_command(&args).await;
            let _ = tx.send(result);
        });

        Self {
            command_label,
            lines: Vec::new(),
            scroll: 0,
            running: true,
            rx: Some(rx),
        }
    }
}

impl ViewNode for CommandOutputView {
    fn kind(&self) -> &'static str {
        "CommandOutputView"
    }

    fn call_action(&mut self, operation: &str) -> Result<ActionOutcome, NavError> {
        Err(NavError::ActionNotFound {
            kind: self.kind(),
            operation: operation.to_string(),
        })
    }

    fn poll(&mut self) -> Option<StatusUpdate> {
        match poll_fetch(&mut self.rx)? {
            Ok(stdout) => {
                self.running = false;
                self.lines = if stdout.trim().is_empty() {
                    vec!["Command executed successfully".to_string()]
                } else {
                    stdout.lines().map(str::to_string).collect()
                };
                Some((format!("{} completed", self.command_label), false))
            }
            Err(e) => {
                self.running = false;
                self.lines = format!("Command execution failed with error: {}", e)
                    .lines()
                    .map(str::to_string)
                    .collect();
                Some((format!("{} failed", self.command_label), true))
            }
        }
    }

    fn handle_default(&mut self, event: &KeyEvent) {
        scroll_text(&mut self.scroll, self.lines.len(), event);
    }

    fn title(&self) -> String {
        "Command Output (F5)".to_string()
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, focused: bool) {
        let block = pane_block(self.title(), focused);
        let text = if self.running {
            format!("Running {}...", self.command_label)
        } else {
            self.lines.join("\n")
        };
        frame.render_widget(
            Paragraph::new(text).block(block).scroll((self.scroll, 0)),
            area,
        );
    }
}

fn scroll_text(scroll: &mut u16, len: usize, event: &KeyEvent) {
    let max = len.min(u16::MAX as usize) as u16;
    *scroll = match event.code {
        KeyCode::Up | KeyCode::Char('k') => scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => scroll.saturating_add(1).min(max),
        KeyCode::PageUp => scroll.saturating_sub(10),
        KeyCode::PageDown => scroll.saturating_add(10).min(max),
        KeyCode::Home | KeyCode::Char('g') => 0,
        KeyCode::End | KeyCode::Char('G') => max,
        _ => return,
    };
}
