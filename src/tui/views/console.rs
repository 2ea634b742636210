//! Live serial-console panel
//!
//! Owns a [`ConsoleSession`] for the life of its stack entry. Teardown
//! (an ancestor picked a different resource, or the app exits) closes the
//! session, which stops the provider's reader task and its connection.

use super::pane_block;
use crate::provider::ConsoleSession;
use crate::tui::error::NavError;
use crate::tui::node::{ActionOutcome, StatusUpdate, ViewNode};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;
use std::collections::VecDeque;

/// Max lines drained per event-loop tick, so a chatty console cannot
/// starve rendering.
const MAX_LINES_PER_POLL: usize = 256;

pub struct SerialConsoleView {
    vm_name: String,
    session: Option<ConsoleSession>,
    lines: VecDeque<String>,
    buffer: usize,
    ended_reported: bool,
}

impl SerialConsoleView {
    pub fn new(vm_name: String, session: ConsoleSession, buffer: usize) -> Self {
        Self {
            vm_name,
            session: Some(session),
            lines: VecDeque::new(),
            buffer: buffer.max(1),
            ended_reported: false,
        }
    }
}

impl ViewNode for SerialConsoleView {
    fn kind(&self) -> &'static str {
        "SerialConsoleView"
    }

    fn call_action(&mut self, operation: &str) -> Result<ActionOutcome, NavError> {
        Err(NavError::ActionNotFound {
            kind: self.kind(),
            operation: operation.to_string(),
        })
    }

    fn poll(&mut self) -> Option<StatusUpdate> {
        let session = self.session.as_mut()?;

        for _ in 0..MAX_LINES_PER_POLL {
            match session.try_recv() {
                Some(line) => {
                    if self.lines.len() == self.buffer {
                        self.lines.pop_front();
                    }
                    self.lines.push_back(line);
                }
                None => break,
            }
        }

        if session.is_finished() && !self.ended_reported {
            self.ended_reported = true;
            return Some((format!("console stream for {} ended", self.vm_name), false));
        }
        None
    }

    fn title(&self) -> String {
        format!("{} Console (F4)", self.vm_name)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, focused: bool) {
        let block = pane_block(self.title(), focused);
        // Follow the tail: show the newest lines that fit the pane.
        let visible = (area.height as usize).saturating_sub(2).max(1);
        let text = self
            .lines
            .iter()
            .skip(self.lines.len().saturating_sub(visible))
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn teardown(&mut self) -> Result<(), NavError> {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        Ok(())
    }
}

impl Drop for SerialConsoleView {
    fn drop(&mut self) {
        // Teardown normally runs first; this covers app exit.
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }
}
