//! Navigation stack and dispatch engine
//!
//! The stack is an ordered sequence of mounted view nodes: entry 0 is the
//! root, and every later entry was produced by an action on its
//! predecessor. Dispatch runs synchronously on the single input thread,
//! so stack mutation needs no locking; anything slow happens on spawned
//! tasks whose results come back through each node's `poll`.

use super::error::NavError;
use super::key::KeyTrigger;
use super::node::{ActionOutcome, StatusUpdate, ViewNode};
use super::registry::ActionRegistry;
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::HashSet;

/// View kind for application-level bindings (quit, focus switching).
pub const APP_KIND: &str = "App";

/// A mounted node plus the layout attributes it was mounted with
pub struct StackEntry {
    pub node: Box<dyn ViewNode>,
    pub width: u16,
    pub take_focus: bool,
}

/// Ordered sequence of mounted views with a focus index and the shared
/// filter-text buffer
#[derive(Default)]
pub struct NavigationStack {
    entries: Vec<StackEntry>,
    focused: usize,
    filter: String,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [StackEntry] {
        &mut self.entries
    }

    pub fn focused_node_mut(&mut self) -> Option<&mut (dyn ViewNode + '_)> {
        let entry = self.entries.get_mut(self.focused)?;
        Some(entry.node.as_mut())
    }

    /// Append a node; focus moves to it when `take_focus` is set.
    pub fn push(&mut self, node: Box<dyn ViewNode>, take_focus: bool, width: u16) {
        self.entries.push(StackEntry {
            node,
            width,
            take_focus,
        });
        if take_focus {
            self.focused = self.entries.len() - 1;
        }
    }

    /// Remove every entry at position >= `from`, in order, tearing each
    /// one down. Teardown failures are logged and never block removal.
    /// Afterwards the focus sits on the last surviving entry.
    pub fn truncate(&mut self, from: usize) {
        let from = from.min(self.entries.len());
        for mut entry in self.entries.drain(from..) {
            if let Err(e) = entry.node.teardown() {
                tracing::warn!("teardown failed for {}: {}", entry.node.kind(), e);
            }
        }
        self.focused = from.saturating_sub(1);
    }

    /// Move focus to an existing entry. Out-of-range indices are ignored.
    pub fn focus(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.focused = index;
            true
        } else {
            false
        }
    }
}

/// What became of a dispatched key event
#[derive(Debug)]
pub enum Dispatch {
    /// The event was handled; the widget must not see it again.
    Consumed,
    /// An application-level quit binding fired.
    Quit,
    /// No binding claimed the event; it falls through to default widget
    /// behavior.
    Unhandled(KeyEvent),
}

/// Wires registry lookups to input events and manages stack mutation
pub struct NavigationEngine {
    registry: ActionRegistry,
    stack: NavigationStack,
    filter_mode: bool,
    status: Option<StatusUpdate>,
    /// (kind, operation) pairs already reported as missing, so a
    /// misconfigured binding logs once rather than on every keypress.
    missing_logged: HashSet<(String, String)>,
}

impl NavigationEngine {
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry,
            stack: NavigationStack::new(),
            filter_mode: false,
            status: None,
            missing_logged: HashSet::new(),
        }
    }

    /// Mount the bootstrap view at position 0.
    pub fn mount_root(&mut self, node: Box<dyn ViewNode>) {
        self.stack.push(node, true, 1);
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut NavigationStack {
        &mut self.stack
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn filter_mode(&self) -> bool {
        self.filter_mode
    }

    /// Take the pending status update, if an action produced one.
    pub fn take_status(&mut self) -> Option<StatusUpdate> {
        self.status.take()
    }

    /// Truncate the stack and reapply focus/filter bookkeeping.
    pub fn truncate(&mut self, from: usize) {
        self.stack.truncate(from);
        self.clear_filter();
    }

    /// Dispatch one key event.
    ///
    /// Order mirrors the application-level input capture of the original
    /// layout: filter editing, then app-scoped bindings, then the focused
    /// node (pre-handler → registry lookup → operation call).
    pub fn dispatch(&mut self, event: KeyEvent) -> Dispatch {
        if self.filter_mode {
            return self.handle_filter_key(event);
        }

        let trigger = KeyTrigger::from_event(&event);
        if let Some(row) = self.registry.lookup(APP_KIND, trigger) {
            let operation = row.operation.clone();
            return self.run_app_action(&operation);
        }

        if self.stack.is_empty() {
            return Dispatch::Unhandled(event);
        }

        // Pre-handler and operation call borrow the focused node; the
        // registry is a disjoint field, so the row lookup can happen
        // while the node is held.
        let focused = self.stack.focused_index();
        let (kind, row, outcome) = {
            let entry = &mut self.stack.entries[focused];
            let node = entry.node.as_mut();

            let Some(event) = node.pre_handle(event) else {
                return Dispatch::Consumed;
            };

            let trigger = KeyTrigger::from_event(&event);
            let kind = node.kind();
            let Some(row) = self.registry.lookup(kind, trigger) else {
                return Dispatch::Unhandled(event);
            };
            let row = row.clone();
            let outcome = node.call_action(&row.operation);
            (kind, row, outcome)
        };

        match outcome {
            Ok(ActionOutcome::None) => Dispatch::Consumed,
            Ok(ActionOutcome::Mount(request)) => {
                if let Some(position) = request.truncate_to {
                    self.stack.truncate(position);
                }
                self.stack.push(request.node, row.take_focus, row.width);
                self.clear_filter();
                Dispatch::Consumed
            }
            Err(NavError::ActionNotFound { kind, operation }) => {
                if self.missing_logged.insert((kind.to_string(), operation.clone())) {
                    tracing::warn!("operation {:?} is not registered for {}", operation, kind);
                }
                Dispatch::Consumed
            }
            Err(e) => {
                // The stack and focus are exactly as they were before the
                // keypress; only the status surface changes.
                tracing::warn!("action {} on {} failed: {}", row.operation, kind, e);
                self.status = Some((e.to_string(), true));
                Dispatch::Consumed
            }
        }
    }

    /// Forward an unclaimed event to the focused node's default behavior.
    pub fn handle_default(&mut self, event: &KeyEvent) {
        if let Some(node) = self.stack.focused_node_mut() {
            node.handle_default(event);
        }
    }

    /// Poll every mounted node for async results, collecting status updates.
    pub fn poll(&mut self) -> Vec<StatusUpdate> {
        let mut updates = Vec::new();
        for entry in self.stack.entries_mut() {
            if let Some(update) = entry.node.poll() {
                updates.push(update);
            }
        }
        updates
    }

    /// Action bar text: the focused view's bindings, then the app-level ones.
    pub fn action_bar_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(entry) = self.stack.entries().get(self.stack.focused_index()) {
            for action in self.registry.actions_for(entry.node.kind()) {
                parts.push(format!("{}({})", action.display_name(), action.trigger.label()));
            }
        }
        for action in self.registry.actions_for(APP_KIND) {
            parts.push(format!("{}({})", action.display_name(), action.trigger.label()));
        }
        parts.join(" | ")
    }

    fn run_app_action(&mut self, operation: &str) -> Dispatch {
        match operation {
            "Quit" => Dispatch::Quit,
            "FocusFilter" => {
                self.filter_mode = true;
                Dispatch::Consumed
            }
            _ => {
                if let Some(index) = operation.strip_prefix("FocusView") {
                    match index.parse::<usize>() {
                        Ok(index) => {
                            if self.stack.focus(index) {
                                self.clear_filter();
                            }
                        }
                        Err(_) => self.log_missing_once(operation),
                    }
                } else {
                    self.log_missing_once(operation);
                }
                Dispatch::Consumed
            }
        }
    }

    fn log_missing_once(&mut self, operation: &str) {
        if self
            .missing_logged
            .insert((APP_KIND.to_string(), operation.to_string()))
        {
            tracing::warn!("operation {:?} is not registered for {}", operation, APP_KIND);
        }
    }

    fn handle_filter_key(&mut self, event: KeyEvent) -> Dispatch {
        match event.code {
            KeyCode::Enter => {
                self.filter_mode = false;
            }
            KeyCode::Esc => {
                self.filter_mode = false;
                self.stack.filter.clear();
                self.apply_filter();
            }
            KeyCode::Backspace => {
                self.stack.filter.pop();
                self.apply_filter();
            }
            KeyCode::Char(c) => {
                self.stack.filter.push(c);
                self.apply_filter();
            }
            _ => {}
        }
        Dispatch::Consumed
    }

    /// Focus moved or the stack changed shape: the filter starts over.
    fn clear_filter(&mut self) {
        if !self.stack.filter.is_empty() {
            self.stack.filter.clear();
            for entry in self.stack.entries_mut() {
                entry.node.apply_filter("");
            }
        }
    }

    fn apply_filter(&mut self) {
        let filter = self.stack.filter.clone();
        if let Some(node) = self.stack.focused_node_mut() {
            node.apply_filter(&filter);
        }
    }
}
