//! The view node contract
//!
//! Every mounted panel (list, detail, console) implements [`ViewNode`].
//! A node declares its own kind as an explicit tag; which actions apply to
//! it is decided entirely by registry lookup against that tag.

use super::error::NavError;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

/// Status surface update: (message, is_error)
pub type StatusUpdate = (String, bool);

/// A request to mount a new node produced by an action
pub struct MountRequest {
    pub node: Box<dyn ViewNode>,
    /// Stack position to truncate to before appending, for actions that
    /// replace a sibling at the same depth.
    pub truncate_to: Option<usize>,
}

/// The result of invoking a view operation
pub enum ActionOutcome {
    /// Side effect only; no navigation change.
    None,
    /// Mount a new node at the end of the stack.
    Mount(MountRequest),
}

impl ActionOutcome {
    /// Append a node without disturbing existing entries.
    pub fn mount(node: Box<dyn ViewNode>) -> Self {
        Self::Mount(MountRequest {
            node,
            truncate_to: None,
        })
    }

    /// Truncate the stack to `index`, then append the node there.
    pub fn replace_at(index: usize, node: Box<dyn ViewNode>) -> Self {
        Self::Mount(MountRequest {
            node,
            truncate_to: Some(index),
        })
    }
}

/// One mounted panel in the navigation stack
pub trait ViewNode {
    /// Stable identity tag used to select applicable action rows.
    fn kind(&self) -> &'static str;

    /// Invoke a configured operation by name.
    ///
    /// Unknown names return [`NavError::ActionNotFound`]; the engine logs
    /// them once and otherwise ignores the keypress.
    fn call_action(&mut self, operation: &str) -> Result<ActionOutcome, NavError>;

    /// Runs before registry lookup; return `None` to consume the event.
    fn pre_handle(&mut self, event: KeyEvent) -> Option<KeyEvent> {
        Some(event)
    }

    /// Default widget behavior for events no action row claimed
    /// (list scrolling and the like).
    fn handle_default(&mut self, _event: &KeyEvent) {}

    /// Drain async results on the input thread. Called once per event-loop
    /// tick; returns a status update when something worth reporting
    /// happened.
    fn poll(&mut self) -> Option<StatusUpdate> {
        None
    }

    /// Apply the shared filter text to this node's visible items.
    fn apply_filter(&mut self, _filter: &str) {}

    /// Title for the pane border.
    fn title(&self) -> String;

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, focused: bool);

    /// Detach owned background resources before removal from the stack.
    fn teardown(&mut self) -> Result<(), NavError> {
        Ok(())
    }
}
