//! Per-collection views
//!
//! Each view owns its fetched items, its filtered index set, and the
//! oneshot receiver for its in-flight fetch. Views mount in a loading
//! state and resolve on the event-loop thread through `poll`; nothing
//! blocks dispatch on network I/O.

mod aks_clusters;
mod console;
mod resource_groups;
mod resource_types;
mod resources;
mod subscriptions;
mod text;
mod virtual_machines;
mod vm_commands;

pub use aks_clusters::AKSClusterListView;
pub use console::SerialConsoleView;
pub use resource_groups::ResourceGroupListView;
pub use resource_types::ResourceTypeListView;
pub use resources::ResourceListView;
pub use subscriptions::SubscriptionListView;
pub use text::{CommandOutputView, TextPanelView};
pub use virtual_machines::{VirtualMachineDetailView, VirtualMachineListView};
pub use vm_commands::VMCommandListView;

use crate::cache::ResourceCache;
use crate::provider::ResourceProvider;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Shared handles every resource view needs to spawn its fetches
#[derive(Clone)]
pub struct ViewContext {
    pub cache: Arc<ResourceCache>,
    pub provider: Arc<dyn ResourceProvider>,
    pub console_buffer: usize,
}

/// Cache-aside fetch of a typed collection, round-tripped through the
/// opaque JSON payload the cache stores.
pub(crate) async fn fetch_cached<T, F, Fut>(cache: &ResourceCache, key: &str, fetch: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let value = cache
        .get_or_fetch(key, || async move {
            let items = fetch().await?;
            Ok(serde_json::to_value(items)?)
        })
        .await?;
    Ok(serde_json::from_value(value)?)
}

/// Drain a pending fetch result without blocking.
pub(crate) fn poll_fetch<T>(rx: &mut Option<oneshot::Receiver<Result<T>>>) -> Option<Result<T>> {
    let receiver = rx.as_mut()?;
    match receiver.try_recv() {
        Ok(result) => {
            *rx = None;
            Some(result)
        }
        Err(oneshot::error::TryRecvError::Empty) => None,
        Err(oneshot::error::TryRecvError::Closed) => {
            *rx = None;
            Some(Err(anyhow::anyhow!("fetch task dropped before completing")))
        }
    }
}

/// Standard list navigation for events no action row claimed.
pub(crate) fn step_list(state: &mut ListState, len: usize, event: &KeyEvent) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0);
    let next = match event.code {
        KeyCode::Up | KeyCode::Char('k') => current.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => (current + 1).min(len - 1),
        KeyCode::PageUp => current.saturating_sub(10),
        KeyCode::PageDown => (current + 10).min(len - 1),
        KeyCode::Home | KeyCode::Char('g') => 0,
        KeyCode::End | KeyCode::Char('G') => len - 1,
        _ => return,
    };
    state.select(Some(next));
}

/// Keep the selection valid after items or filters changed.
pub(crate) fn clamp_selection(state: &mut ListState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        let selected = state.selected().unwrap_or(0).min(len - 1);
        state.select(Some(selected));
    }
}

pub(crate) fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::bordered().title(title).border_style(border_style)
}

/// Render a two-line-per-item list the way tview shows secondary text.
pub(crate) fn render_list(
    frame: &mut Frame<'_>,
    area: Rect,
    title: String,
    focused: bool,
    loading: bool,
    rows: &[(String, String)],
    empty_label: &str,
    state: &mut ListState,
) {
    let block = pane_block(title, focused);
    if loading {
        frame.render_widget(Paragraph::new("Loading...").block(block), area);
        return;
    }
    if rows.is_empty() {
        frame.render_widget(
            Paragraph::new(format!("({})", empty_label)).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|(primary, secondary)| {
            let mut lines = vec![Line::raw(primary.clone())];
            if !secondary.is_empty() {
                lines.push(Line::styled(
                    secondary.clone(),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Text::from(lines))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, state);
}
