//! Runnable `az vm` commands for a selected virtual machine

use super::{
    ViewContext, clamp_selection, fetch_cached, poll_fetch, render_list, step_list,
};
use crate::cache::keys;
use crate::provider::VmCommand;
use crate::tui::error::NavError;
use crate::tui::node::{ActionOutcome, StatusUpdate, ViewNode};
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::sync::Arc;
use tokio::sync::oneshot;

pub struct VMCommandListView {
    ctx: ViewContext,
    subscription_id: String,
    resource_group: String,
    vm_name: String,
    items: Vec<VmCommand>,
    visible: Vec<usize>,
    filter: String,
    list_state: ListState,
    loading: bool,
    rx: Option<oneshot::Receiver<Result<Vec<VmCommand>>>>,
}

impl VMCommandListView {
    pub fn new(
        ctx: ViewContext,
        subscription_id: String,
        resource_group: String,
        vm_name: String,
    ) -> Self {
        let mut view = Self {
            ctx,
            subscription_id,
            resource_group,
            vm_name,
            items: Vec::new(),
            visible: Vec::new(),
            filter: String::new(),
            list_state: ListState::default(),
            loading: true,
            rx: None,
        };
        view.spawn_fetch();
        view
    }

    fn spawn_fetch(&mut self) {
        let cache = Arc::clone(&self.ctx.cache);
        let provider = Arc::clone(&self.ctx.provider);
        let key = keys::vm_commands();

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result =
                fetch_cached(&cache, &key, || async move { provider.list_vm_commands().await })
                    .await;
            let _ = tx.send(result);
        });

        self.loading = true;
        self.rx = Some(rx);
    }

    fn rebuild_visible(&mut self) {
        let filter = self.filter.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, c)| filter.is_empty() || c.name.to_lowercase().contains(&filter))
            .map(|(i, _)| i)
            .collect();
        clamp_selection(&mut self.list_state, self.visible.len());
    }

    fn selected(&self) -> Option<&VmCommand> {
        self.list_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .map(|&i| &self.items[i])
    }
}

impl ViewNode for VMCommandListView {
    fn kind(&self) -> &'static str {
        "VMCommandListView"
    }

    fn call_action(&mut self, operation: &str) -> Result<ActionOutcome, NavError> {
        match operation {
            "RunSelectedCommand" => {
                let Some(command) = self.selected() else {
                    return Ok(ActionOutcome::None);
                };
                let args = vec![
                    "vm".to_string(),
                    command.name.clone(),
                    "-g".to_string(),
                    self.resource_group.clone(),
                    "-n".to_string(),
                    self.vm_name.clone(),
                    "--subscription".to_string(),
                    self.subscription_id.clone(),
                ];
                Ok(ActionOutcome::replace_at(
                    4,
                    Box::new(super::CommandOutputView::spawn(
                        self.ctx.clone(),
                        format!("az vm {}", command.name),
                        args,
                    )),
                ))
            }
            _ => Err(NavError::ActionNotFound {
                kind: self.kind(),
                operation: operation.to_string(),
            }),
        }
    }

    fn poll(&mut self) -> Option<StatusUpdate> {
        match poll_fetch(&mut self.rx)? {
            Ok(items) => {
                self.loading = false;
                self.items = items;
                self.rebuild_visible();
                None
            }
            Err(e) => {
                self.loading = false;
                Some((format!("failed to load VM commands: {}", e), true))
            }
        }
    }

    fn apply_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.rebuild_visible();
    }

    fn handle_default(&mut self, event: &KeyEvent) {
        step_list(&mut self.list_state, self.visible.len(), event);
    }

    fn title(&self) -> String {
        format!("{} Commands (F4)", self.vm_name)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, focused: bool) {
        let rows: Vec<(String, String)> = self
            .visible
            .iter()
            .map(|&i| {
                (
                    self.items[i].name.clone(),
                    self.items[i].description.clone(),
                )
            })
            .collect();
        render_list(
            frame,
            area,
            self.title(),
            focused,
            self.loading,
            &rows,
            "no commands",
            &mut self.list_state,
        );
    }
}
