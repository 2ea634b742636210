//! Virtual machine list and detail views

use super::{
    ViewContext, clamp_selection, fetch_cached, pane_block, poll_fetch, render_list, step_list,
};
use crate::cache::keys;
use crate::provider::{VirtualMachineDetail, VirtualMachineInfo};
use crate::tui::error::NavError;
use crate::tui::node::{ActionOutcome, StatusUpdate, ViewNode};
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::{ListState, Paragraph};
use std::sync::Arc;
use tokio::sync::oneshot;

pub struct VirtualMachineListView {
    ctx: ViewContext,
    subscription_id: String,
    resource_group: String,
    items: Vec<VirtualMachineInfo>,
    visible: Vec<usize>,
    filter: String,
    list_state: ListState,
    loading: bool,
    rx: Option<oneshot::Receiver<Result<Vec<VirtualMachineInfo>>>>,
}

impl VirtualMachineListView {
    pub fn new(ctx: ViewContext, subscription_id: String, resource_group: String) -> Self {
        let mut view = Self {
            ctx,
            subscription_id,
            resource_group,
            items: Vec::new(),
            visible: Vec::new(),
            filter: String::new(),
            list_state: ListState::default(),
            loading: true,
            rx: None,
        };
        view.spawn_fetch(false);
        view
    }

    fn spawn_fetch(&mut self, invalidate: bool) {
        let cache = Arc::clone(&self.ctx.cache);
        let provider = Arc::clone(&self.ctx.provider);
        let subscription_id = self.subscription_id.clone();
        let resource_group = self.resource_group.clone();
        let key = keys::virtual_machines(&subscription_id, &resource_group);
        if invalidate {
            cache.invalidate_key(&key);
        }

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = fetch_cached(&cache, &key, || async move {
                provider
                    .list_virtual_machines(&subscription_id, &resource_group)
                    .await
            })
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
            .filter(|(_, vm)| filter.is_empty() || vm.name.to_lowercase().contains(&filter))
            .map(|(i, _)| i)
            .collect();
        clamp_selection(&mut self.list_state, self.visible.len());
    }

    fn selected(&self) -> Option<&VirtualMachineInfo> {
        self.list_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .map(|&i| &self.items[i])
    }
}

impl ViewNode for VirtualMachineListView {
    fn kind(&self) -> &'static str {
        "VirtualMachineListView"
    }

    fn call_action(&mut self, operation: &str) -> Result<ActionOutcome, NavError> {
        match operation {
            "SpawnVirtualMachineDetailView" => {
                let Some(vm) = self.selected() else {
                    return Ok(ActionOutcome::None);
                };
                Ok(ActionOutcome::replace_at(
                    3,
                    Box::new(VirtualMachineDetailView::new(
                        self.ctx.clone(),
                        self.subscription_id.clone(),
                        self.resource_group.clone(),
                        vm.name.clone(),
                    )),
                ))
            }
            "SpawnVirtualMachineCommandListView" => {
                let Some(vm) = self.selected() else {
                    return Ok(ActionOutcome::None);
                };
                Ok(ActionOutcome::replace_at(
                    3,
                    Box::new(super::VMCommandListView::new(
                        self.ctx.clone(),
                        self.subscription_id.clone(),
                        self.resource_group.clone(),
                        vm.name.clone(),
                    )),
                ))
            }
            "SpawnVirtualMachineSerialConsoleView" => {
                let Some(vm) = self.selected() else {
                    return Ok(ActionOutcome::None);
                };
                // Opening the session can fail synchronously (no az, bad
                // arguments); that failure surfaces as a status message
                // and leaves the stack untouched.
                let session = self
                    .ctx
                    .provider
                    .open_serial_console(&self.subscription_id, &self.resource_group, &vm.name)
                    .map_err(|e| NavError::Fetch(format!("failed to open serial console: {}", e)))?;
                Ok(ActionOutcome::replace_at(
                    3,
                    Box::new(super::SerialConsoleView::new(
                        vm.name.clone(),
                        session,
                        self.ctx.console_buffer,
                    )),
                ))
            }
            "RefreshVirtualMachineList" => {
                self.spawn_fetch(true);
                Ok(ActionOutcome::None)
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
                Some((
                    format!(
                        "failed to load virtual machines in {}: {}",
                        self.resource_group, e
                    ),
                    true,
                ))
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
        "Virtual Machines (F3)".to_string()
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, focused: bool) {
        let rows: Vec<(String, String)> = self
            .visible
            .iter()
            .map(|&i| (self.items[i].name.clone(), self.items[i].location.clone()))
            .collect();
        render_list(
            frame,
            area,
            self.title(),
            focused,
            self.loading,
            &rows,
            "no VMs in resource group",
            &mut self.list_state,
        );
    }
}

/// Detail panel for a single virtual machine, fetched on mount
pub struct VirtualMachineDetailView {
    vm_name: String,
    lines: Vec<String>,
    loading: bool,
    rx: Option<oneshot::Receiver<Result<VirtualMachineDetail>>>,
}

impl VirtualMachineDetailView {
    pub fn new(
        ctx: ViewContext,
        subscription_id: String,
        resource_group: String,
        vm_name: String,
    ) -> Self {
        let provider = Arc::clone(&ctx.provider);
        let name = vm_name.clone();
        let (tx, rx) = oneshot::channel();
        // Details change with power state, so they bypass the cache.
        tokio::spawn(async move {
            let result = provider
                .virtual_machine_detail(&subscription_id, &resource_group, &name)
                .await;
            let _ = tx.send(result);
        });

        Self {
            vm_name,
            lines: Vec::new(),
            loading: true,
            rx: Some(rx),
        }
    }
}

impl ViewNode for VirtualMachineDetailView {
    fn kind(&self) -> &'static str {
        "VirtualMachineDetailView"
    }

    fn call_action(&mut self, operation: &str) -> Result<ActionOutcome, NavError> {
        Err(NavError::ActionNotFound {
            kind: self.kind(),
            operation: operation.to_string(),
        })
    }

    fn poll(&mut self) -> Option<StatusUpdate> {
        match poll_fetch(&mut self.rx)? {
            Ok(detail) => {
                self.loading = false;
                self.lines = vec![
                    format!("VM Name:     {}", detail.name),
                    format!("Resource ID: {}", detail.id),
                    format!("Location:    {}", detail.location),
                    format!("OS:          {}", detail.os),
                ];
                None
            }
            Err(e) => {
                self.loading = false;
                self.lines = vec![format!("failed to load detail: {}", e)];
                Some((format!("failed to load VM {}: {}", self.vm_name, e), true))
            }
        }
    }

    fn title(&self) -> String {
        format!("{} Details (F4)", self.vm_name)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, focused: bool) {
        let block = pane_block(self.title(), focused);
        let text = if self.loading {
            "Loading...".to_string()
        } else {
            self.lines.join("\n")
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}
