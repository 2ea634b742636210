//! Resource group list for one subscription

use super::{
    ViewContext, clamp_selection, fetch_cached, poll_fetch, render_list, step_list,
};
use crate::cache::keys;
use crate::provider::ResourceGroupInfo;
use crate::tui::error::NavError;
use crate::tui::node::{ActionOutcome, StatusUpdate, ViewNode};
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::sync::Arc;
use tokio::sync::oneshot;

pub struct ResourceGroupListView {
    ctx: ViewContext,
    subscription_id: String,
    subscription_name: String,
    items: Vec<ResourceGroupInfo>,
    visible: Vec<usize>,
    filter: String,
    list_state: ListState,
    loading: bool,
    rx: Option<oneshot::Receiver<Result<Vec<ResourceGroupInfo>>>>,
}

impl ResourceGroupListView {
    pub fn new(ctx: ViewContext, subscription_id: String, subscription_name: String) -> Self {
        let mut view = Self {
            ctx,
            subscription_id,
            subscription_name,
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
        let key = keys::resource_groups(&subscription_id);
        if invalidate {
            cache.invalidate_key(&key);
        }

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = fetch_cached(&cache, &key, || async move {
                provider.list_resource_groups(&subscription_id).await
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
            .filter(|(_, g)| filter.is_empty() || g.name.to_lowercase().contains(&filter))
            .map(|(i, _)| i)
            .collect();
        clamp_selection(&mut self.list_state, self.visible.len());
    }

    fn selected(&self) -> Option<&ResourceGroupInfo> {
        self.list_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .map(|&i| &self.items[i])
    }
}

impl ViewNode for ResourceGroupListView {
    fn kind(&self) -> &'static str {
        "ResourceGroupListView"
    }

    fn call_action(&mut self, operation: &str) -> Result<ActionOutcome, NavError> {
        match operation {
            "SpawnResourceTypeListView" => {
                let Some(group) = self.selected() else {
                    return Ok(ActionOutcome::None);
                };
                Ok(ActionOutcome::replace_at(
                    2,
                    Box::new(super::ResourceTypeListView::new(
                        self.ctx.clone(),
                        self.subscription_id.clone(),
                        group.name.clone(),
                    )),
                ))
            }
            "SpawnVirtualMachineListView" => {
                let Some(group) = self.selected() else {
                    return Ok(ActionOutcome::None);
                };
                Ok(ActionOutcome::replace_at(
                    2,
                    Box::new(super::VirtualMachineListView::new(
                        self.ctx.clone(),
                        self.subscription_id.clone(),
                        group.name.clone(),
                    )),
                ))
            }
            "SpawnAKSClusterListView" => {
                let Some(group) = self.selected() else {
                    return Ok(ActionOutcome::None);
                };
                Ok(ActionOutcome::replace_at(
                    2,
                    Box::new(super::AKSClusterListView::new(
                        self.ctx.clone(),
                        self.subscription_id.clone(),
                        group.name.clone(),
                    )),
                ))
            }
            "RefreshResourceGroupList" => {
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
                        "failed to load resource groups for {}: {}",
                        self.subscription_name, e
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
        "Resource Groups (F2)".to_string()
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
            "no resource groups",
            &mut self.list_state,
        );
    }
}
