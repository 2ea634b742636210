//! Resource types present in one resource group

use super::{
    ViewContext, clamp_selection, fetch_cached, poll_fetch, render_list, step_list,
};
use crate::cache::keys;
use crate::tui::error::NavError;
use crate::tui::node::{ActionOutcome, StatusUpdate, ViewNode};
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::sync::Arc;
use tokio::sync::oneshot;

pub struct ResourceTypeListView {
    ctx: ViewContext,
    subscription_id: String,
    resource_group: String,
    items: Vec<String>,
    visible: Vec<usize>,
    filter: String,
    list_state: ListState,
    loading: bool,
    rx: Option<oneshot::Receiver<Result<Vec<String>>>>,
}

impl ResourceTypeListView {
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
        view.spawn_fetch();
        view
    }

    fn spawn_fetch(&mut self) {
        let cache = Arc::clone(&self.ctx.cache);
        let provider = Arc::clone(&self.ctx.provider);
        let subscription_id = self.subscription_id.clone();
        let resource_group = self.resource_group.clone();
        let key = keys::resource_types(&subscription_id, &resource_group);

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = fetch_cached(&cache, &key, || async move {
                provider
                    .list_resource_types(&subscription_id, &resource_group)
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
            .filter(|(_, t)| filter.is_empty() || t.to_lowercase().contains(&filter))
            .map(|(i, _)| i)
            .collect();
        clamp_selection(&mut self.list_state, self.visible.len());
    }

    fn selected(&self) -> Option<&String> {
        self.list_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .map(|&i| &self.items[i])
    }
}

impl ViewNode for ResourceTypeListView {
    fn kind(&self) -> &'static str {
        "ResourceTypeListView"
    }

    fn call_action(&mut self, operation: &str) -> Result<ActionOutcome, NavError> {
        match operation {
            "SpawnResourceListView" => {
                let Some(resource_type) = self.selected() else {
                    return Ok(ActionOutcome::None);
                };
                Ok(ActionOutcome::replace_at(
                    3,
                    Box::new(super::ResourceListView::new(
                        self.ctx.clone(),
                        self.subscription_id.clone(),
                        self.resource_group.clone(),
                        resource_type.clone(),
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
                Some((
                    format!(
                        "failed to load resource types for {}: {}",
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
        "Resource Types (F3)".to_string()
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, focused: bool) {
        let rows: Vec<(String, String)> = self
            .visible
            .iter()
            .map(|&i| (self.items[i].clone(), String::new()))
            .collect();
        render_list(
            frame,
            area,
            self.title(),
            focused,
            self.loading,
            &rows,
            "no resources in group",
            &mut self.list_state,
        );
    }
}
