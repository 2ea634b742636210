//! Subscription list view, the root of the navigation stack

use super::{
    ViewContext, clamp_selection, fetch_cached, poll_fetch, render_list, step_list,
};
use crate::cache::keys;
use crate::provider::SubscriptionInfo;
use crate::tui::error::NavError;
use crate::tui::node::{ActionOutcome, StatusUpdate, ViewNode};
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::sync::Arc;
use tokio::sync::oneshot;

pub struct SubscriptionListView {
    ctx: ViewContext,
    items: Vec<SubscriptionInfo>,
    visible: Vec<usize>,
    filter: String,
    list_state: ListState,
    loading: bool,
    rx: Option<oneshot::Receiver<Result<Vec<SubscriptionInfo>>>>,
}

impl SubscriptionListView {
    pub fn new(ctx: ViewContext) -> Self {
        let mut view = Self {
            ctx,
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
        let key = keys::subscriptions();
        if invalidate {
            cache.invalidate_key(&key);
        }

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = fetch_cached(&cache, &key, || async move {
                provider.list_subscriptions().await
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
            .filter(|(_, s)| filter.is_empty() || s.name.to_lowercase().contains(&filter))
            .map(|(i, _)| i)
            .collect();
        clamp_selection(&mut self.list_state, self.visible.len());
    }

    fn selected(&self) -> Option<&SubscriptionInfo> {
        self.list_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .map(|&i| &self.items[i])
    }

    #[cfg(test)]
    pub(crate) fn is_loading(&self) -> bool {
        self.loading
    }

    #[cfg(test)]
    pub(crate) fn item_names(&self) -> Vec<&str> {
        self.visible
            .iter()
            .map(|&i| self.items[i].name.as_str())
            .collect()
    }
}

impl ViewNode for SubscriptionListView {
    fn kind(&self) -> &'static str {
        "SubscriptionListView"
    }

    fn call_action(&mut self, operation: &str) -> Result<ActionOutcome, NavError> {
        match operation {
            "SpawnResourceGroupListView" => {
                let Some(subscription) = self.selected() else {
                    return Ok(ActionOutcome::None);
                };
                Ok(ActionOutcome::replace_at(
                    1,
                    Box::new(super::ResourceGroupListView::new(
                        self.ctx.clone(),
                        subscription.id.clone(),
                        subscription.name.clone(),
                    )),
                ))
            }
            "RefreshSubscriptionList" => {
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
                Some((format!("failed to load subscriptions: {}", e), true))
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
        "Subscriptions (F1)".to_string()
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, focused: bool) {
        let rows: Vec<(String, String)> = self
            .visible
            .iter()
            .map(|&i| (self.items[i].name.clone(), self.items[i].id.clone()))
            .collect();
        render_list(
            frame,
            area,
            self.title(),
            focused,
            self.loading,
            &rows,
            "no subscriptions",
            &mut self.list_state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResourceCache;
    use crate::provider::MockResourceProvider;
    use std::time::Duration;

    fn test_ctx(provider: MockResourceProvider) -> ViewContext {
        ViewContext {
            cache: Arc::new(ResourceCache::new(Duration::from_secs(60))),
            provider: Arc::new(provider),
            console_buffer: 100,
        }
    }

    async fn settle(view: &mut SubscriptionListView) -> Option<StatusUpdate> {
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let status = view.poll();
            if !view.is_loading() {
                return status;
            }
        }
        panic!("view never finished loading");
    }

    #[tokio::test]
    async fn test_loads_subscriptions_through_cache() {
        let mut provider = MockResourceProvider::new();
        provider.expect_list_subscriptions().times(1).returning(|| {
            Ok(vec![
                SubscriptionInfo {
                    id: "sub-a".to_string(),
                    name: "Production".to_string(),
                },
                SubscriptionInfo {
                    id: "sub-b".to_string(),
                    name: "Staging".to_string(),
                },
            ])
        });

        let mut view = SubscriptionListView::new(test_ctx(provider));
        let status = settle(&mut view).await;

        assert!(status.is_none());
        assert_eq!(view.item_names(), vec!["Production", "Staging"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_status() {
        let mut provider = MockResourceProvider::new();
        provider
            .expect_list_subscriptions()
            .times(1)
            .returning(|| anyhow::bail!("not logged in"));

        let mut view = SubscriptionListView::new(test_ctx(provider));
        let status = settle(&mut view).await;

        let (message, is_error) = status.expect("failure should surface a status");
        assert!(is_error);
        assert!(message.contains("not logged in"));
        assert!(view.item_names().is_empty());
    }

    #[tokio::test]
    async fn test_filter_narrows_visible_items() {
        let mut provider = MockResourceProvider::new();
        provider.expect_list_subscriptions().returning(|| {
            Ok(vec![
                SubscriptionInfo {
                    id: "sub-a".to_string(),
                    name: "Production".to_string(),
                },
                SubscriptionInfo {
                    id: "sub-b".to_string(),
                    name: "Staging".to_string(),
                },
            ])
        });

        let mut view = SubscriptionListView::new(test_ctx(provider));
        settle(&mut view).await;

        view.apply_filter("prod");
        assert_eq!(view.item_names(), vec!["Production"]);
        view.apply_filter("");
        assert_eq!(view.item_names().len(), 2);
    }
}
