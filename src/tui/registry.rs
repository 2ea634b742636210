//! Action registry
//!
//! Flattens the configured view records into immutable action rows and
//! builds a per-kind trigger lookup. Built once at startup; the engine
//! only ever reads it.

use super::key::KeyTrigger;
use crate::config::ViewConfig;
use std::collections::HashMap;

/// One configured (trigger → operation) binding, scoped to a view kind
#[derive(Debug, Clone)]
pub struct Action {
    pub view_kind: String,
    pub trigger: KeyTrigger,
    pub operation: String,
    pub take_focus: bool,
    pub width: u16,
    pub description: String,
}

impl Action {
    /// Label shown in the action bar; falls back to the operation name.
    pub fn display_name(&self) -> &str {
        if self.description.is_empty() {
            &self.operation
        } else {
            &self.description
        }
    }
}

#[derive(Debug, Default)]
struct KindActions {
    /// Rows in config order, for the action bar.
    rows: Vec<Action>,
    /// Trigger → index into `rows`.
    by_trigger: HashMap<KeyTrigger, usize>,
}

/// Process-wide table of configured actions
#[derive(Debug, Default)]
pub struct ActionRegistry {
    by_kind: HashMap<String, KindActions>,
}

impl ActionRegistry {
    /// Build the registry from configured view records.
    ///
    /// Rows missing a key or operation, or naming an unknown key, are
    /// skipped with a log entry; a bad row never takes the process down.
    pub fn from_config(views: &[ViewConfig]) -> Self {
        let mut by_kind: HashMap<String, KindActions> = HashMap::new();

        for view in views {
            if view.view.is_empty() {
                tracing::warn!("skipping view record with an empty name");
                continue;
            }
            let kind = by_kind.entry(view.view.clone()).or_default();

            for row in &view.actions {
                let (Some(key), Some(operation)) = (row.key.as_deref(), row.action.as_deref())
                else {
                    tracing::warn!(
                        "skipping malformed action row for {}: key and action are required",
                        view.view
                    );
                    continue;
                };
                if operation.is_empty() {
                    tracing::warn!("skipping action row for {} with an empty operation", view.view);
                    continue;
                }
                let Some(trigger) = KeyTrigger::parse(key) else {
                    tracing::warn!(
                        "skipping action row for {}: {:?} is not a recognized key",
                        view.view,
                        key
                    );
                    continue;
                };

                let action = Action {
                    view_kind: view.view.clone(),
                    trigger,
                    operation: operation.to_string(),
                    take_focus: row.take_focus,
                    width: row.width.unwrap_or(1).max(1),
                    description: row.description.clone(),
                };

                if let Some(&existing) = kind.by_trigger.get(&trigger) {
                    tracing::warn!(
                        "duplicate trigger {} for {}; {} replaces {}",
                        trigger.label(),
                        view.view,
                        action.operation,
                        kind.rows[existing].operation
                    );
                    kind.rows[existing] = action;
                } else {
                    kind.by_trigger.insert(trigger, kind.rows.len());
                    kind.rows.push(action);
                }
            }
        }

        Self { by_kind }
    }

    /// O(1) lookup of the row bound to a trigger for a view kind.
    pub fn lookup(&self, kind: &str, trigger: KeyTrigger) -> Option<&Action> {
        let actions = self.by_kind.get(kind)?;
        actions.by_trigger.get(&trigger).map(|&i| &actions.rows[i])
    }

    /// All rows for a view kind, in config order.
    pub fn actions_for(&self, kind: &str) -> &[Action] {
        self.by_kind
            .get(kind)
            .map(|actions| actions.rows.as_slice())
            .unwrap_or(&[])
    }
}
