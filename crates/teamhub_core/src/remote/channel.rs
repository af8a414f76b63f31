//! Change-notification channels.
//!
//! # Responsibility
//! - Describe which table changes a subscriber wants to hear about.
//! - Fan write events out to open subscriptions.
//!
//! # Invariants
//! - One `ChangeEvent` is delivered per affected row per matching channel.
//! - Dropping a `Subscription` closes its channel; the registry prunes it on
//!   the next publish and buffers nothing for it.

use super::query::Table;
use super::Row;
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Event mask for a channel; `All` is the `*` mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventMask {
    #[default]
    All,
    Only(ChangeKind),
}

impl EventMask {
    pub fn admits(self, kind: ChangeKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == kind,
        }
    }
}

/// Subscription request for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpec {
    pub table: Table,
    pub events: EventMask,
    pub filter: Option<(&'static str, Value)>,
}

impl ChannelSpec {
    pub fn table(table: Table) -> Self {
        Self {
            table,
            events: EventMask::All,
            filter: None,
        }
    }

    pub fn filter_eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter = Some((column, value.into()));
        self
    }

    pub fn only(mut self, kind: ChangeKind) -> Self {
        self.events = EventMask::Only(kind);
        self
    }

    /// Whether a write of `kind` producing `row` on `table` is delivered.
    pub fn matches(&self, table: Table, kind: ChangeKind, row: &Row) -> bool {
        if self.table != table || !self.events.admits(kind) {
            return false;
        }
        match &self.filter {
            Some((column, expected)) => row.get(*column) == Some(expected),
            None => true,
        }
    }
}

/// One row-level change. Subscribers only rely on "something changed".
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub row: Row,
}

/// Receiving end of an open channel.
#[derive(Debug)]
pub struct Subscription {
    spec: ChannelSpec,
    receiver: Receiver<ChangeEvent>,
}

impl Subscription {
    pub fn spec(&self) -> &ChannelSpec {
        &self.spec
    }

    /// Removes and returns every event queued so far.
    pub fn drain(&self) -> Vec<ChangeEvent> {
        self.receiver.try_iter().collect()
    }
}

struct Subscriber {
    spec: ChannelSpec,
    sender: Sender<ChangeEvent>,
}

/// Publish side shared by remote store implementations.
#[derive(Default)]
pub struct ChannelRegistry {
    subscribers: Vec<Subscriber>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, spec: ChannelSpec) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(Subscriber {
            spec: spec.clone(),
            sender,
        });
        Subscription { spec, receiver }
    }

    /// Delivers `kind` events for `rows` and drops closed channels.
    ///
    /// Returns the number of events delivered.
    pub fn publish(&mut self, table: Table, kind: ChangeKind, rows: &[Row]) -> usize {
        let mut delivered = 0;
        self.subscribers.retain(|subscriber| {
            for row in rows {
                if !subscriber.spec.matches(table, kind, row) {
                    continue;
                }
                let event = ChangeEvent {
                    table,
                    kind,
                    row: row.clone(),
                };
                if subscriber.sender.send(event).is_err() {
                    return false;
                }
                delivered += 1;
            }
            true
        });
        delivered
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeKind, ChannelRegistry, ChannelSpec};
    use crate::remote::{Row, Table};
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn filtered_channel_ignores_other_rows() {
        let mut registry = ChannelRegistry::new();
        let sub = registry.open(ChannelSpec::table(Table::Messages).filter_eq("team_id", "a"));

        registry.publish(
            Table::Messages,
            ChangeKind::Insert,
            &[row(json!({ "id": "1", "team_id": "b" }))],
        );
        assert!(sub.drain().is_empty());

        registry.publish(
            Table::Messages,
            ChangeKind::Insert,
            &[row(json!({ "id": "2", "team_id": "a" }))],
        );
        assert_eq!(sub.drain().len(), 1);
    }

    #[test]
    fn mask_limits_event_kinds() {
        let mut registry = ChannelRegistry::new();
        let sub = registry.open(ChannelSpec::table(Table::Tasks).only(ChangeKind::Update));
        let rows = [row(json!({ "id": "1" }))];

        registry.publish(Table::Tasks, ChangeKind::Insert, &rows);
        registry.publish(Table::Tasks, ChangeKind::Update, &rows);
        registry.publish(Table::Ratings, ChangeKind::Update, &rows);

        let events = sub.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeKind::Update);
    }

    #[test]
    fn dropped_subscription_is_pruned() {
        let mut registry = ChannelRegistry::new();
        let sub = registry.open(ChannelSpec::table(Table::Tasks));
        assert_eq!(registry.len(), 1);
        drop(sub);

        let delivered =
            registry.publish(Table::Tasks, ChangeKind::Insert, &[row(json!({ "id": "1" }))]);
        assert_eq!(delivered, 0);
        assert!(registry.is_empty());
    }
}
