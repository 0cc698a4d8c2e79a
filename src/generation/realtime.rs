use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::database::models::Generation;

pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row change on `ai_generations`, shaped like a Postgres change-feed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationChange {
    #[serde(rename = "eventType")]
    pub event_type: ChangeKind,
    pub new: Generation,
}

impl GenerationChange {
    pub fn insert(row: Generation) -> Self {
        Self { event_type: ChangeKind::Insert, new: row }
    }

    pub fn update(row: Generation) -> Self {
        Self { event_type: ChangeKind::Update, new: row }
    }

    pub fn delete(row: Generation) -> Self {
        Self { event_type: ChangeKind::Delete, new: row }
    }

    /// Subscription filter: owner, plus tool type when given
    pub fn matches(&self, user_id: Uuid, tool_type: Option<&str>) -> bool {
        self.new.user_id == user_id && tool_type.map_or(true, |t| self.new.tool_type == t)
    }
}

/// Process-wide fan-out of generation changes. Cheap to clone; all clones share one channel.
#[derive(Clone)]
pub struct RealtimeHub {
    tx: broadcast::Sender<GenerationChange>,
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Having no subscribers is not an error
    pub fn publish(&self, change: GenerationChange) {
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GenerationChange> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Client-side view of a user's generations. Upserts replace by id, so an optimistic insert
/// and the realtime echo of the same row converge no matter which arrives first.
#[derive(Debug, Default, Clone)]
pub struct GenerationFeed {
    rows: HashMap<Uuid, Generation>,
}

impl GenerationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, row: Generation) {
        if row.deleted_at.is_some() {
            self.rows.remove(&row.id);
        } else {
            self.rows.insert(row.id, row);
        }
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<Generation> {
        self.rows.remove(id)
    }

    pub fn apply(&mut self, change: GenerationChange) {
        match change.event_type {
            ChangeKind::Insert | ChangeKind::Update => self.upsert(change.new),
            ChangeKind::Delete => {
                self.rows.remove(&change.new.id);
            }
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&Generation> {
        self.rows.get(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Newest first; ties broken by id so the order is total
    pub fn items(&self) -> Vec<&Generation> {
        let mut items: Vec<&Generation> = self.rows.values().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        items
    }
}
