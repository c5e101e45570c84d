use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::backend::records::{CommentRecord, FileRecord};
use crate::core::error::Result;

/// Tables the change feed can be scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedTable {
    Files,
    Comments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Row payload carried by a change event
#[derive(Debug, Clone)]
pub enum FeedRow {
    File(FileRecord),
    Comment(CommentRecord),
}

/// A row-level change pushed by the backend for one room
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub row: FeedRow,
}

/// A live, room-scoped subscription to one table.
///
/// Dropping the subscription unsubscribes; the emitter prunes closed
/// subscriptions, so nothing leaks across screen transitions.
pub struct FeedSubscription {
    receiver: mpsc::UnboundedReceiver<ChangeEvent>,
}

impl FeedSubscription {
    pub fn new(receiver: mpsc::UnboundedReceiver<ChangeEvent>) -> Self {
        Self { receiver }
    }

    /// Next pushed change, or `None` once the feed has shut down.
    pub async fn next_event(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }
}

/// External change feed contract: push notification of row mutations,
/// filtered by table and room.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn subscribe(&self, table: FeedTable, room_id: Uuid) -> Result<FeedSubscription>;
}
