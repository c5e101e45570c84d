use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::records::CommentRecord;

/// A comment as rendered: the stored row joined with the author's username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentView {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
}

impl CommentView {
    pub fn enrich(record: CommentRecord, username: String) -> Self {
        Self {
            id: record.id,
            room_id: record.room_id,
            user_id: record.user_id,
            content: record.content,
            created_at: record.created_at,
            username,
        }
    }
}
