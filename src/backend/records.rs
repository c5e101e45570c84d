use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile row, 1:1 with an identity-provider user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRecord {
    pub user_id: Uuid,
    pub username: String,
}

/// Room row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRecord {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub join_code: String,
}

/// Membership row, unique per (room, user) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipRecord {
    pub room_id: Uuid,
    pub user_id: Uuid,
}

/// Category an uploaded file is filed under within a room
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Assignment,
    Notes,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Assignment => "assignment",
            FileCategory::Notes => "notes",
        }
    }
}

/// File row. The object key doubles as the row's identity: the blob location
/// and the record always refer to each other through it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub room_id: Uuid,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub object_key: String,
    pub url: String,
    pub size: i64,
    pub category: FileCategory,
}

/// Comment row as stored; carries only the author id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
