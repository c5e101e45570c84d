//! Client-local record of recently created and deleted room ids.
//!
//! Purely a navigation aid: the back button must not re-enter a just-created
//! room's transient state or a just-deleted room's invalid one. The sets are
//! advisory, never authoritative membership data, so persistence failures
//! degrade to empty sets with a warning instead of failing the application.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
struct NavlogFile {
    created_rooms: HashSet<Uuid>,
    deleted_rooms: HashSet<Uuid>,
}

/// Persisted created/deleted room-id sets, write-through on every mutation
#[derive(Debug)]
pub struct RoomNavlog {
    path: PathBuf,
    created: HashSet<Uuid>,
    deleted: HashSet<Uuid>,
}

impl RoomNavlog {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<NavlogFile>(&raw).unwrap_or_else(|e| {
                warn!("Navlog at {} is unreadable, starting empty: {}", path.display(), e);
                NavlogFile::default()
            }),
            Err(_) => NavlogFile::default(),
        };

        Self {
            path,
            created: file.created_rooms,
            deleted: file.deleted_rooms,
        }
    }

    /// In-memory navlog that never touches disk (tests, ephemeral sessions)
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            created: HashSet::new(),
            deleted: HashSet::new(),
        }
    }

    pub fn record_created(&mut self, room_id: Uuid) {
        self.created.insert(room_id);
        self.deleted.remove(&room_id);
        self.persist();
    }

    pub fn record_deleted(&mut self, room_id: Uuid) {
        self.deleted.insert(room_id);
        self.created.remove(&room_id);
        self.persist();
    }

    /// Whether back-navigation into this room must be intercepted
    pub fn is_flagged(&self, room_id: Uuid) -> bool {
        self.created.contains(&room_id) || self.deleted.contains(&room_id)
    }

    pub fn is_deleted(&self, room_id: Uuid) -> bool {
        self.deleted.contains(&room_id)
    }

    fn persist(&self) {
        if self.path.as_os_str().is_empty() {
            return;
        }

        let file = NavlogFile {
            created_rooms: self.created.clone(),
            deleted_rooms: self.deleted.clone(),
        };
        if let Err(e) = write_json(&self.path, &file) {
            warn!("Could not persist navlog to {}: {}", self.path.display(), e);
        }
    }
}

fn write_json(path: &Path, file: &NavlogFile) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let raw = serde_json::to_string_pretty(file)?;
    fs::write(path, raw)
}
