//! Core logic for a room-based collaboration app: session-guarded
//! navigation, join-code room membership, file sharing, comments, and a
//! realtime per-room replica, all behind swappable backend ports.

pub mod backend;
pub mod core;
pub mod features;
pub mod modules;
pub mod shared;

pub use crate::core::{AppContext, AppError, Config, Result};
pub use crate::features::auth::{NavAction, Routing, Screen, SessionController, SessionState};
pub use crate::features::realtime::LiveRoom;
