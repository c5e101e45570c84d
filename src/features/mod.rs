pub mod auth;
pub mod comments;
pub mod files;
pub mod realtime;
pub mod rooms;
pub mod users;
