pub mod dtos;
pub mod models;
pub mod services;

pub use models::CommentView;
pub use services::CommentService;
