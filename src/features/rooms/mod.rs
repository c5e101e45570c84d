pub mod allocator;
pub mod dtos;
pub mod services;

pub use allocator::{CodeGenerator, JoinCodeAllocator, RandomCodeGenerator};
pub use services::RoomService;
