mod auth_dto;

pub use auth_dto::{SignInDto, SignUpDto};
