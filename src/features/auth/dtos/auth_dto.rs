use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request DTO for account registration
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SignUpDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request DTO for signing in
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SignInDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}
