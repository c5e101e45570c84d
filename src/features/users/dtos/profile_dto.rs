use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::validation::USERNAME_REGEX;

/// Request DTO for the one-time username setup
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SetUsernameDto {
    #[validate(
        length(min = 1, max = 30, message = "Username must be 1-30 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits and underscores"
        )
    )]
    pub username: String,
}
