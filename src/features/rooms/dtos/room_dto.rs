use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::validation::JOIN_CODE_REGEX;

/// Request DTO for room creation
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateRoomDto {
    #[validate(length(min = 1, max = 100, message = "Room name cannot be empty"))]
    pub name: String,
}

/// Request DTO for redeeming a join code. Validated after trim/uppercase
/// normalization.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct JoinRoomDto {
    #[validate(regex(path = *JOIN_CODE_REGEX, message = "Invalid join code"))]
    pub join_code: String,
}
