use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request DTO for posting a comment
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PostCommentDto {
    #[validate(length(min = 1, max = 2000, message = "Comment cannot be empty"))]
    pub content: String,
}
