/*
 * Responsibility
 * - /echo の request/response DTO
 * - validator の derive で形式チェックを宣言する
 */
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_repeat() -> u8 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct EchoRequest {
    #[validate(length(min = 1, max = 280, message = "must be between 1 and 280 characters"))]
    pub message: String,
    #[serde(default = "default_repeat")]
    #[validate(range(min = 1, max = 10, message = "must be between 1 and 10"))]
    pub repeat: u8,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EchoQuery {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub message: String,
}

// Checked before it is returned: a repeated message may outgrow the limit.
#[derive(Debug, Serialize, Validate)]
pub struct EchoResponse {
    #[validate(length(max = 280, message = "must be at most 280 characters"))]
    pub message: String,
    pub from: String,
}
