pub mod admin;
pub mod drafts;
pub mod extract;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod profile;
pub mod stats;
pub mod trades;
pub mod usage;
pub mod webhook;
pub mod ws;

use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
