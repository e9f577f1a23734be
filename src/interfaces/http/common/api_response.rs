//! Response envelope

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard success envelope: `{"success": true, "data": {...}}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}
