//! Shared HTTP building blocks

mod api_error;
mod api_response;
mod params;
mod validated_json;

pub use api_error::{ApiError, ErrorBody};
pub use api_response::ApiResponse;
pub use params::{ApiPath, ApiQuery};
pub use validated_json::{ValidatedJson, ValidatedJsonRejection};
