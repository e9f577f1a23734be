//! Review REST endpoints

pub mod dto;
pub mod handlers;

pub use dto::ReviewListQuery;
pub use handlers::*;
