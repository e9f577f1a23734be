//! Application layer - use-case orchestration

pub mod catalog;
pub mod errors;
pub mod reviews;

pub use catalog::CourseRegistry;
pub use errors::{ErrorNormalizer, NormalizedError};
pub use reviews::ReviewService;
