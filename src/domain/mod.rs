pub mod course;
pub mod review;

// Re-export commonly used types
pub use course::{CourseCache, CourseCatalog, CourseId, CourseSummary, InstructorSummary};
pub use review::{NewReview, Review, ReviewStore};

// Re-export DomainError from support for convenience
pub use crate::support::errors::{DomainError, DomainResult};
