//! Course aggregate (read-only on the review side)
//!
//! Course summaries come from the remote catalog. The review service never
//! persists them; they only live transiently in the cache.

pub mod cache;
pub mod catalog;
pub mod model;

pub use cache::CourseCache;
pub use catalog::CourseCatalog;
pub use model::{CourseId, CourseSummary, InstructorSummary};
