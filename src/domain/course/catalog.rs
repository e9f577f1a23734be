//! Course catalog port

use async_trait::async_trait;

use super::model::{CourseId, CourseSummary};
use crate::support::errors::{CacheError, LookupFailure};

/// Single-request/single-response access to the remote course catalog.
///
/// Implementations own their timeout and retry policy and must report
/// absence as [`LookupFailure::NotFound`] only when the catalog said so.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn lookup_course(&self, id: CourseId) -> Result<CourseSummary, LookupFailure>;

    /// Forget any locally held copy of course `id`, e.g. after the catalog
    /// announced a change. Uncached catalogs have nothing to forget.
    async fn invalidate_course(&self, _id: CourseId) -> Result<(), CacheError> {
        Ok(())
    }
}
