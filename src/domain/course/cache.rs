//! Course cache port

use std::time::Duration;

use async_trait::async_trait;

use super::model::{CourseId, CourseSummary};
use crate::support::errors::CacheError;

/// Shared key/value accelerator in front of the course catalog.
///
/// `Ok(None)` is a miss. A cache that is still connecting, or whose node is
/// unhealthy, reports misses and ignores writes instead of failing.
#[async_trait]
pub trait CourseCache: Send + Sync {
    async fn get(&self, key: CourseId) -> Result<Option<CourseSummary>, CacheError>;
    async fn put(&self, key: CourseId, value: &CourseSummary, ttl: Duration) -> Result<(), CacheError>;
    async fn invalidate(&self, key: CourseId) -> Result<(), CacheError>;
}
