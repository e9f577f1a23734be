//! Read-through cache in front of a course catalog

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{CourseCache, CourseCatalog, CourseId, CourseSummary};
use crate::support::errors::{CacheError, LookupFailure};

/// Decorates a catalog with a course cache.
///
/// Only found courses are cached. Cache failures are logged and degrade to a
/// miss (or a skipped write); they never fail the lookup.
pub struct CachedCatalog<C> {
    inner: C,
    cache: Arc<dyn CourseCache>,
    ttl: Duration,
}

impl<C: CourseCatalog> CachedCatalog<C> {
    pub fn new(inner: C, cache: Arc<dyn CourseCache>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: CourseCatalog> CourseCatalog for CachedCatalog<C> {
    async fn lookup_course(&self, id: CourseId) -> Result<CourseSummary, LookupFailure> {
        match self.cache.get(id).await {
            Ok(Some(course)) => {
                metrics::counter!("course_cache_requests_total", "result" => "hit").increment(1);
                debug!(course_id = id, "Course cache hit");
                return Ok(course);
            }
            Ok(None) => {
                metrics::counter!("course_cache_requests_total", "result" => "miss").increment(1);
            }
            Err(err) => {
                metrics::counter!("course_cache_requests_total", "result" => "error").increment(1);
                warn!(course_id = id, error = %err, "Course cache read failed, looking up directly");
            }
        }

        let course = self.inner.lookup_course(id).await?;

        if let Err(err) = self.cache.put(id, &course, self.ttl).await {
            warn!(course_id = id, error = %err, "Failed to cache course");
        }
        Ok(course)
    }

    async fn invalidate_course(&self, id: CourseId) -> Result<(), CacheError> {
        debug!(course_id = id, "Evicting cached course");
        self.cache.invalidate(id).await
    }
}
