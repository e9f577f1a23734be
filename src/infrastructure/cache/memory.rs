//! Process-local course cache

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{CourseCache, CourseId, CourseSummary};
use crate::support::errors::CacheError;

struct Slot {
    course: CourseSummary,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// DashMap-backed cache; expired entries are dropped lazily on read.
#[derive(Default)]
pub struct InMemoryCourseCache {
    entries: DashMap<CourseId, Slot>,
}

impl InMemoryCourseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries currently held, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CourseCache for InMemoryCourseCache {
    async fn get(&self, key: CourseId) -> Result<Option<CourseSummary>, CacheError> {
        let now = Instant::now();
        // The shard guard must be released before remove_if touches the map
        let lookup = self
            .entries
            .get(&key)
            .map(|slot| slot.is_live(now).then(|| slot.course.clone()));

        match lookup {
            Some(Some(course)) => Ok(Some(course)),
            Some(None) => {
                self.entries.remove_if(&key, |_, slot| !slot.is_live(now));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: CourseId, value: &CourseSummary, ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(
            key,
            Slot {
                course: value.clone(),
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn invalidate(&self, key: CourseId) -> Result<(), CacheError> {
        self.entries.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::InstructorSummary;
    use chrono::{TimeZone, Utc};

    pub(crate) fn course(id: CourseId, name: &str) -> CourseSummary {
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        CourseSummary {
            id,
            name: name.to_string(),
            category: "Engineering".to_string(),
            programming_language: "Rust".to_string(),
            programming_language_description: "Systems language".to_string(),
            created_at: at,
            updated_at: at,
            instructor: InstructorSummary {
                id: 1,
                name: "Grace".to_string(),
                summary: "Compiler engineer".to_string(),
                description: "Teaches low-level programming".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn put_then_get_returns_value() {
        let cache = InMemoryCourseCache::new();
        let value = course(42, "Systems Programming");
        cache.put(42, &value, Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get(42).await.unwrap(), Some(value));
        assert_eq!(cache.get(7).await.unwrap(), None);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryCourseCache::new();
        cache
            .put(42, &course(42, "Systems Programming"), Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.get(42).await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn unrepresentable_ttl_never_expires() {
        let cache = InMemoryCourseCache::new();
        let value = course(42, "Systems Programming");
        cache.put(42, &value, Duration::MAX).await.unwrap();
        assert_eq!(cache.get(42).await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = InMemoryCourseCache::new();
        cache
            .put(42, &course(42, "Systems Programming"), Duration::from_secs(60))
            .await
            .unwrap();
        cache.invalidate(42).await.unwrap();
        assert_eq!(cache.get(42).await.unwrap(), None);
    }
}
