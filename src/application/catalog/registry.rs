//! In-memory course registry served by the catalog service

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use thiserror::Error;
use tracing::info;

use crate::domain::{CourseId, CourseSummary};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
pub struct CourseRegistry {
    courses: DashMap<CourseId, CourseSummary>,
}

impl CourseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_courses(courses: impl IntoIterator<Item = CourseSummary>) -> Self {
        let registry = Self::new();
        for course in courses {
            registry.insert(course);
        }
        registry
    }

    /// Load a JSON array of course summaries
    pub fn load_seed(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let courses: Vec<CourseSummary> =
            serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let registry = Self::from_courses(courses);
        info!(path = %path.display(), courses = registry.len(), "Course registry seeded");
        Ok(registry)
    }

    /// Insert or replace; returns the previous entry
    pub fn insert(&self, course: CourseSummary) -> Option<CourseSummary> {
        self.courses.insert(course.id, course)
    }

    pub fn find_by_id(&self, id: CourseId) -> Option<CourseSummary> {
        self.courses.get(&id).map(|c| c.value().clone())
    }

    /// All courses ordered by id
    pub fn find_all(&self) -> Vec<CourseSummary> {
        let mut courses: Vec<CourseSummary> =
            self.courses.iter().map(|c| c.value().clone()).collect();
        courses.sort_by_key(|c| c.id);
        courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
