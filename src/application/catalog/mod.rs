//! Catalog-side course registry

mod registry;

pub use registry::{CourseRegistry, SeedError};
