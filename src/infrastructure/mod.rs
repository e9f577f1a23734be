//! Infrastructure layer - external concerns

pub mod cache;
pub mod catalog;
pub mod database;
pub mod storage;

pub use cache::{CachedCatalog, InMemoryCourseCache, RedisCacheConfig, RedisCourseCache};
pub use catalog::{HttpCatalogClient, LookupPolicy};
pub use database::{init_database, DatabaseConfig, SeaOrmReviewStore};
pub use storage::InMemoryReviewStore;
