//! Course cache implementations and the caching catalog decorator

mod cached_catalog;
mod memory;
mod redis_cache;
mod routing;

pub use cached_catalog::CachedCatalog;
pub use memory::InMemoryCourseCache;
pub use redis_cache::{RedisCacheConfig, RedisCourseCache};
pub use routing::route_key;
