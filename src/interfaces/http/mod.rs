//! HTTP REST interfaces
//!
//! - `reviews`: review CRUD for the reviews service
//! - `catalog`: course lookups for the catalog service
//! - `common`: response envelopes, error bodies, validated JSON extractor
//! - `router`: routers with Swagger documentation and metrics

pub mod catalog;
pub mod common;
pub mod health;
pub mod metrics;
pub mod reviews;
pub mod router;

pub use router::{create_catalog_router, create_reviews_router, CatalogState, ReviewsState};
