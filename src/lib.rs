//! # Course Reviews
//!
//! Review service guarded by a remote course catalog.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Reviews, course summaries, and the ports (store, catalog, cache)
//! - **application**: Review orchestration, error normalization, catalog registry
//! - **infrastructure**: HTTP catalog client, Redis/in-memory caches, SeaORM and
//!   in-memory review stores
//! - **interfaces**: REST surfaces for the review and catalog services
//! - **support**: Error taxonomy shared by every layer
//! - **shared**: Retry helper and shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;
pub mod support;

pub use config::{default_config_path, AppConfig};

pub use application::errors::{ErrorNormalizer, NormalizedError};
pub use application::reviews::ReviewService;
pub use domain::{CourseCatalog, CourseSummary, NewReview, Review, ReviewStore};
pub use support::errors::{DomainError, DomainResult, ErrorKind, LookupFailure};
