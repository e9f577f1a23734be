//! Review use-cases

mod service;

pub use service::ReviewService;
