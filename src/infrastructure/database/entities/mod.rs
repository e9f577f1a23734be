//! Database entities module

pub mod review;

pub use review::Entity as Review;
