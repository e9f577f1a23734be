//! Review aggregate
//!
//! Contains the Review entity, the write-side input, and the store interface.

pub mod dto_create;
pub mod model;
pub mod repository;

pub use dto_create::NewReview;
pub use model::Review;
pub use repository::ReviewStore;
