//! In-process review storage

mod memory;

pub use memory::InMemoryReviewStore;
