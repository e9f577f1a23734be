//! Error normalization for outward-facing surfaces

mod normalizer;

pub use normalizer::{ErrorNormalizer, NormalizedError};
