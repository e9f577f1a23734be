//! Course catalog REST endpoints

pub mod handlers;

pub use handlers::*;
