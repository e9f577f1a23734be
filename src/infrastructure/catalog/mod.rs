//! Remote course catalog access

mod http_client;

pub use http_client::{HttpCatalogClient, LookupPolicy};
