//! washbay-core: Shared infrastructure for the washbay dashboard services.
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use serde_json;
pub use tracing;
