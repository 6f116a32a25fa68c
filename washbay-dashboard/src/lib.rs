pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use services::api_client::ApiClient;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<ApiClient>,
    pub demo_enabled: bool,
}

impl AppState {
    pub fn new(api: Arc<ApiClient>, demo_enabled: bool) -> Self {
        Self { api, demo_enabled }
    }
}
