pub mod aggregator;
pub mod api_client;
pub mod charts;
pub mod metrics;
