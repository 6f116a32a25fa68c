use washbay_core::error::AppError;

use crate::services::metrics::get_metrics;

/// Prometheus text exposition.
pub async fn metrics() -> Result<String, AppError> {
    get_metrics().map_err(|e| AppError::InternalError(anyhow::anyhow!("failed to encode metrics: {}", e)))
}
