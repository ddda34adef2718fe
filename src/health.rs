//! Health check

use axum::Extension;
use serde::Serialize;

use crate::api::Error;
use crate::api::Success;
use crate::storage::Storage;

/// Health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `ok`, failures are errors
    pub status: &'static str,
}

/// Is the app able to serve redirects?
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/-/health/
/// ```
pub async fn health<S: Storage>(
    Extension(storage): Extension<S>,
) -> Result<Success<HealthResponse>, Error> {
    storage.ping().await?;

    Ok(Success::ok(HealthResponse { status: "ok" }))
}
