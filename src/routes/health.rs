//! Health check endpoint for container orchestration.

/// Liveness check: the process can answer HTTP.
pub async fn health() -> &'static str {
    "ok"
}
