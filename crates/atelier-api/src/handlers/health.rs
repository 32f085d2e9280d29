//! Health check

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const STORAGE_CHECK_KEY: &str = "health/check";

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
}

/// "healthy", "timeout" or "{prefix}: {error}".
async fn run_check<F, E>(f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(CHECK_TIMEOUT, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "All dependencies healthy", body = HealthResponse),
        (status = 503, description = "A dependency is failing", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.pool {
        Some(pool) => {
            run_check(
                async { sqlx::query("SELECT 1").execute(pool).await.map(|_| ()) },
                "unhealthy",
            )
            .await
        }
        None => "healthy".to_string(),
    };

    let storage = run_check(
        async { state.storage.exists(STORAGE_CHECK_KEY).await.map(|_| ()) },
        "unhealthy",
    )
    .await;

    let healthy = database == "healthy" && storage == "healthy";
    if !healthy {
        tracing::warn!(database = %database, storage = %storage, "Health check failed");
    }

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            database,
            storage,
        }),
    )
}
