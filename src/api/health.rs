use axum::{extract::State, Json};
use serde::Serialize;
use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub network: String,
    pub mint_status_refreshed_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let refreshed_at = state
        .mint_status
        .borrow()
        .as_ref()
        .map(|update| update.refreshed_at);

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        network: state.config.network.to_string(),
        mint_status_refreshed_at: refreshed_at,
    })
}
