use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    amount::{decimal_to_f64, to_human_decimal},
    error::{AppError, Result},
    models::ApiResponse,
};

use super::AppState;

const APT_DECIMALS: u32 = 8;

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct UploadPrice {
    pub bytes: u64,
    pub token: String,
    /// Atomic units, as a string to survive JSON number limits.
    pub atomic: String,
    pub apt: f64,
    /// Prefix of the URL an uploaded file is served from.
    pub gateway_url: String,
}

/// GET /api/v1/upload/price?bytes=
pub async fn get_upload_price(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<ApiResponse<UploadPrice>>> {
    if query.bytes == 0 {
        return Err(AppError::BadRequest("bytes must be greater than zero".to_string()));
    }

    let atomic = state
        .irys
        .price(query.bytes)
        .await
        .map_err(|e| AppError::ExternalAPI(format!("Price estimate failed: {}", e.detail())))?;

    Ok(Json(ApiResponse::success(UploadPrice {
        bytes: query.bytes,
        token: state.irys.token().to_string(),
        atomic: atomic.to_string(),
        apt: decimal_to_f64(to_human_decimal(Some(atomic), APT_DECIMALS)),
        gateway_url: state.config.irys_gateway_url.clone(),
    })))
}
