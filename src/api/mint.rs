use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    address::canonical_str,
    error::{AppError, Result},
    models::{ApiResponse, MintData, MintStatusUpdate},
    services::MintStatusParams,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct MintStatusQuery {
    pub fa_address: Option<String>,
    pub account: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WatchRequest {
    pub fa_address: Option<String>,
    pub account: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// GET /api/v1/mint-status
///
/// `data: null` means the status is temporarily unavailable.
pub async fn get_mint_status(
    State(state): State<AppState>,
    Query(query): Query<MintStatusQuery>,
) -> Result<Json<ApiResponse<Option<MintData>>>> {
    let fa_address =
        non_empty(query.fa_address).unwrap_or_else(|| state.config.fa_address.clone());
    let account = non_empty(query.account).map(|a| canonical_str(&a));

    let data = state
        .asset_data
        .fetch(&fa_address, account.as_deref())
        .await;

    Ok(Json(ApiResponse::success(data)))
}

/// GET /api/v1/mint-status/live
pub async fn get_live_mint_status(
    State(state): State<AppState>,
) -> Json<ApiResponse<Option<MintStatusUpdate>>> {
    let latest = state.mint_status.borrow().clone();
    Json(ApiResponse::success(latest))
}

/// PUT /api/v1/mint-status/watch
///
/// Switches the asset/account the background refresher follows.
pub async fn set_watched_asset(
    State(state): State<AppState>,
    Json(req): Json<WatchRequest>,
) -> Result<Json<ApiResponse<String>>> {
    let fa_address = non_empty(req.fa_address).unwrap_or_else(|| state.config.fa_address.clone());
    if fa_address.is_empty() {
        return Err(AppError::BadRequest("fa_address is required".to_string()));
    }
    let account = non_empty(req.account).map(|a| canonical_str(&a));

    state.mint_params.send_if_modified(|current| {
        let next = MintStatusParams {
            fa_address: fa_address.clone(),
            account: account.clone(),
        };
        if *current == next {
            return false;
        }
        *current = next;
        true
    });

    Ok(Json(ApiResponse::success(fa_address)))
}
