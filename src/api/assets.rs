use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, Result},
    models::{ApiResponse, AssetRow, FungibleAsset},
};

use super::AppState;

/// Runs the enumeration under a token that fires if the request is dropped,
/// so an abandoned request never commits a result.
async fn enumerate_for_request(state: &AppState) -> Result<Vec<FungibleAsset>> {
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let assets = state.registry.enumerate(&cancel).await;
    guard.disarm();

    assets.ok_or_else(|| AppError::Internal("Asset enumeration was cancelled".to_string()))
}

/// GET /api/v1/assets
pub async fn list_assets(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<FungibleAsset>>>> {
    let assets = enumerate_for_request(&state).await?;
    Ok(Json(ApiResponse::success(assets)))
}

/// GET /my-assets
///
/// Table rows for every registered asset. Hidden in production.
pub async fn my_assets(State(state): State<AppState>) -> Result<Response> {
    if state.config.is_prod {
        return Ok(Redirect::to("/").into_response());
    }

    let assets = enumerate_for_request(&state).await?;
    let rows: Vec<AssetRow> = assets
        .iter()
        .map(|asset| {
            AssetRow::from_asset(asset, &state.config.placeholder_icon, |addr| {
                state.config.explorer_object_url(addr)
            })
        })
        .collect();

    Ok(Json(ApiResponse::success(rows)).into_response())
}
