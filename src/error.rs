use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Blockchain RPC error: {0}")]
    BlockchainRPC(String),

    #[error("Indexer error: {0}")]
    Indexer(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Error funding node {0}")]
    Funding(String),

    #[error("Error uploading file: {0}")]
    Upload(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("External API error: {0}")]
    ExternalAPI(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BlockchainRPC(ref msg) => (
                StatusCode::BAD_GATEWAY,
                "BLOCKCHAIN_RPC_ERROR",
                msg.clone(),
            ),
            AppError::Indexer(ref msg) => (StatusCode::BAD_GATEWAY, "INDEXER_ERROR", msg.clone()),
            AppError::WalletNotConnected => (
                StatusCode::UNAUTHORIZED,
                "WALLET_NOT_CONNECTED",
                "Connect a wallet first".to_string(),
            ),
            AppError::Funding(_) => (StatusCode::BAD_GATEWAY, "FUNDING_ERROR", self.to_string()),
            AppError::Upload(_) => (StatusCode::BAD_GATEWAY, "UPLOAD_ERROR", self.to_string()),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                self.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_error_message_carries_detail() {
        let err = AppError::Upload("Not enough balance for transaction".to_string());
        assert_eq!(
            err.to_string(),
            "Error uploading file: Not enough balance for transaction"
        );
    }

    #[test]
    fn missing_wallet_maps_to_unauthorized() {
        let response = AppError::WalletNotConnected.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn indexer_error_maps_to_bad_gateway() {
        let response = AppError::Indexer("timeout".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
