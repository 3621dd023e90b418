// All service modules
pub mod asset_data;
pub mod asset_registry;
pub mod onchain;
pub mod upload_flow;

// Re-export for convenience
pub use asset_data::{AssetDataQuery, MintStatusParams, MintStatusWatcher};
pub use asset_registry::AssetRegistry;
pub use onchain::{LaunchpadViews, OnchainReader};
pub use upload_flow::{FundingOutcome, UploadFlow};

use crate::{config::Config, models::MintStatusUpdate};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Handles to the background services started by [`start_background_services`].
pub struct BackgroundServices {
    pub mint_status: watch::Receiver<Option<MintStatusUpdate>>,
    pub mint_params: watch::Sender<MintStatusParams>,
}

/// Start all background services
pub fn start_background_services(
    config: &Config,
    asset_data: Arc<AssetDataQuery>,
    cancel: CancellationToken,
) -> BackgroundServices {
    tracing::info!("Starting background services...");

    let (mint_params, params_rx) = watch::channel(MintStatusParams {
        fa_address: config.fa_address.clone(),
        account: None,
    });

    let watcher = MintStatusWatcher::new(asset_data, config.mint_status_refresh());
    let (mint_status, _handle) = watcher.spawn(params_rx, cancel);
    tracing::info!(
        "Mint status refresher running every {}s for {}",
        config.mint_status_refresh_secs,
        if config.fa_address.is_empty() { "<unset>" } else { config.fa_address.as_str() }
    );

    BackgroundServices {
        mint_status,
        mint_params,
    }
}
