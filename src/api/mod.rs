// src/api/mod.rs
pub mod assets;
pub mod health;
pub mod mint;
pub mod upload;

use crate::config::Config;
use crate::integrations::IrysNode;
use crate::models::MintStatusUpdate;
use crate::services::{AssetDataQuery, AssetRegistry, MintStatusParams};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub asset_data: Arc<AssetDataQuery>,
    pub registry: Arc<AssetRegistry>,
    pub irys: IrysNode,
    pub mint_status: watch::Receiver<Option<MintStatusUpdate>>,
    pub mint_params: Arc<watch::Sender<MintStatusParams>>,
}
