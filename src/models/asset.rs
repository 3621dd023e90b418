use crate::amount::{deserialize_optional_amount, to_human_decimal};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==================== FUNGIBLE ASSET ====================
/// Row of the indexer's `fungible_asset_metadata` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FungibleAsset {
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub maximum_v2: Option<u128>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub supply_v2: Option<u128>,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub asset_type: String,
    #[serde(default)]
    pub icon_uri: Option<String>,
}

// ==================== MINT STATUS ====================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintData {
    pub max_supply: f64,
    pub current_supply: f64,
    pub your_balance: f64,
    pub user_mint_balance: f64,
    pub asset: FungibleAsset,
    pub is_mint_active: bool,
}

/// Snapshot published by the background refresher.
#[derive(Debug, Clone, Serialize)]
pub struct MintStatusUpdate {
    pub fa_address: String,
    pub account: Option<String>,
    pub data: Option<MintData>,
    pub refreshed_at: DateTime<Utc>,
}

// ==================== MY ASSETS TABLE ====================
#[derive(Debug, Clone, Serialize)]
pub struct AssetRow {
    pub icon: String,
    pub symbol: String,
    pub name: String,
    pub fa_address: String,
    pub explorer_url: Option<String>,
    pub max_supply: Decimal,
    pub minted: Decimal,
    pub decimals: u32,
}

impl AssetRow {
    pub fn from_asset(
        asset: &FungibleAsset,
        placeholder_icon: &str,
        explorer_url: impl Fn(&str) -> String,
    ) -> Self {
        let name = if asset.name.is_empty() {
            if asset.symbol.is_empty() {
                "Unknown".to_string()
            } else {
                asset.symbol.clone()
            }
        } else {
            asset.name.clone()
        };
        let icon = asset
            .icon_uri
            .clone()
            .filter(|uri| !uri.is_empty())
            .unwrap_or_else(|| placeholder_icon.to_string());
        let explorer_url = if asset.asset_type.is_empty() {
            None
        } else {
            Some(explorer_url(&asset.asset_type))
        };

        Self {
            icon,
            symbol: asset.symbol.clone(),
            name,
            fa_address: asset.asset_type.clone(),
            explorer_url,
            max_supply: to_human_decimal(asset.maximum_v2, asset.decimals),
            minted: to_human_decimal(asset.supply_v2, asset.decimals),
            decimals: asset.decimals,
        }
    }
}

// ==================== API ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
