use crate::{
    address::to_canonical,
    error::Result,
    indexer::FungibleIndexer,
    models::FungibleAsset,
    services::onchain::LaunchpadViews,
};
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Resolves every fungible asset registered by the launchpad contract to its indexer
/// metadata. One lookup per registered object, so only suitable for small registries;
/// `concurrency` bounds how many lookups run at once.
pub struct AssetRegistry {
    views: Arc<dyn LaunchpadViews>,
    indexer: Arc<dyn FungibleIndexer>,
    placeholder_icon: String,
    concurrency: Option<usize>,
}

impl AssetRegistry {
    pub fn new(
        views: Arc<dyn LaunchpadViews>,
        indexer: Arc<dyn FungibleIndexer>,
        placeholder_icon: String,
        concurrency: Option<usize>,
    ) -> Self {
        Self {
            views,
            indexer,
            placeholder_icon,
            concurrency: concurrency.filter(|limit| *limit > 0),
        }
    }

    /// Returns `None` when `cancel` fired before the result could be committed.
    /// Lookups that fail or find nothing are left out; a failed registry read yields
    /// an empty list.
    pub async fn enumerate(&self, cancel: &CancellationToken) -> Option<Vec<FungibleAsset>> {
        let assets = match self.load(cancel).await {
            Ok(assets) => assets,
            Err(e) => {
                tracing::error!("Asset registry enumeration failed: {}", e);
                Vec::new()
            }
        };

        if cancel.is_cancelled() {
            tracing::debug!("Asset registry enumeration cancelled before commit");
            return None;
        }
        Some(assets)
    }

    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<FungibleAsset>> {
        let objects = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Vec::new()),
            objects = self.views.registry() => objects?,
        };

        let asset_types: Vec<String> = objects
            .iter()
            .map(|object| to_canonical(Some(object)))
            .collect();
        tracing::debug!("Resolving {} registered assets", asset_types.len());

        let lookups: Vec<_> = asset_types
            .iter()
            .map(|asset_type| self.resolve(asset_type, cancel))
            .collect();
        let resolved: Vec<Option<FungibleAsset>> = match self.concurrency {
            Some(limit) => stream::iter(lookups).buffered(limit).collect().await,
            None => join_all(lookups).await,
        };

        Ok(resolved.into_iter().flatten().collect())
    }

    async fn resolve(&self, asset_type: &str, cancel: &CancellationToken) -> Option<FungibleAsset> {
        let rows = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            rows = self.indexer.fungible_asset_metadata(asset_type, 1) => rows,
        };

        match rows {
            Ok(rows) => rows.into_iter().next().map(|mut asset| {
                if asset.icon_uri.as_deref().map_or(true, str::is_empty) {
                    asset.icon_uri = Some(self.placeholder_icon.clone());
                }
                asset
            }),
            Err(e) => {
                tracing::debug!("Skipping asset {}: {}", asset_type, e);
                None
            }
        }
    }
}
