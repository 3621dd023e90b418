use crate::{
    address::canonical_str,
    amount::to_human,
    cache::{QueryCache, QueryKey},
    constants::APP_STATE_QUERY_KEY,
    error::Result,
    indexer::FungibleIndexer,
    models::{MintData, MintStatusUpdate},
    services::onchain::LaunchpadViews,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Minting is open only while the contract flag is on and supply has headroom.
pub fn is_mint_active(enabled: bool, maximum: u128, supply: u128) -> bool {
    enabled && maximum > supply
}

/// Consolidated mint status for one fungible asset and (optionally) one account.
pub struct AssetDataQuery {
    indexer: Arc<dyn FungibleIndexer>,
    views: Arc<dyn LaunchpadViews>,
    cache: QueryCache<Option<MintData>>,
}

impl AssetDataQuery {
    pub fn new(
        indexer: Arc<dyn FungibleIndexer>,
        views: Arc<dyn LaunchpadViews>,
        cache: QueryCache<Option<MintData>>,
    ) -> Self {
        Self {
            indexer,
            views,
            cache,
        }
    }

    pub fn cache(&self) -> &QueryCache<Option<MintData>> {
        &self.cache
    }

    /// Accounts are keyed in long form, so `0x1` and its padded spelling share an entry.
    pub fn cache_key(fa_address: &str, account: Option<&str>) -> QueryKey {
        let account = account.map_or_else(|| "null".to_string(), canonical_str);
        QueryKey::new(APP_STATE_QUERY_KEY, [fa_address.to_string(), account])
    }

    /// Cached read. `None` means the data is temporarily unavailable, never that minting
    /// is inactive.
    pub async fn fetch(&self, fa_address: &str, account: Option<&str>) -> Option<MintData> {
        let key = Self::cache_key(fa_address, account);
        self.cache
            .get_or_fetch(key, || self.fetch_uncached(fa_address, account))
            .await
    }

    /// Drops the cached entry and reads again.
    pub async fn refresh(&self, fa_address: &str, account: Option<&str>) -> Option<MintData> {
        self.cache
            .invalidate(&Self::cache_key(fa_address, account))
            .await;
        self.fetch(fa_address, account).await
    }

    pub async fn fetch_uncached(
        &self,
        fa_address: &str,
        account: Option<&str>,
    ) -> Option<MintData> {
        match self.load(fa_address, account).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("Mint status query failed for {}: {}", fa_address, e);
                None
            }
        }
    }

    async fn load(&self, fa_address: &str, account: Option<&str>) -> Result<Option<MintData>> {
        if fa_address.is_empty() {
            return Ok(None);
        }

        let account_long = account.map(canonical_str).unwrap_or_default();

        let result = self.indexer.fungible_query(fa_address, &account_long).await?;
        let Some(asset) = result.fungible_asset_metadata.into_iter().next() else {
            tracing::debug!("No fungible asset metadata for {}", fa_address);
            return Ok(None);
        };

        let mint_enabled = self.views.mint_enabled(fa_address).await?;

        let user_mint_raw = match account {
            Some(_) => {
                self.views
                    .user_mint_balance(&account_long, fa_address)
                    .await?
            }
            None => 0,
        };

        let balance_raw = result
            .current_fungible_asset_balances
            .first()
            .and_then(|row| row.amount);
        let maximum = asset.maximum_v2.unwrap_or(0);
        let supply = asset.supply_v2.unwrap_or(0);
        let decimals = asset.decimals;

        Ok(Some(MintData {
            max_supply: to_human(Some(maximum), decimals),
            current_supply: to_human(Some(supply), decimals),
            user_mint_balance: to_human(Some(user_mint_raw), decimals),
            your_balance: to_human(balance_raw, decimals),
            is_mint_active: is_mint_active(mint_enabled, maximum, supply),
            asset,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintStatusParams {
    pub fa_address: String,
    pub account: Option<String>,
}

/// Re-runs the asset data query on a fixed interval and whenever the watched
/// asset/account changes.
pub struct MintStatusWatcher {
    query: Arc<AssetDataQuery>,
    refresh_every: Duration,
}

impl MintStatusWatcher {
    pub fn new(query: Arc<AssetDataQuery>, refresh_every: Duration) -> Self {
        Self {
            query,
            refresh_every,
        }
    }

    pub fn spawn(
        self,
        mut params: watch::Receiver<MintStatusParams>,
        cancel: CancellationToken,
    ) -> (watch::Receiver<Option<MintStatusUpdate>>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(self.refresh_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let forced = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    changed = params.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        ticker.reset();
                        false
                    }
                    _ = ticker.tick() => true,
                };

                let current = params.borrow_and_update().clone();
                let account = current.account.as_deref();
                let data = if forced {
                    self.query.refresh(&current.fa_address, account).await
                } else {
                    self.query.fetch(&current.fa_address, account).await
                };

                if cancel.is_cancelled() {
                    break;
                }

                tx.send_replace(Some(MintStatusUpdate {
                    fa_address: current.fa_address,
                    account: current.account,
                    data,
                    refreshed_at: chrono::Utc::now(),
                }));
            }

            tracing::debug!("Mint status watcher stopped");
        });

        (rx, handle)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::address::AddressInput;
    use crate::error::{AppError, Result};
    use crate::indexer::{FungibleBalance, FungibleIndexer, FungibleQueryResult};
    use crate::models::FungibleAsset;
    use crate::services::onchain::LaunchpadViews;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    pub fn asset(asset_type: &str, maximum: u128, supply: u128) -> FungibleAsset {
        FungibleAsset {
            maximum_v2: Some(maximum),
            supply_v2: Some(supply),
            name: format!("Asset {asset_type}"),
            symbol: "FA".to_string(),
            decimals: 2,
            asset_type: asset_type.to_string(),
            icon_uri: Some("https://icon".to_string()),
        }
    }

    #[derive(Default)]
    pub struct StubIndexer {
        pub assets: HashMap<String, FungibleAsset>,
        pub balance: Option<u128>,
        pub failing: Vec<String>,
        pub fail_all: bool,
        pub calls: AtomicUsize,
        pub accounts_seen: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl FungibleIndexer for StubIndexer {
        async fn fungible_query(
            &self,
            fa_address: &str,
            account: &str,
        ) -> Result<FungibleQueryResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.accounts_seen
                .lock()
                .expect("accounts")
                .push(account.to_string());
            if self.fail_all {
                return Err(AppError::Indexer("indexer unavailable".to_string()));
            }
            Ok(FungibleQueryResult {
                fungible_asset_metadata: self.assets.get(fa_address).cloned().into_iter().collect(),
                current_fungible_asset_balances: self
                    .balance
                    .map(|amount| FungibleBalance {
                        amount: Some(amount),
                    })
                    .into_iter()
                    .collect(),
            })
        }

        async fn fungible_asset_metadata(
            &self,
            asset_type: &str,
            _limit: u32,
        ) -> Result<Vec<FungibleAsset>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_all || self.failing.iter().any(|f| f == asset_type) {
                return Err(AppError::Indexer(format!("lookup failed for {asset_type}")));
            }
            Ok(self.assets.get(asset_type).cloned().into_iter().collect())
        }
    }

    #[derive(Default)]
    pub struct StubViews {
        pub mint_enabled: bool,
        pub user_mint_balance: u128,
        pub registry: Vec<AddressInput>,
        pub registry_fails: bool,
        pub apt_balance: u128,
        pub mint_balance_calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl LaunchpadViews for StubViews {
        async fn mint_enabled(&self, _fa_address: &str) -> Result<bool> {
            Ok(self.mint_enabled)
        }

        async fn user_mint_balance(&self, _user_address: &str, _fa_address: &str) -> Result<u128> {
            self.mint_balance_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.user_mint_balance)
        }

        async fn registry(&self) -> Result<Vec<AddressInput>> {
            if self.registry_fails {
                return Err(AppError::BlockchainRPC("view failed".to_string()));
            }
            Ok(self.registry.clone())
        }

        async fn account_apt_balance(&self, _address: &str) -> Result<u128> {
            Ok(self.apt_balance)
        }
    }
}
