use crate::constants::{
    DEFAULT_PLACEHOLDER_ICON, IRYS_GATEWAY_URL, MINT_STATUS_REFRESH_SECS, QUERY_CACHE_TTL_SECS,
};
use crate::network::AptosNetwork;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub is_prod: bool,

    // Chain
    pub network: AptosNetwork,
    pub node_url: String,
    pub indexer_url: String,
    pub aptos_api_key: Option<String>,

    // Contract
    pub module_address: String,
    pub fa_address: String,

    // UI
    pub placeholder_icon: String,

    // Queries
    pub mint_status_refresh_secs: u64,
    pub query_cache_ttl_secs: u64,
    pub registry_resolve_concurrency: Option<usize>,

    // Storage network
    pub irys_gateway_url: String,

    // CORS
    pub cors_allowed_origins: String,
}

// Internal helper that checks conditions for `is_env_flag_enabled`.
fn is_env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
        })
        .unwrap_or(false)
}

// Internal helper that supports `env_non_empty` operations.
fn env_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let network = AptosNetwork::from_name(env_non_empty("APP_NETWORK").as_deref());

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            is_prod: is_env_flag_enabled("IS_PROD"),

            network,
            node_url: env_non_empty("APTOS_NODE_URL").unwrap_or_else(|| network.node_url()),
            indexer_url: env_non_empty("APTOS_INDEXER_URL")
                .unwrap_or_else(|| network.indexer_url()),
            aptos_api_key: env_non_empty("APTOS_API_KEY"),

            module_address: env::var("MODULE_ADDRESS")?,
            fa_address: env::var("FA_ADDRESS").unwrap_or_default(),

            placeholder_icon: env_non_empty("PLACEHOLDER_ICON")
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER_ICON.to_string()),

            mint_status_refresh_secs: env::var("MINT_STATUS_REFRESH_SECS")
                .unwrap_or_else(|_| MINT_STATUS_REFRESH_SECS.to_string())
                .parse()?,
            query_cache_ttl_secs: env::var("QUERY_CACHE_TTL_SECS")
                .unwrap_or_else(|_| QUERY_CACHE_TTL_SECS.to_string())
                .parse()?,
            registry_resolve_concurrency: env::var("REGISTRY_RESOLVE_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|value| *value > 0),

            irys_gateway_url: env_non_empty("IRYS_GATEWAY_URL")
                .unwrap_or_else(|| IRYS_GATEWAY_URL.to_string()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.module_address.trim().is_empty() {
            anyhow::bail!("MODULE_ADDRESS is empty");
        }
        if url::Url::parse(&self.node_url).is_err() {
            anyhow::bail!("APTOS_NODE_URL is not a valid URL: {}", self.node_url);
        }
        if url::Url::parse(&self.indexer_url).is_err() {
            anyhow::bail!("APTOS_INDEXER_URL is not a valid URL: {}", self.indexer_url);
        }
        if self.mint_status_refresh_secs == 0 {
            anyhow::bail!("MINT_STATUS_REFRESH_SECS must be > 0");
        }

        if self.fa_address.trim().is_empty() {
            tracing::warn!("FA_ADDRESS is empty; live mint status will stay unavailable");
        }
        if self.aptos_api_key.is_none() {
            tracing::warn!("APTOS_API_KEY not set; public rate limits apply");
        }
        if self.registry_resolve_concurrency.is_none() {
            tracing::warn!("REGISTRY_RESOLVE_CONCURRENCY not set; registry lookups are unbounded");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn mint_status_refresh(&self) -> Duration {
        Duration::from_secs(self.mint_status_refresh_secs)
    }

    pub fn query_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.query_cache_ttl_secs)
    }

    pub fn explorer_object_url(&self, object_address: &str) -> String {
        format!(
            "{}/object/{}?network={}",
            crate::constants::APTOS_EXPLORER_URL,
            object_address,
            self.network
        )
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        let network = AptosNetwork::Testnet;
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "test".to_string(),
            is_prod: false,
            network,
            node_url: network.node_url(),
            indexer_url: network.indexer_url(),
            aptos_api_key: None,
            module_address: "0xcafe".to_string(),
            fa_address: "0xfa".to_string(),
            placeholder_icon: DEFAULT_PLACEHOLDER_ICON.to_string(),
            mint_status_refresh_secs: MINT_STATUS_REFRESH_SECS,
            query_cache_ttl_secs: QUERY_CACHE_TTL_SECS,
            registry_resolve_concurrency: None,
            irys_gateway_url: IRYS_GATEWAY_URL.to_string(),
            cors_allowed_origins: "*".to_string(),
        }
    }
}
