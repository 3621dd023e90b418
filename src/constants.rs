/// Application constants

// API version
pub const API_VERSION: &str = "v1";

// Aptos framework
pub const APTOS_COIN_TYPE: &str = "0x1::aptos_coin::AptosCoin";
pub const COIN_BALANCE_FUNCTION: &str = "0x1::coin::balance";
pub const APTOS_TRANSFER_FUNCTION: &str = "0x1::aptos_account::transfer";
pub const LAUNCHPAD_MODULE: &str = "launchpad";

// Indexer query
pub const APP_STATE_QUERY_KEY: &str = "app-state";

// Refresh / caching
pub const MINT_STATUS_REFRESH_SECS: u64 = 30;
pub const QUERY_CACHE_TTL_SECS: u64 = 30;

// Registry icons
pub const DEFAULT_PLACEHOLDER_ICON: &str = "https://placehold.co/64x64/png?text=FA";

// Storage network (Irys)
pub const IRYS_TOKEN: &str = "aptos";
pub const IRYS_SIGN_NONCE: &str = "irys";
pub const IRYS_GATEWAY_URL: &str = "https://gateway.irys.xyz";
pub const IRYS_MAINNET_NODE_URL: &str = "https://uploader.irys.xyz";
pub const IRYS_DEVNET_NODE_URL: &str = "https://devnet.irys.xyz";
pub const IRYS_DEFAULT_FUND_AMOUNT: u128 = 1_000_000;

// Explorer
pub const APTOS_EXPLORER_URL: &str = "https://explorer.aptoslabs.com";
