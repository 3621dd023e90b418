use crate::constants::{IRYS_DEVNET_NODE_URL, IRYS_MAINNET_NODE_URL};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AptosNetwork {
    Mainnet,
    Testnet,
    Devnet,
}

/// Irys only runs mainnet and devnet bundlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadNetwork {
    Mainnet,
    Devnet,
}

impl AptosNetwork {
    /// Loose match on a wallet/config network name; anything unknown is testnet.
    pub fn from_name(name: Option<&str>) -> Self {
        let normalized = name.unwrap_or_default().trim().to_ascii_lowercase();
        if normalized.contains("main") {
            AptosNetwork::Mainnet
        } else if normalized.contains("dev") {
            AptosNetwork::Devnet
        } else {
            AptosNetwork::Testnet
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AptosNetwork::Mainnet => "mainnet",
            AptosNetwork::Testnet => "testnet",
            AptosNetwork::Devnet => "devnet",
        }
    }

    pub fn node_url(&self) -> String {
        format!("https://api.{}.aptoslabs.com/v1", self.as_str())
    }

    pub fn indexer_url(&self) -> String {
        format!("https://api.{}.aptoslabs.com/v1/graphql", self.as_str())
    }

    pub fn upload_network(&self) -> UploadNetwork {
        match self {
            AptosNetwork::Mainnet => UploadNetwork::Mainnet,
            AptosNetwork::Testnet | AptosNetwork::Devnet => UploadNetwork::Devnet,
        }
    }
}

impl fmt::Display for AptosNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl UploadNetwork {
    pub fn node_url(&self) -> &'static str {
        match self {
            UploadNetwork::Mainnet => IRYS_MAINNET_NODE_URL,
            UploadNetwork::Devnet => IRYS_DEVNET_NODE_URL,
        }
    }
}
