use super::wallet::{AdaptedWallet, EntryFunctionPayload, WalletSession};
use crate::constants::{APTOS_TRANSFER_FUNCTION, IRYS_TOKEN};
use crate::network::{AptosNetwork, UploadNetwork};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error raised by the upload SDK, keeping whatever the node answered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct UploadSdkError {
    pub message: String,
    pub response: Option<UploadErrorResponse>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadErrorResponse {
    pub status: u16,
    pub data: Option<Value>,
}

impl UploadSdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    pub fn with_response(message: impl Into<String>, status: u16, data: Option<Value>) -> Self {
        Self {
            message: message.into(),
            response: Some(UploadErrorResponse { status, data }),
        }
    }

    /// Most specific detail available: `response.data.message`, then `response.data`,
    /// then the top-level message.
    pub fn detail(&self) -> String {
        let data = self
            .response
            .as_ref()
            .and_then(|response| response.data.as_ref())
            .filter(|data| !data.is_null());

        if let Some(data) = data {
            if let Some(message) = data.get("message").filter(|m| !m.is_null()) {
                return match message {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
            }
            return match data {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
        }
        self.message.clone()
    }
}

pub type UploadResult<T> = std::result::Result<T, UploadSdkError>;

pub const UPLOAD_UNSUPPORTED: &str =
    "uploading requires a signed data item, which is not supported";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundReceipt {
    pub id: String,
    pub quantity: u128,
    pub target: String,
}

/// Storage-network operations the upload flow relies on. Amounts are atomic units of
/// the paying token.
#[async_trait::async_trait]
pub trait UploadSdk: Send + Sync {
    fn token(&self) -> &str;

    async fn get_price(&self, bytes: u64) -> UploadResult<u128>;

    /// Balance already deposited on the storage network by the connected account.
    async fn get_balance(&self) -> UploadResult<u128>;

    async fn fund(&self, amount: u128) -> UploadResult<FundReceipt>;

    async fn upload_file(&self, file: &UploadFile, tags: &[Tag]) -> UploadResult<UploadReceipt>;
}

/// Raw HTTP access to an Irys bundler node.
#[derive(Debug, Clone)]
pub struct IrysNode {
    node_url: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    #[serde(default)]
    addresses: std::collections::HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: Value,
}

async fn error_from_response(context: &str, response: reqwest::Response) -> UploadSdkError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let data = if body.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body)))
    };
    UploadSdkError::with_response(
        format!("{} failed with status {}", context, status.as_u16()),
        status.as_u16(),
        data,
    )
}

fn parse_atomic(context: &str, value: &Value) -> UploadResult<u128> {
    crate::amount::amount_from_json(value)
        .ok_or_else(|| UploadSdkError::new(format!("{context}: unexpected amount {value}")))
}

impl IrysNode {
    pub fn new(node_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            node_url: node_url.into(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn for_network(network: UploadNetwork) -> Self {
        Self::new(network.node_url(), IRYS_TOKEN)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.node_url.trim_end_matches('/'), path)
    }

    pub async fn price(&self, bytes: u64) -> UploadResult<u128> {
        let response = self
            .client
            .get(self.url(&format!("price/{}/{}", self.token, bytes)))
            .send()
            .await
            .map_err(|e| UploadSdkError::new(e.to_string()))?;
        if !response.status().is_success() {
            return Err(error_from_response("price", response).await);
        }
        let body = response
            .text()
            .await
            .map_err(|e| UploadSdkError::new(e.to_string()))?;
        let value = serde_json::from_str::<Value>(body.trim())
            .unwrap_or_else(|_| Value::String(body.trim().to_string()));
        parse_atomic("price", &value)
    }

    pub async fn balance(&self, address: &str) -> UploadResult<u128> {
        let mut url = url::Url::parse(&self.url(&format!("account/balance/{}", self.token)))
            .map_err(|e| UploadSdkError::new(format!("Invalid Irys URL: {}", e)))?;
        url.query_pairs_mut().append_pair("address", address);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UploadSdkError::new(e.to_string()))?;
        if !response.status().is_success() {
            return Err(error_from_response("balance", response).await);
        }
        let body: BalanceResponse = response
            .json()
            .await
            .map_err(|e| UploadSdkError::new(e.to_string()))?;
        parse_atomic("balance", &body.balance)
    }

    /// Address the node expects deposits on for this token.
    pub async fn deposit_address(&self) -> UploadResult<String> {
        let response = self
            .client
            .get(self.url("info"))
            .send()
            .await
            .map_err(|e| UploadSdkError::new(e.to_string()))?;
        if !response.status().is_success() {
            return Err(error_from_response("info", response).await);
        }
        let info: NodeInfo = response
            .json()
            .await
            .map_err(|e| UploadSdkError::new(e.to_string()))?;
        info.addresses
            .get(&self.token)
            .cloned()
            .ok_or_else(|| UploadSdkError::new(format!("node has no {} address", self.token)))
    }

    /// Tell the node about a deposit transaction so it credits the balance.
    pub async fn register_fund(&self, tx_id: &str) -> UploadResult<()> {
        let response = self
            .client
            .post(self.url(&format!("account/balance/{}", self.token)))
            .json(&serde_json::json!({ "tx_id": tx_id }))
            .send()
            .await
            .map_err(|e| UploadSdkError::new(e.to_string()))?;
        if !response.status().is_success() {
            return Err(error_from_response("fund", response).await);
        }
        Ok(())
    }
}

/// `UploadSdk` over an Irys node, paying and signing through the connected wallet.
pub struct IrysUploader<W> {
    node: IrysNode,
    wallet: AdaptedWallet<W>,
    chain: AptosNetwork,
}

impl<W: WalletSession> IrysUploader<W> {
    /// The wallet's network decides the bundler; testnet wallets use devnet.
    pub fn new(wallet: W) -> Self {
        let chain = AptosNetwork::from_name(wallet.network_name().as_deref());
        let node = IrysNode::for_network(chain.upload_network());
        Self::with_node(wallet, node)
    }

    pub fn with_node(wallet: W, node: IrysNode) -> Self {
        let chain = AptosNetwork::from_name(wallet.network_name().as_deref());
        Self {
            node,
            wallet: AdaptedWallet::new(wallet),
            chain,
        }
    }

    pub fn chain(&self) -> AptosNetwork {
        self.chain
    }

    pub fn wallet(&self) -> &AdaptedWallet<W> {
        &self.wallet
    }

    fn connected_address(&self) -> UploadResult<String> {
        self.wallet
            .address()
            .ok_or_else(|| UploadSdkError::new("wallet is not connected"))
    }
}

#[async_trait::async_trait]
impl<W: WalletSession> UploadSdk for IrysUploader<W> {
    fn token(&self) -> &str {
        self.node.token()
    }

    async fn get_price(&self, bytes: u64) -> UploadResult<u128> {
        self.node.price(bytes).await
    }

    async fn get_balance(&self) -> UploadResult<u128> {
        let address = self.connected_address()?;
        self.node.balance(&address).await
    }

    async fn fund(&self, amount: u128) -> UploadResult<FundReceipt> {
        let target = self.node.deposit_address().await?;
        let pending = self
            .wallet
            .sign_and_submit_transaction(EntryFunctionPayload {
                function: APTOS_TRANSFER_FUNCTION.to_string(),
                type_arguments: Vec::new(),
                arguments: vec![
                    serde_json::json!(target),
                    serde_json::json!(amount.to_string()),
                ],
            })
            .await
            .map_err(|e| UploadSdkError::new(e.to_string()))?;
        self.node.register_fund(&pending.hash).await?;
        Ok(FundReceipt {
            id: pending.hash,
            quantity: amount,
            target,
        })
    }

    /// Bundlers only accept signed ANS-104 data items, which this client does not build.
    /// Funding and pricing work; the upload itself is reported as unsupported.
    async fn upload_file(&self, file: &UploadFile, _tags: &[Tag]) -> UploadResult<UploadReceipt> {
        tracing::warn!(
            "Refusing to upload {} ({} bytes): data item signing is not supported",
            file.name,
            file.size()
        );
        Err(UploadSdkError::new(UPLOAD_UNSUPPORTED))
    }
}

#[cfg(test)]
mod tests {
    use super::super::wallet::test_support::StubWallet;
    use super::*;

    #[test]
    fn detail_prefers_nested_response_message() {
        let err = UploadSdkError::with_response(
            "Request failed with status code 402",
            402,
            Some(serde_json::json!({ "message": "Not enough balance for transaction" })),
        );
        assert_eq!(err.detail(), "Not enough balance for transaction");
    }

    #[test]
    fn detail_falls_back_to_response_data_then_message() {
        let err = UploadSdkError::with_response(
            "Request failed",
            500,
            Some(serde_json::json!("Internal bundler error")),
        );
        assert_eq!(err.detail(), "Internal bundler error");

        let err = UploadSdkError::with_response("Request failed", 500, None);
        assert_eq!(err.detail(), "Request failed");

        let err = UploadSdkError::new("network down");
        assert_eq!(err.detail(), "network down");
    }

    #[test]
    fn uploader_picks_bundler_from_wallet_network() {
        let mut wallet = StubWallet::connected("0x1");
        wallet.network = Some("Testnet".to_string());
        let uploader = IrysUploader::new(wallet);
        assert_eq!(uploader.chain(), AptosNetwork::Testnet);
        assert_eq!(uploader.node.url("info"), "https://devnet.irys.xyz/info");

        let mut wallet = StubWallet::connected("0x1");
        wallet.network = Some("mainnet".to_string());
        let uploader = IrysUploader::new(wallet);
        assert_eq!(uploader.node.url("info"), "https://uploader.irys.xyz/info");
        assert_eq!(uploader.token(), "aptos");
    }

    #[tokio::test]
    async fn upload_is_reported_unsupported() {
        let uploader = IrysUploader::new(StubWallet::connected("0x1"));
        let file = UploadFile::new("icon.png", b"hello".to_vec());
        let err = uploader
            .upload_file(&file, &[])
            .await
            .expect_err("unsupported");
        assert_eq!(err.detail(), UPLOAD_UNSUPPORTED);
        assert_eq!(file.size(), 5);
    }

    #[test]
    fn sdk_error_displays_its_message() {
        let err = UploadSdkError::with_response("Request failed with status code 402", 402, None);
        assert_eq!(err.to_string(), "Request failed with status code 402");
    }

    #[tokio::test]
    async fn balance_requires_connected_wallet() {
        let mut wallet = StubWallet::connected("0x1");
        wallet.account = None;
        let uploader = IrysUploader::new(wallet);
        let err = uploader.get_balance().await.expect_err("no wallet");
        assert_eq!(err.detail(), "wallet is not connected");
    }
}
