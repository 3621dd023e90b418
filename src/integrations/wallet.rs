//! Wallet session seam and the adapter that reshapes it for the upload SDK.

use crate::address::AccountAddress;
use crate::constants::IRYS_SIGN_NONCE;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyRepr {
    Hex(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressRepr {
    Text(String),
    Account(AccountAddress),
}

impl AddressRepr {
    pub fn as_string(&self) -> String {
        match self {
            AddressRepr::Text(value) => value.clone(),
            AddressRepr::Account(address) => address.to_string_long(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAccount {
    pub address: AddressRepr,
    pub public_key: PublicKeyRepr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignMessagePayload {
    pub message: String,
    pub nonce: String,
    pub address: bool,
    pub chain_id: bool,
    pub application: bool,
}

/// Signature as returned by wallets: a hex string, an object with one of the known
/// fields, or anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignatureRepr {
    Text(String),
    Fields {
        #[serde(default)]
        signature: Option<Value>,
        #[serde(default)]
        ed25519: Option<Value>,
        #[serde(default)]
        data: Option<Value>,
    },
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignMessageResponse {
    pub signature: SignatureRepr,
    #[serde(default)]
    pub full_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryFunctionPayload {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PendingTransaction {
    pub hash: String,
}

/// Capabilities of a connected wallet, owned by the wallet adapter.
#[async_trait::async_trait]
pub trait WalletSession: Send + Sync {
    fn account(&self) -> Option<WalletAccount>;

    fn network_name(&self) -> Option<String>;

    async fn sign_message(&self, payload: SignMessagePayload) -> Result<SignMessageResponse>;

    async fn sign_and_submit_transaction(
        &self,
        payload: EntryFunctionPayload,
    ) -> Result<PendingTransaction>;
}

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn with_hex_prefix(value: &str) -> String {
    if value.starts_with("0x") {
        value.to_string()
    } else {
        format!("0x{value}")
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Coerces any wallet signature shape into a `0x`-prefixed string.
pub fn normalize_signature(signature: &SignatureRepr) -> String {
    match signature {
        SignatureRepr::Text(text) if text.is_empty() => "0x".to_string(),
        SignatureRepr::Text(text) => with_hex_prefix(text),
        SignatureRepr::Fields {
            signature,
            ed25519,
            data,
        } => {
            let picked = [signature, ed25519, data]
                .into_iter()
                .flatten()
                .find(|value| !value.is_null())
                .map(value_to_text)
                .unwrap_or_default();
            with_hex_prefix(&picked)
        }
        SignatureRepr::Other(Value::Null) | SignatureRepr::Other(Value::Bool(false)) => {
            "0x".to_string()
        }
        SignatureRepr::Other(other) => with_hex_prefix(&value_to_text(other)),
    }
}

/// Wrapper handing the upload SDK a wallet with string keys/addresses, a fixed
/// sign-message payload, and hex signatures. Which key signs, and what text is signed,
/// stay with the inner session.
#[derive(Debug, Clone)]
pub struct AdaptedWallet<W> {
    inner: W,
}

impl<W: WalletSession> AdaptedWallet<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }

    /// Canonical address string of the connected account, if any.
    pub fn address(&self) -> Option<String> {
        self.account().map(|account| account.address.as_string())
    }

    /// Hex public key of the connected account, if any.
    pub fn public_key_hex(&self) -> Option<String> {
        self.account().and_then(|account| match account.public_key {
            PublicKeyRepr::Hex(hex) => Some(hex),
            PublicKeyRepr::Bytes(_) => None,
        })
    }
}

#[async_trait::async_trait]
impl<W: WalletSession> WalletSession for AdaptedWallet<W> {
    fn account(&self) -> Option<WalletAccount> {
        let account = self.inner.account()?;
        let public_key = match account.public_key {
            PublicKeyRepr::Bytes(bytes) => PublicKeyRepr::Hex(bytes_to_hex(&bytes)),
            hex @ PublicKeyRepr::Hex(_) => hex,
        };
        let address = match account.address {
            AddressRepr::Account(address) => AddressRepr::Text(address.to_string_long()),
            text @ AddressRepr::Text(_) => text,
        };
        Some(WalletAccount {
            address,
            public_key,
        })
    }

    fn network_name(&self) -> Option<String> {
        self.inner.network_name()
    }

    async fn sign_message(&self, payload: SignMessagePayload) -> Result<SignMessageResponse> {
        let mut response = self
            .inner
            .sign_message(SignMessagePayload {
                message: payload.message,
                nonce: IRYS_SIGN_NONCE.to_string(),
                address: false,
                chain_id: false,
                application: false,
            })
            .await?;
        response.signature = SignatureRepr::Text(normalize_signature(&response.signature));
        Ok(response)
    }

    async fn sign_and_submit_transaction(
        &self,
        payload: EntryFunctionPayload,
    ) -> Result<PendingTransaction> {
        self.inner.sign_and_submit_transaction(payload).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    /// Scripted wallet recording every request it receives.
    pub struct StubWallet {
        pub account: Option<WalletAccount>,
        pub network: Option<String>,
        pub signature: Option<SignatureRepr>,
        pub tx_hash: Option<String>,
        pub sign_requests: Mutex<Vec<SignMessagePayload>>,
        pub submitted: Mutex<Vec<EntryFunctionPayload>>,
    }

    impl StubWallet {
        pub fn connected(address: &str) -> Self {
            Self {
                account: Some(WalletAccount {
                    address: AddressRepr::Text(address.to_string()),
                    public_key: PublicKeyRepr::Bytes(vec![0xab, 0xcd]),
                }),
                network: Some("testnet".to_string()),
                signature: Some(SignatureRepr::Text("abcd".to_string())),
                tx_hash: Some("0xfeed".to_string()),
                sign_requests: Mutex::new(Vec::new()),
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl WalletSession for StubWallet {
        fn account(&self) -> Option<WalletAccount> {
            self.account.clone()
        }

        fn network_name(&self) -> Option<String> {
            self.network.clone()
        }

        async fn sign_message(&self, payload: SignMessagePayload) -> Result<SignMessageResponse> {
            self.sign_requests
                .lock()
                .expect("sign requests")
                .push(payload.clone());
            let signature = self
                .signature
                .clone()
                .ok_or_else(|| AppError::Wallet("User rejected the request".to_string()))?;
            Ok(SignMessageResponse {
                signature,
                full_message: Some(payload.message),
            })
        }

        async fn sign_and_submit_transaction(
            &self,
            payload: EntryFunctionPayload,
        ) -> Result<PendingTransaction> {
            self.submitted.lock().expect("submitted").push(payload);
            let hash = self
                .tx_hash
                .clone()
                .ok_or_else(|| AppError::Wallet("Transaction rejected".to_string()))?;
            Ok(PendingTransaction { hash })
        }
    }
}
