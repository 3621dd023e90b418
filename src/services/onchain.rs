use crate::{
    address::AddressInput,
    amount::amount_from_json,
    config::Config,
    constants::{APTOS_COIN_TYPE, COIN_BALANCE_FUNCTION, LAUNCHPAD_MODULE},
    error::{AppError, Result},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ViewRequest {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<serde_json::Value>,
}

impl ViewRequest {
    pub fn new(function: impl Into<String>, arguments: Vec<serde_json::Value>) -> Self {
        Self {
            function: function.into(),
            type_arguments: Vec::new(),
            arguments,
        }
    }

    pub fn with_type_arguments(mut self, type_arguments: Vec<String>) -> Self {
        self.type_arguments = type_arguments;
        self
    }
}

/// Read-only calls into the launchpad contract and the framework.
#[async_trait::async_trait]
pub trait LaunchpadViews: Send + Sync {
    async fn mint_enabled(&self, fa_address: &str) -> Result<bool>;

    /// Cumulative amount `user_address` has minted of `fa_address`, in raw units.
    async fn user_mint_balance(&self, user_address: &str, fa_address: &str) -> Result<u128>;

    /// Fungible asset objects registered by the launchpad.
    async fn registry(&self) -> Result<Vec<AddressInput>>;

    async fn account_apt_balance(&self, address: &str) -> Result<u128>;
}

/// Aptos fullnode view-function client
#[derive(Debug, Clone)]
pub struct OnchainReader {
    node_url: String,
    module_address: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OnchainReader {
    pub fn new(node_url: String, module_address: String, api_key: Option<String>) -> Self {
        Self {
            node_url,
            module_address,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.node_url.clone(),
            config.module_address.clone(),
            config.aptos_api_key.clone(),
        )
    }

    fn launchpad_function(&self, name: &str) -> String {
        format!("{}::{}::{}", self.module_address, LAUNCHPAD_MODULE, name)
    }

    /// POST /view and return the raw result vector.
    pub async fn view(&self, request: &ViewRequest) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/view", self.node_url.trim_end_matches('/'));
        let mut builder = self.client.post(url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::BlockchainRPC(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BlockchainRPC(format!(
                "view {} failed with HTTP {}: {}",
                request.function,
                status,
                body.trim()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::BlockchainRPC(e.to_string()))
    }
}

fn first_value<'a>(
    function: &str,
    values: &'a [serde_json::Value],
) -> Result<&'a serde_json::Value> {
    values
        .first()
        .ok_or_else(|| AppError::BlockchainRPC(format!("view {} returned no values", function)))
}

pub fn parse_bool_result(function: &str, values: &[serde_json::Value]) -> Result<bool> {
    first_value(function, values)?
        .as_bool()
        .ok_or_else(|| AppError::BlockchainRPC(format!("view {} did not return a bool", function)))
}

pub fn parse_amount_result(function: &str, values: &[serde_json::Value]) -> Result<u128> {
    amount_from_json(first_value(function, values)?)
        .ok_or_else(|| {
            AppError::BlockchainRPC(format!("view {} did not return an amount", function))
        })
}

pub fn parse_registry_result(values: &[serde_json::Value]) -> Result<Vec<AddressInput>> {
    let Some(first) = values.first() else {
        return Ok(Vec::new());
    };
    serde_json::from_value(first.clone())
        .map_err(|e| AppError::BlockchainRPC(format!("Invalid registry payload: {}", e)))
}

#[async_trait::async_trait]
impl LaunchpadViews for OnchainReader {
    async fn mint_enabled(&self, fa_address: &str) -> Result<bool> {
        let function = self.launchpad_function("is_mint_enabled");
        let values = self
            .view(&ViewRequest::new(
                function.as_str(),
                vec![serde_json::json!(fa_address)],
            ))
            .await?;
        parse_bool_result(&function, &values)
    }

    async fn user_mint_balance(&self, user_address: &str, fa_address: &str) -> Result<u128> {
        let function = self.launchpad_function("get_mint_balance");
        let values = self
            .view(&ViewRequest::new(
                function.as_str(),
                vec![serde_json::json!(fa_address), serde_json::json!(user_address)],
            ))
            .await?;
        parse_amount_result(&function, &values)
    }

    async fn registry(&self) -> Result<Vec<AddressInput>> {
        let function = self.launchpad_function("get_registry");
        let values = self.view(&ViewRequest::new(function, Vec::new())).await?;
        parse_registry_result(&values)
    }

    async fn account_apt_balance(&self, address: &str) -> Result<u128> {
        let request = ViewRequest::new(COIN_BALANCE_FUNCTION, vec![serde_json::json!(address)])
            .with_type_arguments(vec![APTOS_COIN_TYPE.to_string()]);
        let values = self.view(&request).await?;
        parse_amount_result(COIN_BALANCE_FUNCTION, &values)
    }
}
