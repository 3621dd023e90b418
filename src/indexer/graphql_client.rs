use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

fn graphql_request(query: &str, variables: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "query": query,
        "variables": variables,
    })
}

/// Aptos indexer GraphQL client
#[derive(Debug, Clone)]
pub struct IndexerClient {
    indexer_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl IndexerClient {
    pub fn new(indexer_url: String, api_key: Option<String>) -> Self {
        Self {
            indexer_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn indexer_url(&self) -> &str {
        &self.indexer_url
    }

    /// Run a GraphQL document and decode its `data` field.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let request = graphql_request(query, variables);

        let mut builder = self.client.post(&self.indexer_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Indexer(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Indexer(format!("HTTP {}: {}", status, body.trim())));
        }

        let result: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|e| AppError::Indexer(e.to_string()))?;

        result.into_data()
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

impl<T> GraphqlResponse<T> {
    fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::Indexer(messages.join("; ")));
        }
        self.data
            .ok_or_else(|| AppError::Indexer("Response carried no data".to_string()))
    }
}
