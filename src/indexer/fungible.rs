use super::graphql_client::IndexerClient;
use crate::amount::deserialize_optional_amount;
use crate::error::Result;
use crate::models::FungibleAsset;
use serde::Deserialize;

pub const FUNGIBLE_QUERY: &str = r#"
query FungibleQuery($fa_address: String, $account: String) {
  fungible_asset_metadata(where: {asset_type: {_eq: $fa_address}}) {
    maximum_v2
    supply_v2
    name
    symbol
    decimals
    asset_type
    icon_uri
  }
  current_fungible_asset_balances(
    where: {owner_address: {_eq: $account}, asset_type: {_eq: $fa_address}}
    distinct_on: asset_type
    limit: 1
  ) {
    amount
  }
}"#;

pub const FUNGIBLE_METADATA_QUERY: &str = r#"
query FungibleAssetMetadata($asset_type: String, $limit: Int) {
  fungible_asset_metadata(where: {asset_type: {_eq: $asset_type}}, limit: $limit) {
    maximum_v2
    supply_v2
    name
    symbol
    decimals
    asset_type
    icon_uri
  }
}"#;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FungibleQueryResult {
    #[serde(default)]
    pub fungible_asset_metadata: Vec<FungibleAsset>,
    #[serde(default)]
    pub current_fungible_asset_balances: Vec<FungibleBalance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FungibleBalance {
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<u128>,
}

#[derive(Debug, Deserialize)]
struct MetadataQueryResult {
    #[serde(default)]
    fungible_asset_metadata: Vec<FungibleAsset>,
}

#[async_trait::async_trait]
pub trait FungibleIndexer: Send + Sync {
    /// Metadata of `fa_address` plus `account`'s balance of it, in one round-trip.
    async fn fungible_query(&self, fa_address: &str, account: &str)
        -> Result<FungibleQueryResult>;

    /// Metadata rows whose asset type equals `asset_type` exactly.
    async fn fungible_asset_metadata(
        &self,
        asset_type: &str,
        limit: u32,
    ) -> Result<Vec<FungibleAsset>>;
}

#[async_trait::async_trait]
impl FungibleIndexer for IndexerClient {
    async fn fungible_query(
        &self,
        fa_address: &str,
        account: &str,
    ) -> Result<FungibleQueryResult> {
        self.query(
            FUNGIBLE_QUERY,
            serde_json::json!({
                "fa_address": fa_address,
                "account": account,
            }),
        )
        .await
    }

    async fn fungible_asset_metadata(
        &self,
        asset_type: &str,
        limit: u32,
    ) -> Result<Vec<FungibleAsset>> {
        let result: MetadataQueryResult = self
            .query(
                FUNGIBLE_METADATA_QUERY,
                serde_json::json!({
                    "asset_type": asset_type,
                    "limit": limit,
                }),
            )
            .await?;
        Ok(result.fungible_asset_metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fungible_query_keeps_distinct_single_balance_row() {
        assert!(FUNGIBLE_QUERY
            .contains("query FungibleQuery($fa_address: String, $account: String)"));
        assert!(FUNGIBLE_QUERY.contains("distinct_on: asset_type"));
        assert!(FUNGIBLE_QUERY.contains("limit: 1"));
        assert!(FUNGIBLE_QUERY.contains("owner_address: {_eq: $account}"));
    }

    #[test]
    fn query_result_decodes_rows() {
        let result: FungibleQueryResult = serde_json::from_value(serde_json::json!({
            "fungible_asset_metadata": [{
                "maximum_v2": 1000,
                "supply_v2": 10,
                "name": "Launch",
                "symbol": "LCH",
                "decimals": 0,
                "asset_type": "0xfa",
                "icon_uri": "https://icon"
            }],
            "current_fungible_asset_balances": [{ "amount": "7" }]
        }))
        .expect("result");
        assert_eq!(result.fungible_asset_metadata.len(), 1);
        assert_eq!(result.current_fungible_asset_balances[0].amount, Some(7));
    }

    #[test]
    fn missing_tables_decode_as_empty() {
        let result: FungibleQueryResult =
            serde_json::from_value(serde_json::json!({})).expect("result");
        assert!(result.fungible_asset_metadata.is_empty());
        assert!(result.current_fungible_asset_balances.is_empty());
    }
}
