pub mod fungible;
pub mod graphql_client;

pub use fungible::{FungibleBalance, FungibleIndexer, FungibleQueryResult};
pub use graphql_client::IndexerClient;
