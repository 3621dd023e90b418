// src/models/mod.rs
pub mod asset;

// Re-export commonly used types from asset.rs so other modules can use `crate::models::X`
pub use asset::{
    ApiResponse,
    AssetRow,
    FungibleAsset,
    MintData,
    MintStatusUpdate,
};
