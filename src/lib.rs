pub mod address;
pub mod amount;
pub mod api;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod indexer;
pub mod integrations;
pub mod models;
pub mod network;
pub mod services;
