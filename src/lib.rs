//! Inventory orchestration SDK for a sneaker/collectibles marketplace.
//!
//! This crate provides an async client for managing a seller's inventory
//! end to end: OAuth-authenticated HTTP access, batch listing creation and
//! reconciliation, and a reconciliation engine ([`Inventory`]) that keeps a
//! logical set of items in sync with the marketplace's physical listings.
//!
//! # Quick Start
//!
//! ```ignore
//! use inventory_sdk::{Currency, Inventory, Item, MarketplaceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MarketplaceConfig::from_env()?;
//!     let client = inventory_sdk::client::HttpClient::new(config)?;
//!     client.initialize().await?;
//!
//!     let listings = inventory_sdk::api::ListingsApi::new(client.clone());
//!     let catalog = inventory_sdk::api::CatalogApi::new(client.clone());
//!     let batch = inventory_sdk::api::BatchApi::new(client);
//!
//!     let inventory = Inventory::new(
//!         Currency::Usd,
//!         listings,
//!         catalog,
//!         batch,
//!         100,
//!         std::time::Duration::from_secs(120),
//!     );
//!     inventory.load_fees("variant-1").await?;
//!
//!     let item = Item::new("product-1", "variant-1", 10_000, 3)?;
//!     let (listed, _result) = inventory.publish(vec![item]).await?;
//!     println!("published {} listed items", listed.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `MARKETPLACE_HOST`: API host (default: "api.marketplace.com")
//! - `MARKETPLACE_VERSION`: API version path segment (default: "v2")
//! - `MARKETPLACE_OAUTH_URL`: OAuth token endpoint
//! - `MARKETPLACE_CLIENT_ID`, `MARKETPLACE_CLIENT_SECRET`: OAuth client credentials
//! - `MARKETPLACE_AUDIENCE`: OAuth audience
//! - `MARKETPLACE_REFRESH_TOKEN`: OAuth refresh token
//! - `MARKETPLACE_API_KEY`: API key sent alongside the bearer token

pub mod api;
pub mod auth;
pub mod batch;
pub mod client;
pub mod error;
pub mod inventory;
pub mod models;

pub use auth::MarketplaceConfig;
pub use batch::BatchOrchestrator;
pub use client::HttpClient;
pub use error::{Error, Result};
pub use inventory::{
    BeatBy, BeatStrategy, BeatTarget, ComputedValue, ErrorDetail, FeeParams, Filter, Inventory,
    Item, ListedItem, ListedItemsQuery, UpdateResult,
};
pub use models::{
    Currency, Listing, ListingDetail, ListingStatus, MarketData, Operation, Order, OrderStatus,
    Product, Variant,
};
