//! Wire DTOs for the marketplace API (spec §3, §6).
//!
//! Thin serde structs only — the logical types that carry behavior (`Item`,
//! `ListedItem`, `Inventory`, `UpdateResult`) live in [`crate::inventory`].

pub mod batch;
pub mod common;
pub mod listing;
pub mod order;
pub mod product;
pub mod response;

pub use batch::{
    BatchCreateInput, BatchDeleteInput, BatchItemResult, BatchItemStatus, BatchKind, BatchStatus,
    BatchUpdateInput,
};
pub use common::{Currency, ListingStatus, OrderStatus};
pub use listing::{Adjustment, Listing, ListingDetail, Operation, OperationStatus, Payout};
pub use order::Order;
pub use product::{MarketData, Product, Variant};
pub use response::Response;
