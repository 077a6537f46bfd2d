//! Thin typed wrappers over [`crate::client::HttpClient`], one file per
//! resource family (spec §4.4), mirroring the teacher's `src/api/*.rs`
//! layout and grounded 1:1 on `original_source/stockx/api/*.py`.

pub mod batch;
pub mod catalog;
pub mod listings;
pub mod orders;

pub use batch::BatchApi;
pub use catalog::CatalogApi;
pub use listings::{ListListingsParams, ListingsApi};
pub use orders::{ListOrdersParams, OrdersApi};
