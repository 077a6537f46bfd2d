//! HTTP client and cross-cutting request policies (spec §4.1, §4.2, §4.3).

pub mod cache;
pub mod http;
pub mod pagination;
pub mod retry;
pub mod throttle;

pub use cache::Cache;
pub use http::HttpClient;
pub use pagination::{CursorPaginator, PageNumberPaginator};
pub use retry::RetryPolicy;
pub use throttle::Throttle;
