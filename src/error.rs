//! Error types and taxonomy for the inventory SDK.

use thiserror::Error;

use crate::inventory::UpdateResult;
use crate::models::BatchItemResult;

/// Maximum items accepted per batch submission by the marketplace.
pub const MAX_BATCH_SIZE: usize = 500;

/// Sensible default batch size, kept well under [`MAX_BATCH_SIZE`] for a
/// smaller memory footprint per in-flight batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// HTTP status kinds the marketplace is known to return, one per relevant
/// status code (spec §7). Kept as a single enum rather than one exception
/// subclass per status, since Rust has no need for a class hierarchy here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    PayloadTooLarge,
    UnsupportedMediaType,
    RateLimited,
    InternalServerError,
    ServiceUnavailable,
    GatewayTimeout,
    Other(u16),
}

impl StatusKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => StatusKind::BadRequest,
            401 => StatusKind::Unauthorized,
            403 => StatusKind::Forbidden,
            404 => StatusKind::NotFound,
            413 => StatusKind::PayloadTooLarge,
            415 => StatusKind::UnsupportedMediaType,
            429 => StatusKind::RateLimited,
            500 => StatusKind::InternalServerError,
            503 => StatusKind::ServiceUnavailable,
            504 => StatusKind::GatewayTimeout,
            other => StatusKind::Other(other),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            StatusKind::BadRequest => 400,
            StatusKind::Unauthorized => 401,
            StatusKind::Forbidden => 403,
            StatusKind::NotFound => 404,
            StatusKind::PayloadTooLarge => 413,
            StatusKind::UnsupportedMediaType => 415,
            StatusKind::RateLimited => 429,
            StatusKind::InternalServerError => 500,
            StatusKind::ServiceUnavailable => 503,
            StatusKind::GatewayTimeout => 504,
            StatusKind::Other(code) => *code,
        }
    }

    /// Status codes considered transient and worth retrying (spec §4.1/§6).
    pub fn is_retryable(&self) -> bool {
        matches!(self.code(), 408 | 429 | 500 | 502 | 503 | 504)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A request was issued before or after the client reached `ready` state.
    #[error("client must be initialized before making requests")]
    NotInitialized,

    /// The marketplace returned a non-2xx HTTP status.
    #[error("request error ({}): {message}", status.code())]
    Request { status: StatusKind, message: String },

    /// Transport-level failure (connection reset, DNS failure, etc).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A batch did not finish within its poll budget.
    #[error("batch timeout: {} batch(es) still queued", timed_out_batch_ids.len())]
    BatchTimeout {
        timed_out_batch_ids: Vec<String>,
        partial_results: Vec<BatchItemResult>,
    },

    /// Reconciliation could not complete because one or more of its
    /// internal batches timed out.
    #[error("incomplete operation: {} batch(es) timed out", timed_out_batch_ids.len())]
    IncompleteOperation {
        partial_results: Vec<UpdateResult>,
        timed_out_batch_ids: Vec<String>,
    },

    /// A single (non-batch) listing operation exceeded its poll budget.
    #[error("operation {operation_id} timed out")]
    OperationTimeout { operation_id: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Error::Request {
            status: StatusKind::from_status(status),
            message: message.into(),
        }
    }

    /// Status code of this error, when it carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => Some(status.code()),
            _ => None,
        }
    }

    /// Whether the underlying failure is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Request { status, .. } => status.is_retryable(),
            Error::Http(_) => true,
            _ => false,
        }
    }
}
