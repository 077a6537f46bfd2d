//! Scoped mock-listing context (spec §4.9, C12), used to probe
//! account-specific fees at startup. Grounded on
//! `original_source/stockx/ext/mock.py` (`mock_listing`).
//!
//! Rust has no `async with`/context-manager sugar tied to a `finally`, so
//! this is a function taking a closure: the closure receives the listing
//! detail, and the delete-on-release path always runs afterward, success
//! or failure, matching the scoped-resource shape `tokio`-based libraries
//! use in place of a context manager.

use std::future::Future;
use std::time::Duration;

use crate::api::ListingsApi;
use crate::error::Result;
use crate::inventory::inventory::FeeParams;
use crate::models::{Currency, ListingDetail};

/// Deliberately high mock price (spec §4.9 default).
const MOCK_PRICE_MINOR_UNITS: i64 = 1000 * 100;

/// Poll budget for the create operation to leave `PENDING` (spec §4.9:
/// "wait for the create operation to succeed"; the source leaves the bound
/// unspecified, so this mirrors the batch orchestrator's poll timeout).
const CREATE_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Acquires a real, short-lived listing on the given variant (an
/// arbitrarily chosen product, from the caller's point of view), waits for
/// the create to succeed, fetches its detail, runs `body` with it, then
/// deletes it regardless of `body`'s outcome. Acquisition failure
/// propagates; release failure is logged and swallowed (spec §4.9).
pub async fn with_mock_listing<F, Fut, T>(
    listings: &ListingsApi,
    variant_id: &str,
    currency: Currency,
    body: F,
) -> Result<T>
where
    F: FnOnce(&ListingDetail) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let operation = listings
        .create_listing(variant_id, MOCK_PRICE_MINOR_UNITS, currency)
        .await?;
    listings
        .await_operation(&operation.operation_id, CREATE_POLL_TIMEOUT)
        .await?;

    let detail = listings.get_listing(&operation.listing_id).await?;

    let result = body(&detail).await;

    if let Err(error) = listings.delete_listing(&detail.listing.listing_id).await {
        tracing::warn!(
            listing_id = %detail.listing.listing_id,
            %error,
            "failed to release mock listing"
        );
    }

    result
}

/// Probes fee parameters by creating a mock listing and reading
/// `payout.adjustments` off its detail (spec §4.9).
pub(crate) async fn probe_fees(
    listings: &ListingsApi,
    variant_id: &str,
    currency: &Currency,
) -> Result<FeeParams> {
    let currency = *currency;
    with_mock_listing(listings, variant_id, currency, |detail| async move {
        Ok(fee_params_from_adjustments(detail))
    })
    .await
}

fn fee_params_from_adjustments(detail: &ListingDetail) -> FeeParams {
    let mut params = FeeParams::default();
    for adjustment in &detail.payout.adjustments {
        match adjustment.kind.as_str() {
            "TRANSACTION_FEE" => {
                params.transaction_fee = adjustment.amount as f64 / MOCK_PRICE_MINOR_UNITS as f64;
            }
            "PAYMENT_FEE" => {
                params.payment_fee = adjustment.amount as f64 / MOCK_PRICE_MINOR_UNITS as f64;
            }
            "SHIPPING_FEE" => {
                params.shipping_fee = adjustment.amount;
            }
            "MINIMUM_TRANSACTION_FEE" => {
                params.minimum_transaction_fee = adjustment.amount;
            }
            _ => {}
        }
    }
    params
}
