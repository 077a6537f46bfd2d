//! Listing endpoints (spec §4.4, §6), grounded on
//! `original_source/stockx/api/listings.py`.

use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::Instant;

use crate::client::http::HttpClient;
use crate::client::pagination::{CursorPaginator, PageNumberPaginator};
use crate::error::{Error, Result};
use crate::models::{Currency, ListingDetail, Operation, OperationStatus};

const DEFAULT_PAGE_SIZE: u32 = 100;

/// Initial backoff for [`ListingsApi::await_operation`] (spec §4.9: "wait
/// for the create operation to succeed"), matching the batch poll's shape.
const INITIAL_POLL_DELAY: Duration = Duration::from_secs(1);

pub struct ListingsApi {
    client: HttpClient,
}

/// Server-side filter constraints pushed down to the listings paginator
/// (spec §4.8: "if only `product_ids` and/or `variant_ids` are constrained,
/// push them to the server paginator").
#[derive(Debug, Clone, Default)]
pub struct ListListingsParams {
    pub product_ids: Vec<String>,
    pub variant_ids: Vec<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub listing_statuses: Vec<String>,
    pub inventory_types: Vec<String>,
}

impl ListListingsParams {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !self.product_ids.is_empty() {
            params.push(("productIds".to_string(), self.product_ids.join(",")));
        }
        if !self.variant_ids.is_empty() {
            params.push(("variantIds".to_string(), self.variant_ids.join(",")));
        }
        if let Some(from) = self.from_date {
            params.push(("fromDate".to_string(), from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to_date {
            params.push(("toDate".to_string(), to.format("%Y-%m-%d").to_string()));
        }
        if !self.listing_statuses.is_empty() {
            params.push(("listingStatuses".to_string(), self.listing_statuses.join(",")));
        }
        if !self.inventory_types.is_empty() {
            params.push(("inventoryTypes".to_string(), self.inventory_types.join(",")));
        }
        params
    }
}

impl ListingsApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn get_listing(&self, listing_id: &str) -> Result<ListingDetail> {
        let response: crate::models::Response<ListingDetail> = self
            .client
            .get(&format!("/listings/{listing_id}"), &[])
            .await?;
        Ok(response.data)
    }

    /// Streams listings matching `params`, newest-last (forward mode).
    pub fn list_listings(&self, params: ListListingsParams, limit: Option<usize>) -> PageNumberPaginator {
        PageNumberPaginator::new(
            self.client.clone(),
            "/listings".to_string(),
            "listings".to_string(),
            params.to_query(),
            DEFAULT_PAGE_SIZE,
            limit,
            false,
        )
    }

    pub async fn create_listing(
        &self,
        variant_id: &str,
        amount_minor_units: i64,
        currency: Currency,
    ) -> Result<Operation> {
        let body = serde_json::json!({
            "variantId": variant_id,
            "amount": crate::models::common::amount_to_wire(amount_minor_units),
            "currencyCode": currency,
        });
        let response: crate::models::Response<Operation> =
            self.client.post("/listings", &body).await?;
        Ok(response.data)
    }

    pub async fn update_listing(
        &self,
        listing_id: &str,
        amount_minor_units: i64,
        currency: Currency,
    ) -> Result<Operation> {
        let body = serde_json::json!({
            "amount": crate::models::common::amount_to_wire(amount_minor_units),
            "currencyCode": currency,
        });
        let response: crate::models::Response<Operation> = self
            .client
            .patch(&format!("/listings/{listing_id}"), &body)
            .await?;
        Ok(response.data)
    }

    pub async fn activate_listing(&self, listing_id: &str) -> Result<Operation> {
        let body = serde_json::json!({ "active": true });
        let response: crate::models::Response<Operation> = self
            .client
            .put(&format!("/listings/{listing_id}/activate"), &body)
            .await?;
        Ok(response.data)
    }

    pub async fn deactivate_listing(&self, listing_id: &str) -> Result<Operation> {
        let body = serde_json::json!({ "active": false });
        let response: crate::models::Response<Operation> = self
            .client
            .put(&format!("/listings/{listing_id}/deactivate"), &body)
            .await?;
        Ok(response.data)
    }

    pub async fn delete_listing(&self, listing_id: &str) -> Result<Operation> {
        let response: crate::models::Response<Operation> = self
            .client
            .delete(&format!("/listings/{listing_id}"))
            .await?;
        Ok(response.data)
    }

    pub async fn get_listing_operation(&self, operation_id: &str) -> Result<Operation> {
        let response: crate::models::Response<Operation> = self
            .client
            .get(&format!("/listings/operations/{operation_id}"), &[])
            .await?;
        Ok(response.data)
    }

    /// Polls `operation_id` until it leaves `PENDING`, with the same
    /// doubling backoff as the batch orchestrator (spec §4.9). Returns
    /// `Err(OperationTimeout)` if `timeout` elapses first, and a generic
    /// request error if the operation itself reports `FAILED`.
    pub async fn await_operation(&self, operation_id: &str, timeout: Duration) -> Result<Operation> {
        let deadline = Instant::now() + timeout;
        let mut sleep_duration = INITIAL_POLL_DELAY;

        loop {
            let operation = self.get_listing_operation(operation_id).await?;
            match operation.status {
                OperationStatus::Succeeded => return Ok(operation),
                OperationStatus::Failed => {
                    return Err(Error::request(
                        0,
                        operation
                            .error
                            .clone()
                            .unwrap_or_else(|| "listing operation failed".to_string()),
                    ));
                }
                OperationStatus::Pending => {}
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::OperationTimeout {
                    operation_id: operation_id.to_string(),
                });
            }
            let this_sleep = sleep_duration.min(remaining);
            tokio::time::sleep(this_sleep).await;
            sleep_duration = (sleep_duration * 2).min(remaining.max(Duration::from_millis(1)));
        }
    }

    /// Streams listing operations via the cursor paginator.
    pub fn list_listing_operations(&self, limit: Option<usize>) -> CursorPaginator {
        CursorPaginator::new(
            self.client.clone(),
            "/listings/operations".to_string(),
            "operations".to_string(),
            Vec::new(),
            DEFAULT_PAGE_SIZE,
            limit,
        )
    }
}
