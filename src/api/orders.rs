//! Order endpoints (spec §4.4, §6), grounded on
//! `original_source/stockx/api/orders.py`. Minimal per the DTO Non-goal
//! (spec §1): only what the query engine and examples need to read orders.

use chrono::NaiveDate;

use crate::client::http::HttpClient;
use crate::client::pagination::PageNumberPaginator;
use crate::error::Result;
use crate::models::Order;

const DEFAULT_PAGE_SIZE: u32 = 100;

pub struct OrdersApi {
    client: HttpClient,
}

#[derive(Debug, Clone, Default)]
pub struct ListOrdersParams {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub order_status: Option<String>,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub sort_order: Option<String>,
}

impl ListOrdersParams {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(from) = self.from_date {
            params.push(("fromDate".to_string(), from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to_date {
            params.push(("toDate".to_string(), to.format("%Y-%m-%d").to_string()));
        }
        if let Some(status) = &self.order_status {
            params.push(("orderStatus".to_string(), status.clone()));
        }
        if let Some(product_id) = &self.product_id {
            params.push(("productId".to_string(), product_id.clone()));
        }
        if let Some(variant_id) = &self.variant_id {
            params.push(("variantId".to_string(), variant_id.clone()));
        }
        if let Some(sort_order) = &self.sort_order {
            params.push(("sortOrder".to_string(), sort_order.clone()));
        }
        params
    }
}

impl OrdersApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        let response: crate::models::Response<Order> =
            self.client.get(&format!("/orders/{order_id}"), &[]).await?;
        Ok(response.data)
    }

    pub fn list_active_orders(&self, params: ListOrdersParams, limit: Option<usize>) -> PageNumberPaginator {
        PageNumberPaginator::new(
            self.client.clone(),
            "/orders/active".to_string(),
            "orders".to_string(),
            params.to_query(),
            DEFAULT_PAGE_SIZE,
            limit,
            false,
        )
    }

    pub fn list_order_history(&self, params: ListOrdersParams, limit: Option<usize>) -> PageNumberPaginator {
        PageNumberPaginator::new(
            self.client.clone(),
            "/orders/history".to_string(),
            "orders".to_string(),
            params.to_query(),
            DEFAULT_PAGE_SIZE,
            limit,
            false,
        )
    }
}
