//! Catalog endpoints (spec §4.4, §6), grounded on
//! `original_source/stockx/api/catalog.py`.
//!
//! Product/variant lookups are cached indefinitely; per-variant market data
//! is cached 30s (spec §4.4), following
//! `original_source/stockx/cache.py`'s `cache_by(..., ttl=...)` pattern.

use std::time::Duration;

use crate::client::{Cache, HttpClient};
use crate::error::Result;
use crate::models::{Currency, MarketData, Product, Variant};

const MARKET_DATA_TTL: Duration = Duration::from_secs(30);

pub struct CatalogApi {
    client: HttpClient,
    products: Cache<String, Product>,
    variants: Cache<String, Vec<Variant>>,
    market_data: Cache<(String, Currency), MarketData>,
}

impl CatalogApi {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            products: Cache::unbounded(None),
            variants: Cache::unbounded(None),
            market_data: Cache::unbounded(Some(MARKET_DATA_TTL)),
        }
    }

    pub async fn get_product(&self, product_id: &str) -> Result<Product> {
        let client = &self.client;
        self.products
            .get_or_insert_with(product_id.to_string(), || async {
                let response: crate::models::Response<Product> =
                    client.get(&format!("/catalog/products/{product_id}"), &[]).await?;
                Ok(response.data)
            })
            .await
    }

    pub async fn list_variants(&self, product_id: &str) -> Result<Vec<Variant>> {
        let client = &self.client;
        self.variants
            .get_or_insert_with(product_id.to_string(), || async {
                let response: crate::models::Response<serde_json::Value> = client
                    .get(&format!("/catalog/products/{product_id}/variants"), &[])
                    .await?;
                let variants = response
                    .data
                    .get("variants")
                    .cloned()
                    .unwrap_or(serde_json::Value::Array(Vec::new()));
                Ok(serde_json::from_value(variants)?)
            })
            .await
    }

    pub async fn get_variant_market_data(
        &self,
        variant_id: &str,
        currency: Currency,
    ) -> Result<MarketData> {
        let client = &self.client;
        self.market_data
            .get_or_insert_with((variant_id.to_string(), currency), || async {
                let params = [(
                    "currencyCode",
                    Some(serde_json::to_value(currency)?.as_str().unwrap_or_default().to_string()),
                )];
                let response: crate::models::Response<MarketData> = client
                    .get(&format!("/catalog/variants/{variant_id}/market-data"), &params)
                    .await?;
                Ok(response.data)
            })
            .await
    }
}
