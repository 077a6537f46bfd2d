//! Thin batch endpoint wrappers (spec §4.4, §4.5, §6), grounded on
//! `original_source/stockx/api/batch.py`. The polling/await_completion
//! algorithm lives one layer up in [`crate::batch`] (C7); this module only
//! knows how to submit one batch and fetch its status/items.

use crate::client::http::HttpClient;
use crate::error::Result;
use crate::models::{
    BatchCreateInput, BatchDeleteInput, BatchItemResult, BatchItemStatus, BatchKind, BatchStatus,
    BatchUpdateInput,
};

pub struct BatchApi {
    client: HttpClient,
}

impl BatchApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn path_for(kind: BatchKind) -> &'static str {
        match kind {
            BatchKind::Create => "/listings/batch/create",
            BatchKind::Update => "/listings/batch/update",
            BatchKind::Delete => "/listings/batch/delete",
        }
    }

    pub async fn submit_create(&self, items: &[BatchCreateInput]) -> Result<BatchStatus> {
        let body = serde_json::json!({ "items": items });
        let response: crate::models::Response<BatchStatus> = self
            .client
            .post(Self::path_for(BatchKind::Create), &body)
            .await?;
        Ok(response.data)
    }

    pub async fn submit_update(&self, items: &[BatchUpdateInput]) -> Result<BatchStatus> {
        let body = serde_json::json!({ "items": items });
        let response: crate::models::Response<BatchStatus> = self
            .client
            .post(Self::path_for(BatchKind::Update), &body)
            .await?;
        Ok(response.data)
    }

    pub async fn submit_delete(&self, items: &[BatchDeleteInput]) -> Result<BatchStatus> {
        let body = serde_json::json!({ "items": items });
        let response: crate::models::Response<BatchStatus> = self
            .client
            .post(Self::path_for(BatchKind::Delete), &body)
            .await?;
        Ok(response.data)
    }

    pub async fn status(&self, kind: BatchKind, batch_id: &str) -> Result<BatchStatus> {
        let response: crate::models::Response<BatchStatus> = self
            .client
            .get(&format!("{}/{batch_id}", Self::path_for(kind)), &[])
            .await?;
        Ok(response.data)
    }

    pub async fn items(
        &self,
        kind: BatchKind,
        batch_id: &str,
        status_filter: Option<BatchItemStatus>,
    ) -> Result<Vec<BatchItemResult>> {
        let status_param = status_filter.map(|s| {
            serde_json::to_value(s)
                .ok()
                .and_then(|v| v.as_str().map(str::to_owned))
                .unwrap_or_default()
        });
        let params = [("status", status_param)];
        let response: crate::models::Response<serde_json::Value> = self
            .client
            .get(&format!("{}/{batch_id}/items", Self::path_for(kind)), &params)
            .await?;
        let items = response
            .data
            .get("items")
            .cloned()
            .unwrap_or(serde_json::Value::Array(Vec::new()));
        Ok(serde_json::from_value(items)?)
    }
}
