//! Streaming paginators over the HTTP client (spec §4.3).
//!
//! Grounded on `original_source/stockx/api/base.py`'s `_page` for the
//! forward/page-count contract. The source's reverse mode never refreshes
//! `count` between pages (flagged in spec.md §9 as a source ambiguity);
//! this implementation snapshots `count` once on the first request and
//! iterates downward from the resulting `last_page`, which is the simpler
//! and more predictable of the two documented options.
//!
//! Neither paginator implements `Iterator`/`Stream`: the teacher has no
//! stream abstraction to imitate, so both are plain structs with an
//! explicit `async fn next`, the simplest shape that still composes with
//! `while let Some(page) = paginator.next().await`.

use std::collections::VecDeque;

use serde_json::Value;

use crate::client::http::HttpClient;
use crate::error::Result;

/// Page-number paginator, forward or reverse (spec §4.3).
pub struct PageNumberPaginator {
    client: HttpClient,
    endpoint: String,
    results_key: String,
    base_params: Vec<(String, String)>,
    page_size: u32,
    limit: Option<usize>,
    reverse: bool,

    started: bool,
    current_page: i64,
    last_page: i64,
    done: bool,
    yielded: usize,
    buffer: VecDeque<Value>,
}

impl PageNumberPaginator {
    pub fn new(
        client: HttpClient,
        endpoint: impl Into<String>,
        results_key: impl Into<String>,
        base_params: Vec<(String, String)>,
        page_size: u32,
        limit: Option<usize>,
        reverse: bool,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            results_key: results_key.into(),
            base_params,
            page_size,
            limit,
            reverse,
            started: false,
            current_page: 0,
            last_page: 0,
            done: false,
            yielded: 0,
            buffer: VecDeque::new(),
        }
    }

    async fn fetch_page(&self, page_number: i64) -> Result<Value> {
        let mut params: Vec<(&str, Option<String>)> = self
            .base_params
            .iter()
            .map(|(k, v)| (k.as_str(), Some(v.clone())))
            .collect();
        params.push(("pageSize", Some(self.page_size.to_string())));
        params.push(("pageNumber", Some(page_number.to_string())));

        let response: crate::models::Response<Value> = self.client.get(&self.endpoint, &params).await?;
        Ok(response.data)
    }

    async fn ensure_started(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        if self.reverse {
            let page = self.fetch_page(1).await?;
            let count = page.get("count").and_then(Value::as_i64).unwrap_or(0);
            self.last_page = ((count as f64) / (self.page_size as f64)).ceil() as i64;
            self.current_page = self.last_page;
            if self.current_page < 1 {
                self.done = true;
            }
        } else {
            self.current_page = 1;
        }
        Ok(())
    }

    fn results_of(&self, page: &Value) -> Vec<Value> {
        page.get(&self.results_key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    /// Yields the next item, fetching further pages as needed. `None` means
    /// the stream is exhausted (no more pages, or `limit` reached).
    pub async fn next(&mut self) -> Option<Result<Value>> {
        loop {
            if let Some(limit) = self.limit {
                if self.yielded >= limit {
                    return None;
                }
            }
            if let Some(item) = self.buffer.pop_front() {
                self.yielded += 1;
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.ensure_started().await {
                self.done = true;
                return Some(Err(e));
            }
            if self.done {
                return None;
            }

            let page = match self.fetch_page(self.current_page).await {
                Ok(page) => page,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            let mut results = self.results_of(&page);
            if self.reverse {
                results.reverse();
                self.current_page -= 1;
                if self.current_page < 1 {
                    self.done = true;
                }
            } else {
                let has_next = page
                    .get("hasNextPage")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                self.current_page += 1;
                if !has_next {
                    self.done = true;
                }
            }

            self.buffer.extend(results);
            if self.buffer.is_empty() && self.done {
                return None;
            }
        }
    }
}

/// Cursor paginator (spec §4.3).
pub struct CursorPaginator {
    client: HttpClient,
    endpoint: String,
    results_key: String,
    base_params: Vec<(String, String)>,
    page_size: u32,
    limit: Option<usize>,

    started: bool,
    cursor: Option<String>,
    done: bool,
    yielded: usize,
    buffer: VecDeque<Value>,
}

impl CursorPaginator {
    pub fn new(
        client: HttpClient,
        endpoint: impl Into<String>,
        results_key: impl Into<String>,
        base_params: Vec<(String, String)>,
        page_size: u32,
        limit: Option<usize>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            results_key: results_key.into(),
            base_params,
            page_size,
            limit,
            started: false,
            cursor: None,
            done: false,
            yielded: 0,
            buffer: VecDeque::new(),
        }
    }

    async fn fetch_page(&self) -> Result<Value> {
        let mut params: Vec<(&str, Option<String>)> = self
            .base_params
            .iter()
            .map(|(k, v)| (k.as_str(), Some(v.clone())))
            .collect();
        params.push(("pageSize", Some(self.page_size.to_string())));
        params.push(("cursor", self.cursor.clone()));

        let response: crate::models::Response<Value> = self.client.get(&self.endpoint, &params).await?;
        Ok(response.data)
    }

    pub async fn next(&mut self) -> Option<Result<Value>> {
        loop {
            if let Some(limit) = self.limit {
                if self.yielded >= limit {
                    return None;
                }
            }
            if let Some(item) = self.buffer.pop_front() {
                self.yielded += 1;
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }

            self.started = true;
            let page = match self.fetch_page().await {
                Ok(page) => page,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            let results = page
                .get(&self.results_key)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            let next_cursor = page
                .get("nextCursor")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned);

            self.done = next_cursor.is_none();
            self.cursor = next_cursor;

            self.buffer.extend(results);
            if self.buffer.is_empty() && self.done {
                return None;
            }
        }
    }
}
