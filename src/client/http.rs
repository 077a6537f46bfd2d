//! Authenticated HTTP client: OAuth refresh loop, typed request/response,
//! throttled + retried dispatch (spec §4.2, §5, §6).
//!
//! Grounded on `original_source/stockx/api/client/client.py` (`_do`,
//! `_refresh_session`, `_refresh_token`) for the token lifecycle and the
//! teacher's `src/client/http.rs` for the request-building shape.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::auth::MarketplaceConfig;
use crate::client::retry::RetryPolicy;
use crate::client::throttle::Throttle;
use crate::error::{Error, Result, StatusKind};
use crate::models::Response;

/// Grace period a request will wait for the client to finish its first
/// token acquisition before giving up with `NotInitialized` (spec §4.2).
const AUTHENTICATING_GRACE_PERIOD: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClientState {
    Uninitialized,
    Authenticating,
    Ready,
    Closed,
}

#[derive(Clone)]
struct AuthHeaders {
    authorization: String,
    api_key: String,
}

struct Inner {
    http: Client,
    base_url: String,
    config: MarketplaceConfig,
    state: RwLock<ClientState>,
    auth: RwLock<Option<AuthHeaders>>,
    throttle: Throttle<std::result::Result<Value, Error>>,
    retry: RetryPolicy,
    refresh_handle: RwLock<Option<JoinHandle<()>>>,
}

/// Authenticated client for the marketplace REST API.
///
/// Cheaply cloneable: clones share the same refresh task, auth headers and
/// throttle queue.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

impl HttpClient {
    pub fn new(config: MarketplaceConfig) -> Result<Self> {
        Self::with_policy(
            config,
            Duration::from_secs_f64(crate::auth::DEFAULT_MIN_REQUEST_INTERVAL_SECS),
            RetryPolicy::default(),
        )
    }

    pub fn with_policy(
        config: MarketplaceConfig,
        min_request_interval: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let http = Client::builder().build().map_err(Error::Http)?;
        let base_url = config.base_url();

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                config,
                state: RwLock::new(ClientState::Uninitialized),
                auth: RwLock::new(None),
                throttle: Throttle::new(min_request_interval),
                retry,
                refresh_handle: RwLock::new(None),
            }),
        })
    }

    /// Starts the background OAuth refresh task. Idempotent: calling this on
    /// an already-initialized client is a no-op.
    pub async fn initialize(&self) -> Result<()> {
        {
            let state = self.inner.state.read().await;
            if *state != ClientState::Uninitialized && *state != ClientState::Closed {
                return Ok(());
            }
        }
        *self.inner.state.write().await = ClientState::Authenticating;

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { refresh_loop(inner).await });
        *self.inner.refresh_handle.write().await = Some(handle);

        Ok(())
    }

    /// Cancels the refresh task and transitions to `closed`. Subsequent
    /// requests fail with `NotInitialized`.
    pub async fn close(&self) {
        *self.inner.state.write().await = ClientState::Closed;
        if let Some(handle) = self.inner.refresh_handle.write().await.take() {
            handle.abort();
        }
        *self.inner.auth.write().await = None;
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    async fn ensure_ready(&self) -> Result<()> {
        // A refresh task that panicked silently must not leave us serving a
        // stale token forever (spec §9).
        if let Some(handle) = self.inner.refresh_handle.read().await.as_ref() {
            if handle.is_finished() {
                *self.inner.state.write().await = ClientState::Uninitialized;
            }
        }

        let state = *self.inner.state.read().await;
        match state {
            ClientState::Ready => Ok(()),
            ClientState::Uninitialized | ClientState::Closed => Err(Error::NotInitialized),
            ClientState::Authenticating => {
                let deadline = Instant::now() + AUTHENTICATING_GRACE_PERIOD;
                loop {
                    if *self.inner.state.read().await == ClientState::Ready {
                        return Ok(());
                    }
                    if Instant::now() >= deadline {
                        return Err(Error::NotInitialized);
                    }
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<Response<T>> {
        let query = strip_absent_pairs(params);
        self.dispatch(Method::GET, endpoint, Some(query), None::<()>)
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response<T>> {
        self.dispatch(Method::POST, endpoint, None, Some(body))
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response<T>> {
        self.dispatch(Method::PUT, endpoint, None, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response<T>> {
        self.dispatch(Method::PATCH, endpoint, None, Some(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Response<T>> {
        self.dispatch(Method::DELETE, endpoint, None, None::<()>)
            .await
    }

    /// Composition order per design note §9: throttle → retry → raw request.
    /// (The cache sits one layer up, in the resource-endpoint wrappers.)
    async fn dispatch<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<Vec<(String, String)>>,
        body: Option<B>,
    ) -> Result<Response<T>> {
        self.ensure_ready().await?;

        let url = format!("{}{}", self.inner.base_url, endpoint);
        let body_json = body
            .map(|b| serde_json::to_value(b).map(strip_absent_value))
            .transpose()?;

        let inner = Arc::clone(&self.inner);
        let method2 = method.clone();
        let url2 = url.clone();
        let query2 = query.clone();
        let body2 = body_json.clone();

        let retry = inner.retry;
        let raw = self
            .inner
            .throttle
            .run(move || async move {
                retry
                    .run(|| {
                        let inner = Arc::clone(&inner);
                        let method = method2.clone();
                        let url = url2.clone();
                        let query = query2.clone();
                        let body = body2.clone();
                        async move { send_once(&inner, method, &url, query, body).await }
                    })
                    .await
            })
            .await?;

        let value = raw;
        let data: T = serde_json::from_value(value.clone())?;
        Ok(Response {
            status_code: 200,
            message: None,
            data,
        })
    }
}

async fn send_once(
    inner: &Inner,
    method: Method,
    url: &str,
    query: Option<Vec<(String, String)>>,
    body: Option<Value>,
) -> Result<Value> {
    let auth = inner.auth.read().await.clone();
    let Some(auth) = auth else {
        return Err(Error::NotInitialized);
    };

    let mut request = inner
        .http
        .request(method, url)
        .header("Authorization", auth.authorization)
        .header("x-api-key", auth.api_key);

    if let Some(query) = query {
        request = request.query(&query);
    }
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.map_err(Error::Http)?;
    let status = response.status().as_u16();

    if response.status().is_success() {
        if status == 204 {
            return Ok(Value::Null);
        }
        response.json::<Value>().await.map_err(Error::Http)
    } else {
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body
            .get("errorMessage")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| StatusKind::from_status(status).code().to_string());
        Err(Error::request(status, message))
    }
}

async fn refresh_loop(inner: Arc<Inner>) {
    loop {
        match fetch_token(&inner.config).await {
            Ok(headers) => {
                *inner.auth.write().await = Some(headers);
                *inner.state.write().await = ClientState::Ready;
            }
            Err(error) => {
                tracing::warn!(%error, "token refresh failed, keeping previous credentials");
                let had_token = inner.auth.read().await.is_some();
                if !had_token {
                    *inner.state.write().await = ClientState::Authenticating;
                }
            }
        }
        tokio::time::sleep(Duration::from_secs(inner.config.refresh_interval_secs)).await;
    }
}

async fn fetch_token(config: &MarketplaceConfig) -> Result<AuthHeaders> {
    let client = Client::new();
    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", &config.client_id),
        ("client_secret", config.client_secret()),
        ("audience", &config.audience),
        ("refresh_token", config.refresh_token()),
    ];

    let response = client
        .post(&config.oauth_url)
        .form(&form)
        .send()
        .await
        .map_err(Error::Http)?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        return Err(Error::request(status, "oauth token refresh failed"));
    }

    let body: Value = response.json().await.map_err(Error::Http)?;
    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::request(0, "oauth response missing access_token"))?;

    Ok(AuthHeaders {
        authorization: format!("Bearer {access_token}"),
        api_key: config.api_key.clone(),
    })
}

/// Drops params whose value is absent (spec §4.2: "drop keys whose value is
/// 'absent' from params ... before serialization").
fn strip_absent_pairs(params: &[(&str, Option<String>)]) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(k, v)| v.clone().map(|v| (k.to_string(), v)))
        .collect()
}

/// Same rule, one level deep, for JSON request bodies.
fn strip_absent_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_null_params() {
        let params = [("a", Some("1".to_string())), ("b", None)];
        let stripped = strip_absent_pairs(&params);
        assert_eq!(stripped, vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn strips_null_body_fields() {
        let value = serde_json::json!({"a": 1, "b": null});
        let stripped = strip_absent_value(value);
        assert_eq!(stripped, serde_json::json!({"a": 1}));
    }
}
