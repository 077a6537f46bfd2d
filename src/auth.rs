//! Authentication configuration for the marketplace API (spec §6).
//!
//! Credential *storage* is explicitly out of scope (spec §1 Non-goals) — this
//! module only holds the values needed to run the OAuth refresh-token grant
//! described in §6 and to decide which host/version pair to talk to.

use std::env;

use crate::error::{Error, Result};

/// Default token refresh cadence (spec §6).
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

/// Default spacing between consecutive outbound requests (spec §6: "1-3s
/// between consecutive API calls").
pub const DEFAULT_MIN_REQUEST_INTERVAL_SECS: f64 = 1.5;

/// Credentials and endpoints needed to authenticate against the marketplace.
///
/// Can be constructed directly, via [`from_env`](Self::from_env), or using
/// the [`builder`](Self::builder) pattern.
#[derive(Clone)]
pub struct MarketplaceConfig {
    pub host: String,
    pub version: String,
    pub oauth_url: String,
    pub client_id: String,
    client_secret: String,
    pub audience: String,
    refresh_token: String,
    pub api_key: String,
    pub refresh_interval_secs: u64,
}

impl MarketplaceConfig {
    pub fn new(
        host: impl Into<String>,
        version: impl Into<String>,
        oauth_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        audience: impl Into<String>,
        refresh_token: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            version: version.into(),
            oauth_url: oauth_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            audience: audience.into(),
            refresh_token: refresh_token.into(),
            api_key: api_key.into(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `MARKETPLACE_HOST`, `MARKETPLACE_VERSION` (defaults to "v2"),
    /// `MARKETPLACE_OAUTH_URL`, `MARKETPLACE_CLIENT_ID`,
    /// `MARKETPLACE_CLIENT_SECRET`, `MARKETPLACE_AUDIENCE`,
    /// `MARKETPLACE_REFRESH_TOKEN`, `MARKETPLACE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        fn required(name: &str) -> Result<String> {
            env::var(name).map_err(|_| Error::request(0, format!("missing env var {name}")))
        }

        let host = env::var("MARKETPLACE_HOST").unwrap_or_else(|_| "api.marketplace.com".into());
        let version = env::var("MARKETPLACE_VERSION").unwrap_or_else(|_| "v2".into());
        let oauth_url = env::var("MARKETPLACE_OAUTH_URL")
            .unwrap_or_else(|_| "https://accounts.marketplace.com/oauth/token".into());

        Ok(Self::new(
            host,
            version,
            oauth_url,
            required("MARKETPLACE_CLIENT_ID")?,
            required("MARKETPLACE_CLIENT_SECRET")?,
            required("MARKETPLACE_AUDIENCE")?,
            required("MARKETPLACE_REFRESH_TOKEN")?,
            required("MARKETPLACE_API_KEY")?,
        ))
    }

    pub fn builder() -> MarketplaceConfigBuilder {
        MarketplaceConfigBuilder::default()
    }

    pub fn base_url(&self) -> String {
        format!("https://{}/{}", self.host, self.version)
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub(crate) fn refresh_token(&self) -> &str {
        &self.refresh_token
    }
}

impl std::fmt::Debug for MarketplaceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceConfig")
            .field("host", &self.host)
            .field("version", &self.version)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Builder for [`MarketplaceConfig`].
#[derive(Default)]
pub struct MarketplaceConfigBuilder {
    host: Option<String>,
    version: Option<String>,
    oauth_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    audience: Option<String>,
    refresh_token: Option<String>,
    api_key: Option<String>,
    refresh_interval_secs: Option<u64>,
}

impl MarketplaceConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn oauth_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_url = Some(url.into());
        self
    }

    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn refresh_interval_secs(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<MarketplaceConfig> {
        let missing = |field: &str| Error::request(0, format!("{field} is required"));

        let mut config = MarketplaceConfig::new(
            self.host.unwrap_or_else(|| "api.marketplace.com".into()),
            self.version.unwrap_or_else(|| "v2".into()),
            self.oauth_url
                .unwrap_or_else(|| "https://accounts.marketplace.com/oauth/token".into()),
            self.client_id.ok_or_else(|| missing("client_id"))?,
            self.client_secret.ok_or_else(|| missing("client_secret"))?,
            self.audience.ok_or_else(|| missing("audience"))?,
            self.refresh_token
                .ok_or_else(|| missing("refresh_token"))?,
            self.api_key.ok_or_else(|| missing("api_key"))?,
        );
        if let Some(secs) = self.refresh_interval_secs {
            config.refresh_interval_secs = secs;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_credentials() {
        let result = MarketplaceConfig::builder().client_id("abc").build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_produces_expected_base_url() {
        let config = MarketplaceConfig::builder()
            .host("api.example.com")
            .version("v3")
            .client_id("id")
            .client_secret("secret")
            .audience("aud")
            .refresh_token("token")
            .api_key("key")
            .build()
            .unwrap();

        assert_eq!(config.base_url(), "https://api.example.com/v3");
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = MarketplaceConfig::builder()
            .client_id("id")
            .client_secret("super-secret")
            .audience("aud")
            .refresh_token("refresh-secret")
            .api_key("key")
            .build()
            .unwrap();

        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("super-secret"));
        assert!(!debug_str.contains("refresh-secret"));
    }
}
